//! # Audiobait Core Library
//!
//! Decision logic for a field device that plays lure sounds inside a
//! daily time window and reports each playback to a backend.
//!
//! ## Architecture
//!
//! - **Window**: recurring daily interval, possibly spanning midnight
//! - **Playlist**: sound catalogue and the selection policy
//! - **Scheduler**: the burst loop, talking to its collaborators through
//!   the `Clock`, `Sleeper`, `PlaybackDevice` and `EventReporter` traits
//! - **API**: backend client whose failures are classified as permanent
//!   or temporary
//! - **Events**: ordered, fire-and-forget delivery of playback events
//!
//! ## Key Components
//!
//! - [`ScheduleWindow`]: when bursts may run
//! - [`SoundChooser`]: which sound to play
//! - [`BurstScheduler`]: the main loop
//! - [`ApiClient`]: backend access
//! - [`Config`]: device configuration

pub mod api;
pub mod audio;
pub mod catalogue;
pub mod error;
pub mod events;
pub mod playlist;
pub mod scheduler;
pub mod storage;
pub mod window;

pub use api::{is_permanent_error, ApiClient, ApiError};
pub use audio::{Mixer, SoxPlayer};
pub use error::{ConfigError, CoreError, PlaybackError, ReportError};
pub use events::{LogReporter, PlaybackEvent, QueuedReporter, RetryPolicy};
pub use playlist::{SelectionPolicy, Sound, SoundCatalogue, SoundChooser, SoundId};
pub use scheduler::{BurstConfig, BurstScheduler, SchedulerState, StepOutcome};
pub use storage::Config;
pub use window::ScheduleWindow;
