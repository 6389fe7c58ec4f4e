//! Collaborators the burst scheduler drives but does not implement.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};

use crate::error::{PlaybackError, ReportError};
use crate::events::PlaybackEvent;

/// Source of the current time in the device's timezone.
///
/// The timezone decides how the window's wall-clock bounds map onto
/// real instants.
pub trait Clock: Send + Sync {
    type Tz: TimeZone;

    fn now(&self) -> DateTime<Self::Tz>;
}

/// Timed suspension. A wait always runs to completion.
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

/// Something that can play a sound file.
///
/// A failure here is fatal to the scheduler.
#[async_trait]
pub trait PlaybackDevice: Send + Sync {
    async fn play(&self, path: &Path) -> Result<(), PlaybackError>;
}

/// Accepts playback events for delivery.
///
/// Must not block on delivery; failures are logged by the caller and
/// otherwise ignored.
pub trait EventReporter: Send + Sync {
    fn report(&self, event: PlaybackEvent) -> Result<(), ReportError>;
}

/// The system clock in the device's local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    type Tz = Local;

    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Sleeps on the tokio timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}
