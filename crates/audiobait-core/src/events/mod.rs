//! Playback events and their delivery to the backend.

mod reporter;

pub use reporter::{
    deliver_with_retry, flush_pending, ApiEventSink, EventSink, LogReporter, QueuedReporter, RetryPolicy,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::playlist::{Sound, SoundId};

/// Backend event type for a lure playback.
pub const EVENT_TYPE: &str = "audioBait";

/// One playback attempt, handed to the reporter and then dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackEvent {
    /// When playback started.
    pub timestamp: DateTime<Utc>,
    pub sound_id: SoundId,
    /// Base name of the played file.
    pub file_name: String,
}

impl PlaybackEvent {
    pub fn new(timestamp: DateTime<Utc>, sound: &Sound) -> Self {
        Self {
            timestamp,
            sound_id: sound.id,
            file_name: sound.file_name(),
        }
    }

    /// Event description in the shape the backend expects.
    pub fn description(&self, volume: u8) -> Value {
        json!({
            "description": {
                "type": EVENT_TYPE,
                "details": {
                    "fileId": self.sound_id,
                    "filename": self.file_name,
                    "volume": volume,
                }
            }
        })
    }
}
