//! TOML device configuration.
//!
//! Stores:
//! - Audio output card, mixer control and volume
//! - The daily playback window
//! - Burst pacing and the sound choice
//! - The sound catalogue (backend ids mapped to files under `audio_dir`)
//! - Optional backend credentials and event retry settings
//!
//! Configuration is read from `/etc/audiobait.toml` unless another path
//! is given.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::events::RetryPolicy;
use crate::playlist::{SelectionPolicy, SoundId};
use crate::scheduler::BurstConfig;
use crate::window::ScheduleWindow;

pub const DEFAULT_CONFIG_PATH: &str = "/etc/audiobait.toml";

/// Burst pacing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayConfig {
    /// `"random"`, `"same"` or a sound id, quoted or bare.
    #[serde(default = "default_file_choice")]
    pub file: SelectionPolicy,
    #[serde(default = "default_burst_repeat")]
    pub burst_repeat: u32,
    #[serde(default)]
    pub intra_sleep_secs: u64,
    #[serde(default = "default_inter_sleep_secs")]
    pub inter_sleep_secs: u64,
}

/// One catalogue entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SoundEntry {
    pub id: SoundId,
    /// File name relative to `audio_dir`.
    pub file: String,
}

/// Backend connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub server_url: String,
    pub device_name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

/// Event delivery retry settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportingConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_retry_delay_secs")]
    pub retry_delay_secs: u64,
}

/// Device configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_audio_dir")]
    pub audio_dir: PathBuf,
    #[serde(default)]
    pub card: u32,
    #[serde(default = "default_volume_control")]
    pub volume_control: String,
    #[serde(default = "default_volume")]
    pub volume: u8,
    #[serde(default)]
    pub window: ScheduleWindow,
    #[serde(default)]
    pub play: PlayConfig,
    #[serde(default)]
    pub sounds: Vec<SoundEntry>,
    #[serde(default)]
    pub api: Option<ApiConfig>,
    #[serde(default)]
    pub reporting: ReportingConfig,
}

// Default functions
fn default_file_choice() -> SelectionPolicy {
    SelectionPolicy::Random
}
fn default_burst_repeat() -> u32 {
    1
}
fn default_inter_sleep_secs() -> u64 {
    600
}
fn default_timeout_secs() -> u64 {
    crate::api::DEFAULT_TIMEOUT.as_secs()
}
fn default_max_attempts() -> u32 {
    5
}
fn default_retry_delay_secs() -> u64 {
    30
}
fn default_audio_dir() -> PathBuf {
    PathBuf::from("/var/lib/audiobait")
}
fn default_volume_control() -> String {
    "Speaker".into()
}
fn default_volume() -> u8 {
    100
}

impl Default for PlayConfig {
    fn default() -> Self {
        Self {
            file: default_file_choice(),
            burst_repeat: default_burst_repeat(),
            intra_sleep_secs: 0,
            inter_sleep_secs: default_inter_sleep_secs(),
        }
    }
}

impl Default for ReportingConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            retry_delay_secs: default_retry_delay_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            audio_dir: default_audio_dir(),
            card: 0,
            volume_control: default_volume_control(),
            volume: default_volume(),
            window: ScheduleWindow::default(),
            play: PlayConfig::default(),
            sounds: Vec::new(),
            api: None,
            reporting: ReportingConfig::default(),
        }
    }
}

impl PlayConfig {
    pub fn burst_config(&self) -> BurstConfig {
        BurstConfig {
            file_choice: self.file,
            burst_repeat: self.burst_repeat,
            intra_sleep: Duration::from_secs(self.intra_sleep_secs),
            inter_sleep: Duration::from_secs(self.inter_sleep_secs),
        }
    }
}

impl SoundEntry {
    /// Where this sound lives under `audio_dir`.
    pub fn path_in(&self, audio_dir: &Path) -> PathBuf {
        audio_dir.join(&self.file)
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ReportingConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_attempts,
            retry_delay: Duration::from_secs(self.retry_delay_secs),
        }
    }
}

impl Config {
    /// Read and validate the config file at `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, is not valid TOML
    /// for this schema, or fails validation.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let cfg: Config =
            toml::from_str(content).map_err(|e| ConfigError::ParseFailed(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check values serde cannot check on its own.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.volume > 100 {
            return Err(invalid("volume", format!("{} is above 100", self.volume)));
        }
        if self.play.burst_repeat > 0 && self.play.inter_sleep_secs == 0 {
            tracing::warn!("inter_sleep_secs is 0; bursts will repeat back to back");
        }

        let mut ids = HashSet::new();
        for sound in &self.sounds {
            if !ids.insert(sound.id) {
                return Err(invalid("sounds", format!("duplicate sound id {}", sound.id)));
            }
            if sound.file.trim().is_empty() {
                return Err(invalid("sounds", format!("sound {} has no file", sound.id)));
            }
        }

        if let Some(api) = &self.api {
            if api.server_url.trim().is_empty() {
                return Err(invalid("api.server_url", "must not be empty"));
            }
            if api.device_name.trim().is_empty() {
                return Err(invalid("api.device_name", "must not be empty"));
            }
        }
        if self.reporting.max_attempts == 0 {
            return Err(invalid("reporting.max_attempts", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(key: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.into(),
    }
}
