mod config;

pub use config::{
    ApiConfig, Config, PlayConfig, ReportingConfig, SoundEntry, DEFAULT_CONFIG_PATH,
};
