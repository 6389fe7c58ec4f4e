pub mod run;
pub mod schedule;
pub mod sync;
pub mod window;

use audiobait_core::storage::ApiConfig;
use audiobait_core::Config;

/// The `[api]` section, or an error naming what is missing.
fn api_config(config: &Config) -> Result<&ApiConfig, Box<dyn std::error::Error>> {
    config
        .api
        .as_ref()
        .ok_or_else(|| "no [api] section in configuration".into())
}
