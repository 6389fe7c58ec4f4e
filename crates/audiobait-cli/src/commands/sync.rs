use std::path::Path;

use audiobait_core::{catalogue, ApiClient, Config};

pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;
    let api = ApiClient::from_config(super::api_config(&config)?).await?;

    let fetched = catalogue::sync(&api, &config.sounds, &config.audio_dir).await?;
    let available = catalogue::from_config(&config.sounds, &config.audio_dir).len();
    println!(
        "downloaded {fetched} file(s); {available} of {} sound(s) available",
        config.sounds.len()
    );
    Ok(())
}
