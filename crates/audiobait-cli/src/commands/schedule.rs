use std::path::Path;

use audiobait_core::{ApiClient, Config};

pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;
    let api = ApiClient::from_config(super::api_config(&config)?).await?;

    let schedule = api.schedule().await?;
    println!("{}", serde_json::to_string_pretty(&schedule)?);
    Ok(())
}
