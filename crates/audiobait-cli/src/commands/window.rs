use std::path::Path;

use audiobait_core::Config;
use chrono::Local;

pub fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(config_path)?;
    let now = Local::now();
    let wait = config.window.time_until_open_at(&now);

    println!("window: {}", config.window);
    if wait.is_zero() {
        println!("status: open");
    } else {
        let opens = config.window.next_open_at(&now);
        let secs = wait.as_secs();
        println!(
            "status: opens in {}h{:02}m{:02}s (at {})",
            secs / 3600,
            secs % 3600 / 60,
            secs % 60,
            opens.format("%Y-%m-%d %H:%M")
        );
    }
    Ok(())
}
