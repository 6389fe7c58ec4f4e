//! The device main loop.

use std::path::Path;
use std::time::Duration;

use audiobait_core::events::{flush_pending, ApiEventSink};
use audiobait_core::scheduler::{EventReporter, SystemClock, TokioSleeper};
use audiobait_core::{
    catalogue, ApiClient, BurstScheduler, Config, LogReporter, Mixer, QueuedReporter,
    SoundChooser, SoxPlayer,
};

/// How long queued events may take to go out after a fatal error.
const FLUSH_GRACE: Duration = Duration::from_secs(10);

/// Set up the device and run bursts until playback fails.
pub async fn run(config_path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!("version {}", env!("CARGO_PKG_VERSION"));
    let config = Config::load(config_path)?;

    tracing::info!(
        "setting card {} {:?} to {}%",
        config.card,
        config.volume_control,
        config.volume
    );
    Mixer::new(config.card, &config.volume_control)
        .set_volume(config.volume)
        .await?;

    let api = match &config.api {
        Some(settings) => match ApiClient::from_config(settings).await {
            Ok(api) => Some(api),
            Err(e) => {
                tracing::warn!(
                    permanent = e.is_permanent(),
                    "backend unavailable, will connect when reporting: {e}"
                );
                None
            }
        },
        None => None,
    };

    if let Some(api) = &api {
        catalogue::sync(api, &config.sounds, &config.audio_dir).await?;
    }
    let sounds = catalogue::from_config(&config.sounds, &config.audio_dir);
    tracing::info!(
        "using {} sound(s) from {}, choice {}",
        sounds.len(),
        config.audio_dir.display(),
        config.play.file
    );
    tracing::info!("playback window: {}", config.window);
    let chooser = SoundChooser::new(sounds);

    match &config.api {
        Some(settings) => {
            let sink = ApiEventSink::new(settings.clone(), api, config.volume);
            let (reporter, delivery) =
                QueuedReporter::spawn(sink, config.reporting.retry_policy());
            // The scheduler owns the only reporter, so the queue closes
            // when it returns.
            let result = schedule(&config, chooser, reporter).await;
            flush_pending(delivery, FLUSH_GRACE).await;
            result
        }
        None => schedule(&config, chooser, LogReporter).await,
    }
}

async fn schedule<R: EventReporter>(
    config: &Config,
    chooser: SoundChooser,
    reporter: R,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut scheduler = BurstScheduler::new(
        config.window,
        chooser,
        config.play.burst_config(),
        SystemClock,
        TokioSleeper,
        SoxPlayer::new(config.card),
        reporter,
    );
    match scheduler.run().await {
        Ok(never) => match never {},
        Err(e) => Err(e.into()),
    }
}
