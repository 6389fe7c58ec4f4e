//! External audio programs: `play` from SoX for playback, `amixer` for
//! the output level.

use std::path::Path;
use std::process::Output;

use async_trait::async_trait;
use tokio::process::Command;

use crate::error::PlaybackError;
use crate::scheduler::PlaybackDevice;

/// Plays files with SoX on a given ALSA card.
#[derive(Debug, Clone)]
pub struct SoxPlayer {
    card: u32,
    program: String,
}

impl SoxPlayer {
    pub fn new(card: u32) -> Self {
        Self::with_program(card, "play")
    }

    /// Use a different player binary, called as `<program> -q <path>`.
    pub fn with_program(card: u32, program: impl Into<String>) -> Self {
        Self {
            card,
            program: program.into(),
        }
    }
}

#[async_trait]
impl PlaybackDevice for SoxPlayer {
    async fn play(&self, path: &Path) -> Result<(), PlaybackError> {
        let output = Command::new(&self.program)
            .arg("-q")
            .arg(path)
            .env("AUDIODEV", format!("hw:{}", self.card))
            .output()
            .await
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PlaybackError::PlayerFailed {
                path: path.to_path_buf(),
                status: output.status.to_string(),
                output: combined_output(&output),
            })
        }
    }
}

/// An ALSA mixer control on one card.
#[derive(Debug, Clone)]
pub struct Mixer {
    card: u32,
    control: String,
    program: String,
}

impl Mixer {
    pub fn new(card: u32, control: impl Into<String>) -> Self {
        Self::with_program(card, control, "amixer")
    }

    pub fn with_program(card: u32, control: impl Into<String>, program: impl Into<String>) -> Self {
        Self {
            card,
            control: control.into(),
            program: program.into(),
        }
    }

    /// Set the control to `percent` of its range.
    pub async fn set_volume(&self, percent: u8) -> Result<(), PlaybackError> {
        let output = Command::new(&self.program)
            .arg("-c")
            .arg(self.card.to_string())
            .arg("sset")
            .arg(&self.control)
            .arg(format!("{percent}%"))
            .output()
            .await
            .map_err(|source| PlaybackError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(PlaybackError::Volume {
                status: output.status.to_string(),
                output: combined_output(&output),
            })
        }
    }
}

fn combined_output(output: &Output) -> String {
    let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
    text.push_str(&String::from_utf8_lossy(&output.stderr));
    text
}
