//! Sound selection.
//!
//! The chooser owns the catalogue and remembers the last sound it
//! handed out, so `same` can replay it without drawing again.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use rand::prelude::*;
use rand_pcg::Mcg128Xsl64;
use serde::{Deserialize, Serialize};

/// Backend identifier of a sound file.
pub type SoundId = u32;

/// Sound ids mapped to files on disk.
pub type SoundCatalogue = BTreeMap<SoundId, PathBuf>;

/// A sound picked for playback.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sound {
    pub id: SoundId,
    pub path: PathBuf,
}

impl Sound {
    /// Base name of the file, as reported in playback events.
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// How to pick the sound for each playback.
///
/// In config files a bare integer is accepted as well as a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawPolicy", into = "String")]
pub enum SelectionPolicy {
    /// Uniform draw over the catalogue.
    Random,
    /// Replay whatever was chosen last.
    RepeatPrevious,
    /// A specific sound id.
    Explicit(SoundId),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid sound choice '{0}': expected \"random\", \"same\" or a sound id")]
pub struct ParsePolicyError(String);

impl FromStr for SelectionPolicy {
    type Err = ParsePolicyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "random" => Ok(Self::Random),
            "same" => Ok(Self::RepeatPrevious),
            other => other
                .parse::<SoundId>()
                .map(Self::Explicit)
                .map_err(|_| ParsePolicyError(s.to_string())),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawPolicy {
    Id(SoundId),
    Text(String),
}

impl TryFrom<RawPolicy> for SelectionPolicy {
    type Error = ParsePolicyError;

    fn try_from(raw: RawPolicy) -> Result<Self, Self::Error> {
        match raw {
            RawPolicy::Id(id) => Ok(Self::Explicit(id)),
            RawPolicy::Text(text) => text.parse(),
        }
    }
}

impl From<SelectionPolicy> for String {
    fn from(policy: SelectionPolicy) -> Self {
        policy.to_string()
    }
}

impl fmt::Display for SelectionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SelectionPolicy::Random => write!(f, "random"),
            SelectionPolicy::RepeatPrevious => write!(f, "same"),
            SelectionPolicy::Explicit(id) => write!(f, "{id}"),
        }
    }
}

/// Picks sounds from a fixed catalogue.
#[derive(Debug, Clone)]
pub struct SoundChooser {
    catalogue: SoundCatalogue,
    /// Sorted once so seeded draws are reproducible.
    ids: Vec<SoundId>,
    rng: Mcg128Xsl64,
    last_chosen: Option<SoundId>,
}

impl SoundChooser {
    /// Chooser seeded from the OS entropy source.
    pub fn new(catalogue: SoundCatalogue) -> Self {
        Self::with_rng(catalogue, Mcg128Xsl64::from_entropy())
    }

    /// Chooser with a fixed seed; identical seeds give identical draws.
    pub fn with_seed(catalogue: SoundCatalogue, seed: u64) -> Self {
        Self::with_rng(catalogue, Mcg128Xsl64::seed_from_u64(seed))
    }

    fn with_rng(catalogue: SoundCatalogue, rng: Mcg128Xsl64) -> Self {
        let ids = catalogue.keys().copied().collect();
        Self {
            catalogue,
            ids,
            rng,
            last_chosen: None,
        }
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn last_chosen(&self) -> Option<SoundId> {
        self.last_chosen
    }

    /// Pick a sound under `policy`.
    ///
    /// `None` is a selection miss: the catalogue is empty, there is no
    /// previous choice to repeat, or the explicit id is unknown. A miss
    /// leaves the remembered choice untouched.
    pub fn choose(&mut self, policy: SelectionPolicy) -> Option<Sound> {
        match policy {
            SelectionPolicy::Random => {
                let id = *self.ids.choose(&mut self.rng)?;
                self.remember(id)
            }
            SelectionPolicy::RepeatPrevious => {
                let id = self.last_chosen?;
                self.sound(id)
            }
            SelectionPolicy::Explicit(id) => self.remember(id),
        }
    }

    fn remember(&mut self, id: SoundId) -> Option<Sound> {
        let sound = self.sound(id)?;
        self.last_chosen = Some(id);
        Some(sound)
    }

    fn sound(&self, id: SoundId) -> Option<Sound> {
        self.catalogue.get(&id).map(|path| Sound {
            id,
            path: path.clone(),
        })
    }
}
