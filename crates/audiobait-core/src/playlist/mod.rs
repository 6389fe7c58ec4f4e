mod chooser;

pub use chooser::{
    ParsePolicyError, SelectionPolicy, Sound, SoundCatalogue, SoundChooser, SoundId,
};
