//! Building the sound catalogue from configuration and the backend.

use std::path::Path;

use crate::api::ApiClient;
use crate::error::Result;
use crate::playlist::SoundCatalogue;
use crate::storage::SoundEntry;

/// Catalogue of configured sounds whose files are present under `audio_dir`.
///
/// Missing files are logged and left out.
pub fn from_config(entries: &[SoundEntry], audio_dir: &Path) -> SoundCatalogue {
    entries
        .iter()
        .filter_map(|entry| {
            let path = entry.path_in(audio_dir);
            if path.is_file() {
                Some((entry.id, path))
            } else {
                tracing::warn!(id = entry.id, path = %path.display(), "sound file missing, skipping");
                None
            }
        })
        .collect()
}

/// Download every configured sound not yet on disk.
///
/// A failed download is logged and does not stop the others. Returns
/// how many files were fetched.
pub async fn sync(api: &ApiClient, entries: &[SoundEntry], audio_dir: &Path) -> Result<usize> {
    tokio::fs::create_dir_all(audio_dir).await?;

    let mut fetched = 0;
    for entry in entries {
        let path = entry.path_in(audio_dir);
        if is_file(&path).await {
            continue;
        }

        let result = match api.file_details(entry.id).await {
            Ok(details) => api.download_file(&details, &path).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(()) => {
                tracing::info!(id = entry.id, path = %path.display(), "downloaded sound");
                fetched += 1;
            }
            Err(e) => tracing::warn!(
                id = entry.id,
                permanent = e.is_permanent(),
                "failed to download sound: {e}"
            ),
        }
    }
    Ok(fetched)
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}
