use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::error::{PipelineError, Result};

/// Discovers still-image frame files in a directory
///
/// Frames are expected as individual `.png`/`.jpg` files whose lexicographic
/// name order is the playback order (e.g. `frame_0001.png`, `frame_0002.png`).
pub struct FrameLoader;

const FRAME_EXTENSIONS: [&str; 3] = ["png", "jpg", "jpeg"];

impl FrameLoader {
    /// List the frame files in `dir`, sorted by file name
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| Self::is_frame_file(path))
            .collect();

        paths.sort();

        if paths.is_empty() {
            return Err(PipelineError::FrameProcessingFailed {
                reason: format!("no frame images found in {}", dir.display()),
            }
            .into());
        }

        info!("Discovered {} frames in {}", paths.len(), dir.display());
        for path in paths.iter().take(3) {
            debug!("   frame: {}", path.display());
        }

        Ok(paths)
    }

    fn is_frame_file(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext = ext.to_ascii_lowercase();
                FRAME_EXTENSIONS.contains(&ext.as_str())
            })
            .unwrap_or(false)
    }
}
