//! Directory scan for images that still need captions.
//!
//! Only direct entries of the target directory are considered; an image is
//! skipped when a same-stem `.txt` sidecar already exists, which is what
//! makes repeated runs converge to an empty task list.

use std::path::Path;
use walkdir::WalkDir;

use crate::config::ScanConfig;
use crate::error::CapshotError;
use crate::sidecar;
use crate::types::ImageTask;

/// Finds uncaptioned images in a directory.
pub struct CaptionScanner {
    config: ScanConfig,
}

impl CaptionScanner {
    /// Create a new scanner instance.
    pub fn new(config: ScanConfig) -> Self {
        Self { config }
    }

    /// Find all supported images in `dir` that lack a caption sidecar.
    ///
    /// Fails if the directory does not exist. Returns tasks ordered
    /// lexicographically by path for deterministic processing.
    pub fn find_uncaptioned(&self, dir: &Path) -> Result<Vec<ImageTask>, CapshotError> {
        if !dir.is_dir() {
            return Err(CapshotError::DirectoryNotFound(dir.to_path_buf()));
        }

        let mut tasks = Vec::new();

        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if !path.is_file() || !self.is_supported(path) {
                continue;
            }
            if sidecar::sidecar_path(path).exists() {
                continue;
            }
            if let Ok(meta) = entry.metadata() {
                tasks.push(ImageTask {
                    path: path.to_path_buf(),
                    size: meta.len(),
                });
            }
        }

        // Sort by path for deterministic ordering
        tasks.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(tasks)
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.config
                    .supported_formats
                    .iter()
                    .any(|fmt| fmt.to_lowercase() == ext_lower)
            })
            .unwrap_or(false)
    }
}
