//! Caption sidecar persistence.
//!
//! A sidecar is a same-stem `.txt` file next to the image. Its presence is
//! what marks an image as captioned, so the scanner and the persister must
//! agree on the path mapping — both go through [`sidecar_path`].

use std::io;
use std::path::{Path, PathBuf};

/// The sidecar path for an image: same stem, `.txt` extension.
pub fn sidecar_path(image: &Path) -> PathBuf {
    image.with_extension("txt")
}

/// Write `prefix + caption` to the image's sidecar, overwriting any
/// existing file. Content is UTF-8, exactly as concatenated.
pub fn write_caption(image: &Path, prefix: &str, caption: &str) -> io::Result<()> {
    let path = sidecar_path(image);
    std::fs::write(&path, format!("{prefix}{caption}"))?;
    tracing::debug!("Wrote caption sidecar {:?}", path);
    Ok(())
}
