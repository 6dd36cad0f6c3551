//! Writing the metadata sidecar to disk

use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use super::metadata::AudiobookMetadata;

/// Sidecar file name inside the run's scratch folder
pub const SIDECAR_FILE_NAME: &str = "metadata.txt";

/// Write `metadata` as an ffmetadata sidecar inside `dir`
///
/// `dir` is expected to be the run's scoped temporary folder; the sidecar is
/// removed together with it. Returns the sidecar path for use as an encoder
/// input.
pub fn write_sidecar(metadata: &AudiobookMetadata, dir: &Path) -> io::Result<PathBuf> {
    let path = dir.join(SIDECAR_FILE_NAME);
    let mut file = File::create(&path)?;
    file.write_all(metadata.to_ffmetadata().as_bytes())?;
    file.sync_all()?;

    log::debug!(
        "Wrote metadata sidecar with {} chapters to {}",
        metadata.chapters.len(),
        path.display()
    );
    Ok(path)
}
