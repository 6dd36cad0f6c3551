//! Input folder scanning
//!
//! Finds the audio tracks of one audiobook folder and assigns each its
//! position in the book.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::audio::is_track_file;
use crate::core::natural_sort::natural_sort_by_key;
use crate::error::ConvertError;

/// One input track and its position in the book
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackRef {
    pub path: PathBuf,
    /// Zero-based position after natural sorting
    pub ordinal: usize,
}

impl TrackRef {
    /// File name without extension, used for chapter titles
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default()
    }

    /// File name including extension, for display
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

/// Collect the tracks directly inside `dir`, in natural order
///
/// Only the top level of the folder is considered. Discovery order is by raw
/// file name so that names with equal natural keys still come out in a stable
/// order from one run to the next.
pub fn scan_tracks<S: AsRef<str>>(dir: &Path, extensions: &[S]) -> Result<Vec<TrackRef>, ConvertError> {
    if !dir.exists() {
        return Err(ConvertError::InputDirMissing(dir.to_path_buf()));
    }
    if !dir.is_dir() {
        return Err(ConvertError::NotADirectory(dir.to_path_buf()));
    }

    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        // Only a failure on the folder itself is fatal; a bad entry such as a
        // dangling symlink is skipped
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) if e.depth() == 0 => return Err(e.into()),
            Err(e) => {
                log::warn!("Skipping unreadable entry in {}: {}", dir.display(), e);
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_track_file(path, extensions) {
            paths.push(path.to_path_buf());
        }
    }

    natural_sort_by_key(&mut paths, |p| {
        p.file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default()
    });

    log::debug!("Found {} tracks in {}", paths.len(), dir.display());

    Ok(paths
        .into_iter()
        .enumerate()
        .map(|(ordinal, path)| TrackRef { path, ordinal })
        .collect())
}

/// Format duration in human-readable form (e.g. "1h 02m 03s")
pub fn format_duration(seconds: f64) -> String {
    let total_secs = seconds.max(0.0).round() as u64;
    let hours = total_secs / 3600;
    let mins = (total_secs % 3600) / 60;
    let secs = total_secs % 60;
    if hours > 0 {
        format!("{}h {:02}m {:02}s", hours, mins, secs)
    } else {
        format!("{}m {}s", mins, secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str) {
        File::create(dir.join(name)).unwrap();
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0.0), "0m 0s");
        assert_eq!(format_duration(90.0), "1m 30s");
        assert_eq!(format_duration(1800.0), "30m 0s");
        assert_eq!(format_duration(3723.0), "1h 02m 03s");
        assert_eq!(format_duration(-5.0), "0m 0s");
    }

    #[test]
    fn test_scan_sorts_naturally_and_numbers_tracks() {
        let temp = TempDir::new().unwrap();
        for name in ["t10.mp3", "t9.mp3", "t1.mp3", "t2.mp3"] {
            touch(temp.path(), name);
        }

        let tracks = scan_tracks(temp.path(), &["mp3"]).unwrap();
        let names: Vec<String> = tracks.iter().map(|t| t.file_name()).collect();
        assert_eq!(names, vec!["t1.mp3", "t2.mp3", "t9.mp3", "t10.mp3"]);
        let ordinals: Vec<usize> = tracks.iter().map(|t| t.ordinal).collect();
        assert_eq!(ordinals, vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_scan_ignores_other_files_and_subfolders() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "01.mp3");
        touch(temp.path(), "cover.jpg");
        touch(temp.path(), "notes.txt");
        std::fs::create_dir(temp.path().join("extras")).unwrap();
        touch(&temp.path().join("extras"), "bonus.mp3");

        let tracks = scan_tracks(temp.path(), &["mp3"]).unwrap();
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].stem(), "01");
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_dangling_symlink() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "01.mp3");
        touch(temp.path(), "02.mp3");
        std::os::unix::fs::symlink("/nonexistent/cover.jpg", temp.path().join("cover.jpg")).unwrap();
        std::os::unix::fs::symlink("/nonexistent/03.mp3", temp.path().join("03.mp3")).unwrap();

        let tracks = scan_tracks(temp.path(), &["mp3"]).unwrap();
        let names: Vec<String> = tracks.iter().map(|t| t.file_name()).collect();
        assert_eq!(names, vec!["01.mp3", "02.mp3"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_includes_symlinked_track() {
        let temp = TempDir::new().unwrap();
        let elsewhere = TempDir::new().unwrap();
        touch(elsewhere.path(), "real.mp3");
        touch(temp.path(), "01.mp3");
        std::os::unix::fs::symlink(elsewhere.path().join("real.mp3"), temp.path().join("02.mp3")).unwrap();

        let tracks = scan_tracks(temp.path(), &["mp3"]).unwrap();
        assert_eq!(tracks.len(), 2);
        assert_eq!(tracks[1].file_name(), "02.mp3");
    }

    #[test]
    fn test_scan_empty_folder_returns_nothing() {
        let temp = TempDir::new().unwrap();
        let tracks = scan_tracks(temp.path(), &["mp3"]).unwrap();
        assert!(tracks.is_empty());
    }

    #[test]
    fn test_scan_missing_folder() {
        let result = scan_tracks(Path::new("/nonexistent/audiobook"), &["mp3"]);
        assert!(matches!(result, Err(ConvertError::InputDirMissing(_))));
    }

    #[test]
    fn test_scan_file_instead_of_folder() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "01.mp3");
        let result = scan_tracks(&temp.path().join("01.mp3"), &["mp3"]);
        assert!(matches!(result, Err(ConvertError::NotADirectory(_))));
    }

    #[test]
    fn test_track_stem_and_name() {
        let track = TrackRef {
            path: PathBuf::from("/books/dune/01 - Prologue.mp3"),
            ordinal: 0,
        };
        assert_eq!(track.stem(), "01 - Prologue");
        assert_eq!(track.file_name(), "01 - Prologue.mp3");
    }
}
