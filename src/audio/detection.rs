use std::path::Path;

/// Extensions accepted when no explicit list is configured
pub const DEFAULT_EXTENSIONS: &[&str] = &["mp3"];

/// Check if a file is an input track based on its extension
///
/// Matching is case-insensitive; entries in `extensions` may be given with or
/// without a leading dot.
pub fn is_track_file<S: AsRef<str>>(path: &Path, extensions: &[S]) -> bool {
    let Some(ext) = path.extension() else {
        return false;
    };
    let ext = ext.to_string_lossy();
    extensions
        .iter()
        .any(|e| e.as_ref().trim_start_matches('.').eq_ignore_ascii_case(&ext))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recognizes_configured_formats() {
        assert!(is_track_file(Path::new("01.mp3"), DEFAULT_EXTENSIONS));
        assert!(is_track_file(Path::new("01.MP3"), DEFAULT_EXTENSIONS));
        assert!(is_track_file(Path::new("01.flac"), &["mp3", ".flac"]));
        assert!(is_track_file(Path::new("01.Mp3"), &[".MP3"]));
    }

    #[test]
    fn test_rejects_other_files() {
        assert!(!is_track_file(Path::new("cover.jpg"), DEFAULT_EXTENSIONS));
        assert!(!is_track_file(Path::new("README"), DEFAULT_EXTENSIONS));
        assert!(!is_track_file(Path::new("01.flac"), DEFAULT_EXTENSIONS));
    }
}
