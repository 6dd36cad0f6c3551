//! Audiobook tags and the ffmpeg metadata sidecar format
//!
//! The sidecar is an `;FFMETADATA1` text file fed to ffmpeg as an extra input
//! so the container picks up the book tags and chapter list.
//!
//! Values are written verbatim. Titles containing `=`, `;`, `#`, `\` or
//! newlines are not escaped and may be misread by ffmpeg.

use std::fmt::Write;

use crate::core::chapters::Chapter;

/// Title used when none is supplied
pub const DEFAULT_TITLE: &str = "Audiobook";
/// Author used when none is supplied
pub const DEFAULT_AUTHOR: &str = "Unknown";
/// Fixed album artist and genre tag
pub const AUDIOBOOK_TAG: &str = "Audiobook";

/// Container-level tags and chapters for one conversion
#[derive(Debug, Clone, PartialEq)]
pub struct AudiobookMetadata {
    pub title: String,
    pub author: String,
    pub album_artist: &'static str,
    pub genre: &'static str,
    pub chapters: Vec<Chapter>,
}

impl AudiobookMetadata {
    /// Build metadata, defaulting blank title and author
    pub fn new(title: &str, author: &str, chapters: Vec<Chapter>) -> Self {
        Self {
            title: non_blank_or(title, DEFAULT_TITLE),
            author: non_blank_or(author, DEFAULT_AUTHOR),
            album_artist: AUDIOBOOK_TAG,
            genre: AUDIOBOOK_TAG,
            chapters,
        }
    }

    /// Render as an `;FFMETADATA1` document
    pub fn to_ffmetadata(&self) -> String {
        let mut out = String::new();
        out.push_str(";FFMETADATA1\n");
        // Writing into a String cannot fail
        let _ = writeln!(out, "title={}", self.title);
        let _ = writeln!(out, "artist={}", self.author);
        let _ = writeln!(out, "album_artist={}", self.album_artist);
        let _ = writeln!(out, "genre={}", self.genre);
        out.push('\n');

        for chapter in &self.chapters {
            out.push_str("[CHAPTER]\n");
            out.push_str("TIMEBASE=1/1000\n");
            let _ = writeln!(out, "START={}", to_millis(chapter.start));
            let _ = writeln!(out, "END={}", to_millis(chapter.end));
            let _ = writeln!(out, "title={}", chapter.title);
            out.push('\n');
        }

        out
    }
}

fn non_blank_or(value: &str, fallback: &str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Seconds to whole milliseconds, truncating
pub fn to_millis(seconds: f64) -> u64 {
    (seconds * 1000.0) as u64
}
