//! Chapter planning
//!
//! Each track becomes one chapter. Chapters are laid end to end starting at
//! zero, so `chapters[i].end == chapters[i + 1].start` always holds.

use super::scanning::TrackRef;

/// A track paired with its playback length in seconds
#[derive(Debug, Clone, PartialEq)]
pub struct TimedTrack {
    pub track: TrackRef,
    /// Never negative; probe fallbacks are already substituted
    pub duration: f64,
}

/// One chapter marker of the finished audiobook
#[derive(Debug, Clone, PartialEq)]
pub struct Chapter {
    pub start: f64,
    pub end: f64,
    pub title: String,
}

impl Chapter {
    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Title for the chapter produced by `track`
pub fn chapter_title(track: &TrackRef) -> String {
    format!("Chapter {}: {}", track.ordinal + 1, track.stem())
}

/// Lay out one chapter per track, in the given order
pub fn plan_chapters(tracks: &[TimedTrack]) -> Vec<Chapter> {
    let mut offset = 0.0;
    tracks
        .iter()
        .map(|timed| {
            let start = offset;
            offset += timed.duration;
            Chapter {
                start,
                end: offset,
                title: chapter_title(&timed.track),
            }
        })
        .collect()
}

/// Sum of all chapter lengths
pub fn total_duration(chapters: &[Chapter]) -> f64 {
    chapters.last().map(|c| c.end).unwrap_or(0.0)
}
