//! Core book-assembly logic
//!
//! This module contains:
//! - Natural ordering of track file names
//! - Input folder scanning
//! - Chapter planning from track durations
//! - The supported output bitrates
//! - Persisted settings

pub mod bitrate;
pub mod chapters;
pub mod natural_sort;
pub mod scanning;
pub mod settings;

pub use bitrate::Bitrate;
pub use chapters::{plan_chapters, Chapter, TimedTrack};
pub use natural_sort::{natural_cmp, natural_sort_by_key};
pub use scanning::{format_duration, scan_tracks, TrackRef};
pub use settings::AppSettings;
