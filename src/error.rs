//! Error types for the conversion core
//!
//! Anything that stops a run from starting surfaces as a `ConvertError`
//! returned from `Pipeline::start`. Failures after the run has started are
//! turned into `ProgressEvent::Error` by the runner instead.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors produced by the conversion core
#[derive(Debug, Error)]
pub enum ConvertError {
    /// The input folder was not given or does not exist
    #[error("Input folder does not exist: {}", .0.display())]
    InputDirMissing(PathBuf),

    /// The input path exists but is not a folder
    #[error("Input path is not a folder: {}", .0.display())]
    NotADirectory(PathBuf),

    /// The folder contains no matching audio files
    #[error("No {extensions} files found in {}", .dir.display())]
    NoTracks { dir: PathBuf, extensions: String },

    /// No output file was specified
    #[error("Please specify an output file")]
    MissingOutput,

    /// An external tool could not be found or does not run
    #[error("{tool} is required but was not found: {reason}\n\n{hint}")]
    ToolMissing {
        tool: String,
        reason: String,
        hint: &'static str,
    },

    /// Bitrate token outside the supported set
    #[error("Unsupported bitrate '{0}' (expected one of 32k, 48k, 64k, 96k, 128k)")]
    InvalidBitrate(String),

    /// A conversion is already running on this pipeline
    #[error("A conversion is already in progress")]
    Busy,

    /// Walking the input folder failed
    #[error("Failed to read input folder: {0}")]
    Scan(#[from] walkdir::Error),

    /// An external process could not be spawned
    #[error("Failed to launch {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Installation hint shown when ffmpeg is missing
pub const FFMPEG_INSTALL_HINT: &str = "Please install FFmpeg:\n\
    \u{2022} Windows: Download from https://ffmpeg.org/\n\
    \u{2022} Mac: brew install ffmpeg\n\
    \u{2022} Linux: sudo apt install ffmpeg";
