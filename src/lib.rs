//! Audiobook Binder
//!
//! Turns a folder of audio tracks into a single chaptered M4B audiobook:
//! tracks are ordered naturally, each becomes one chapter, and ffmpeg joins
//! them gaplessly into AAC.

pub mod audio;
pub mod conversion;
pub mod core;
pub mod error;
pub mod logging;

pub use conversion::{ConversionRequest, Pipeline, ProgressEvent, RunHandle};
pub use error::ConvertError;
