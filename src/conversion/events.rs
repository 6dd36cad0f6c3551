//! Progress events emitted by a conversion run

use std::path::PathBuf;

/// Events emitted by the background worker, in the order they happen
///
/// A run produces any number of `Status` events followed by exactly one
/// `Success` or `Error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Informational progress text
    Status(String),
    /// The audiobook was written
    Success { output_path: PathBuf, message: String },
    /// The run failed; the text is meant to be shown or copied as-is
    Error(String),
}

impl ProgressEvent {
    /// True for `Success` and `Error`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ProgressEvent::Status(_))
    }

    /// The event's display text
    pub fn message(&self) -> &str {
        match self {
            ProgressEvent::Status(msg) | ProgressEvent::Error(msg) => msg,
            ProgressEvent::Success { message, .. } => message,
        }
    }
}
