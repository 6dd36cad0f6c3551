//! Audiobook encoding module
//!
//! Builds the ffmpeg invocation for a book and runs it on a background
//! worker, reporting progress through `ProgressEvent`s.

mod events;
mod ffmpeg;
mod pipeline;

pub use events::ProgressEvent;
pub use ffmpeg::{EncodeOutcome, EncodePlan, Encoder, FfmpegEncoder, CHANNELS, SAMPLE_RATE};
pub use pipeline::{describe_book, BookLayout, ConversionRequest, Pipeline, RunHandle};

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::{ConvertError, FFMPEG_INSTALL_HINT};

/// Platform file name of a tool
fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{}.exe", name)
    } else {
        name.to_string()
    }
}

/// Find an external tool such as `ffmpeg` or `ffprobe`
///
/// An explicit override must point at an existing file. Otherwise the tool is
/// looked for next to the executable (`resources/bin/`, or the macOS bundle's
/// `Resources/bin/`) and then on `PATH`.
pub fn locate_tool(name: &str, override_path: Option<&Path>) -> Result<PathBuf, ConvertError> {
    if let Some(path) = override_path {
        if path.is_file() {
            log::debug!("Using configured {} at {}", name, path.display());
            return Ok(path.to_path_buf());
        }
        return Err(ConvertError::ToolMissing {
            tool: name.to_string(),
            reason: format!("configured path {} does not exist", path.display()),
            hint: FFMPEG_INSTALL_HINT,
        });
    }

    let file_name = executable_name(name);

    if let Ok(exe_path) = std::env::current_exe()
        && let Some(exe_dir) = exe_path.parent()
    {
        let candidates = [
            exe_dir.join("resources").join("bin").join(&file_name),
            exe_dir.join("..").join("Resources").join("bin").join(&file_name),
        ];
        if let Some(found) = candidates.into_iter().find(|p| p.is_file()) {
            log::debug!("Found bundled {} at {}", name, found.display());
            return Ok(found);
        }
    }

    if let Some(paths) = std::env::var_os("PATH") {
        for dir in std::env::split_paths(&paths) {
            let candidate = dir.join(&file_name);
            if candidate.is_file() {
                log::debug!("Found {} on PATH at {}", name, candidate.display());
                return Ok(candidate);
            }
        }
    }

    Err(ConvertError::ToolMissing {
        tool: name.to_string(),
        reason: "not found on PATH".to_string(),
        hint: FFMPEG_INSTALL_HINT,
    })
}

/// Verify that a tool runs by asking for its version
pub fn verify_tool(path: &Path) -> Result<(), ConvertError> {
    let tool = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let status = Command::new(path)
        .arg("-version")
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .map_err(|e| ConvertError::ToolMissing {
            tool: tool.clone(),
            reason: format!("could not run {}: {}", path.display(), e),
            hint: FFMPEG_INSTALL_HINT,
        })?;

    if !status.success() {
        return Err(ConvertError::ToolMissing {
            tool,
            reason: format!("{} -version exited with {}", path.display(), status),
            hint: FFMPEG_INSTALL_HINT,
        });
    }

    log::debug!("{} verified at {}", tool, path.display());
    Ok(())
}
