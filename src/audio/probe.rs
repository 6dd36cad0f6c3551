//! Track duration probing
//!
//! Durations only place chapter markers, so probing is best effort: any
//! failure substitutes `FALLBACK_DURATION_SECS` for that one track and the run
//! carries on.

use std::fs::File;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use thiserror::Error;

use crate::core::scanning::TrackRef;
use crate::core::chapters::TimedTrack;

/// Duration assumed for a track whose length cannot be read (30 minutes)
pub const FALLBACK_DURATION_SECS: f64 = 1800.0;

/// Why a duration could not be read
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("failed to run {tool}: {source}")]
    Launch {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    #[error("{tool} exited with {status}: {stderr}")]
    Failed {
        tool: String,
        status: std::process::ExitStatus,
        stderr: String,
    },
    #[error("unexpected probe output: {0:?}")]
    Unparseable(String),
    #[error("invalid duration: {0}")]
    Invalid(f64),
    #[error("{0}")]
    Decode(String),
}

/// Something that can report how long an audio file plays
pub trait DurationProbe: Send + Sync {
    fn probe(&self, path: &Path) -> Result<f64, ProbeError>;
}

/// Probes durations by running ffprobe
#[derive(Debug, Clone)]
pub struct FfprobeProbe {
    ffprobe_path: PathBuf,
}

impl FfprobeProbe {
    pub fn new(ffprobe_path: impl Into<PathBuf>) -> Self {
        Self {
            ffprobe_path: ffprobe_path.into(),
        }
    }
}

impl DurationProbe for FfprobeProbe {
    fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        // -show_entries format=duration -of csv=p=0 prints a bare seconds value
        let output = Command::new(&self.ffprobe_path)
            .args(["-v", "quiet", "-show_entries", "format=duration", "-of", "csv=p=0"])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| ProbeError::Launch {
                tool: self.ffprobe_path.display().to_string(),
                source: e,
            })?;

        if !output.status.success() {
            return Err(ProbeError::Failed {
                tool: self.ffprobe_path.display().to_string(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        parse_seconds(&String::from_utf8_lossy(&output.stdout))
    }
}

/// Reads durations in-process with symphonia
///
/// Used when ffprobe is not installed. Relies on the container reporting a
/// frame count, which holds for files with a Xing/VBRI header or a fixed
/// bitrate.
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeProbe;

impl DurationProbe for NativeProbe {
    fn probe(&self, path: &Path) -> Result<f64, ProbeError> {
        let file =
            File::open(path).map_err(|e| ProbeError::Decode(format!("Failed to open file: {}", e)))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension() {
            hint.with_extension(&ext.to_string_lossy());
        }

        let probed = symphonia::default::get_probe()
            .format(&hint, mss, &FormatOptions::default(), &MetadataOptions::default())
            .map_err(|e| ProbeError::Decode(format!("Failed to probe audio format: {}", e)))?;

        let track = probed
            .format
            .default_track()
            .ok_or_else(|| ProbeError::Decode("No default track found".to_string()))?;

        let sample_rate = track
            .codec_params
            .sample_rate
            .ok_or_else(|| ProbeError::Decode("Unknown sample rate".to_string()))?;
        let n_frames = track
            .codec_params
            .n_frames
            .ok_or_else(|| ProbeError::Decode("Unknown frame count".to_string()))?;

        validate(n_frames as f64 / sample_rate as f64)
    }
}

/// Parse the single seconds value printed by ffprobe
pub fn parse_seconds(output: &str) -> Result<f64, ProbeError> {
    let trimmed = output.trim();
    let seconds: f64 = trimmed
        .parse()
        .map_err(|_| ProbeError::Unparseable(trimmed.to_string()))?;
    validate(seconds)
}

fn validate(seconds: f64) -> Result<f64, ProbeError> {
    if seconds.is_finite() && seconds >= 0.0 {
        Ok(seconds)
    } else {
        Err(ProbeError::Invalid(seconds))
    }
}

/// Result of probing one track
#[derive(Debug, Clone, PartialEq)]
pub struct ProbedTrack {
    pub timed: TimedTrack,
    /// True when the fallback duration was substituted
    pub estimated: bool,
}

/// Probe a track, substituting the fallback duration on any failure
pub fn probe_track(prober: &dyn DurationProbe, track: &TrackRef) -> ProbedTrack {
    let (duration, estimated) = match prober.probe(&track.path) {
        Ok(seconds) => {
            log::debug!("{}: {:.3}s", track.file_name(), seconds);
            (seconds, false)
        }
        Err(e) => {
            log::warn!(
                "Could not read duration of {} ({}); assuming {}s",
                track.path.display(),
                e,
                FALLBACK_DURATION_SECS
            );
            (FALLBACK_DURATION_SECS, true)
        }
    };

    ProbedTrack {
        timed: TimedTrack {
            track: track.clone(),
            duration,
        },
        estimated,
    }
}
