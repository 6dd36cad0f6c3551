//! FFmpeg invocation for gapless audiobook encoding
//!
//! An `EncodePlan` describes one ffmpeg run: every track as a numbered input,
//! the metadata sidecar as the last input, and a concat filter joining the
//! audio streams into one continuous AAC stream in an MP4 container.

use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use crate::core::{Bitrate, TrackRef};
use crate::error::ConvertError;

/// Output sample rate in Hz
pub const SAMPLE_RATE: u32 = 44100;
/// Output channel count
pub const CHANNELS: u32 = 2;
/// Filter graph label of the joined stream
const CONCAT_LABEL: &str = "[outa]";

/// Everything needed to encode one audiobook
#[derive(Debug, Clone, PartialEq)]
pub struct EncodePlan {
    inputs: Vec<TrackRef>,
    metadata_path: PathBuf,
    bitrate: Bitrate,
    output_path: PathBuf,
}

impl EncodePlan {
    pub fn new(
        inputs: Vec<TrackRef>,
        metadata_path: impl Into<PathBuf>,
        bitrate: Bitrate,
        output_path: impl Into<PathBuf>,
    ) -> Self {
        Self {
            inputs,
            metadata_path: metadata_path.into(),
            bitrate,
            output_path: output_path.into(),
        }
    }

    pub fn inputs(&self) -> &[TrackRef] {
        &self.inputs
    }

    pub fn metadata_path(&self) -> &Path {
        &self.metadata_path
    }

    pub fn bitrate(&self) -> Bitrate {
        self.bitrate
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Input index of the metadata sidecar (always after every track)
    pub fn metadata_input_index(&self) -> usize {
        self.inputs.len()
    }

    /// Concat filter over the first audio stream of each track
    ///
    /// Embedded cover art and other video streams are never selected.
    pub fn filter_graph(&self) -> String {
        let mut graph: String = (0..self.inputs.len())
            .map(|idx| format!("[{}:a:0]", idx))
            .collect();
        graph.push_str(&format!(
            "concat=n={}:v=0:a=1{}",
            self.inputs.len(),
            CONCAT_LABEL
        ));
        graph
    }

    /// Full ffmpeg argument list (without the program name)
    pub fn to_args(&self) -> Vec<OsString> {
        let mut args: Vec<OsString> = Vec::with_capacity(self.inputs.len() * 2 + 32);

        // -i <track>        : one numbered input per track, in book order
        for track in &self.inputs {
            args.push("-i".into());
            args.push(track.path.clone().into_os_string());
        }
        // -i <sidecar>      : metadata input last, index N
        args.push("-i".into());
        args.push(self.metadata_path.clone().into_os_string());

        let metadata_index = self.metadata_input_index().to_string();
        let bitrate = self.bitrate.token();
        let sample_rate = SAMPLE_RATE.to_string();
        let channels = CHANNELS.to_string();
        let graph = self.filter_graph();

        // -filter_complex   : join every track's audio into [outa]
        // -map [outa]       : only the joined stream goes to the output
        // -map_metadata N   : tags and chapters come from the sidecar
        // -vn               : no cover art / video in the output
        // -fflags +genpts   : regenerate timestamps across the joins
        // -movflags +faststart : moov atom at the front for streaming
        // -y                : overwrite an existing output file
        let tail: [&str; 22] = [
            "-filter_complex",
            &graph,
            "-map",
            CONCAT_LABEL,
            "-map_metadata",
            &metadata_index,
            "-vn",
            "-c:a",
            "aac",
            "-b:a",
            &bitrate,
            "-ar",
            &sample_rate,
            "-ac",
            &channels,
            "-fflags",
            "+genpts",
            "-movflags",
            "+faststart",
            "-f",
            "mp4",
            "-y",
        ];
        args.extend(tail.iter().map(OsString::from));
        args.push(self.output_path.clone().into_os_string());
        args
    }

    /// Shell-like rendering of the command, for logs and dry runs
    pub fn command_line(&self, program: &Path) -> String {
        std::iter::once(program.as_os_str().to_os_string())
            .chain(self.to_args())
            .map(|arg| {
                let arg = arg.to_string_lossy().to_string();
                if arg.is_empty() || arg.contains(|c: char| c.is_whitespace() || "'\"[]".contains(c)) {
                    format!("'{}'", arg.replace('\'', "'\\''"))
                } else {
                    arg
                }
            })
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Result of running the encoder to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodeOutcome {
    pub success: bool,
    /// Encoder diagnostics (stderr), kept verbatim
    pub diagnostics: String,
    /// Description of the exit status, e.g. "exit status: 1"
    pub status: String,
}

impl EncodeOutcome {
    pub fn from_status(status: ExitStatus, stderr: &[u8]) -> Self {
        Self {
            success: status.success(),
            diagnostics: String::from_utf8_lossy(stderr).to_string(),
            status: status.to_string(),
        }
    }

    /// Text surfaced to the user when encoding failed
    pub fn failure_text(&self) -> String {
        if self.diagnostics.trim().is_empty() {
            format!("Encoder failed with {}", self.status)
        } else {
            self.diagnostics.clone()
        }
    }
}

/// External encoder capable of executing an `EncodePlan`
pub trait Encoder: Send + Sync {
    /// Confirm the encoder can be run at all
    fn verify(&self) -> Result<(), ConvertError>;

    /// Run the plan to completion
    ///
    /// Returns `Err` only when the encoder could not be started; a started
    /// encoder that fails is reported through `EncodeOutcome`.
    fn encode(&self, plan: &EncodePlan) -> Result<EncodeOutcome, ConvertError>;
}

/// Encoder backed by an ffmpeg binary
#[derive(Debug, Clone)]
pub struct FfmpegEncoder {
    ffmpeg_path: PathBuf,
}

impl FfmpegEncoder {
    pub fn new(ffmpeg_path: impl Into<PathBuf>) -> Self {
        Self {
            ffmpeg_path: ffmpeg_path.into(),
        }
    }

    pub fn ffmpeg_path(&self) -> &Path {
        &self.ffmpeg_path
    }
}

impl Encoder for FfmpegEncoder {
    fn verify(&self) -> Result<(), ConvertError> {
        super::verify_tool(&self.ffmpeg_path)
    }

    fn encode(&self, plan: &EncodePlan) -> Result<EncodeOutcome, ConvertError> {
        log::info!(
            "Encoding {} tracks -> {} at {}",
            plan.inputs().len(),
            plan.output_path().display(),
            plan.bitrate()
        );
        log::debug!("{}", plan.command_line(&self.ffmpeg_path));

        let output = Command::new(&self.ffmpeg_path)
            .args(plan.to_args())
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| ConvertError::Launch {
                tool: self.ffmpeg_path.display().to_string(),
                source: e,
            })?;

        let outcome = EncodeOutcome::from_status(output.status, &output.stderr);
        if outcome.success {
            log::info!("Successfully encoded: {}", plan.output_path().display());
        } else {
            log::error!(
                "ffmpeg exited with {}: {}",
                outcome.status,
                outcome.diagnostics.lines().last().unwrap_or("Unknown error")
            );
        }
        Ok(outcome)
    }
}
