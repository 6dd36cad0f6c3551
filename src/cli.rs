//! Command-line arguments

use clap::Parser;
use std::path::{Path, PathBuf};

use audiobook_binder::audio::metadata::DEFAULT_TITLE;
use audiobook_binder::conversion::ConversionRequest;
use audiobook_binder::core::{AppSettings, Bitrate};

#[derive(Parser, Debug)]
#[command(name = "audiobook-binder", version)]
#[command(about = "Bind a folder of MP3 tracks into one chaptered M4B audiobook", long_about = None)]
pub struct Args {
    /// Folder containing the book's tracks
    pub input_dir: PathBuf,

    /// Output file (default: <folder name>.m4b next to the folder)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Book title (default: the folder name)
    #[arg(short, long)]
    pub title: Option<String>,

    /// Book author
    #[arg(short, long)]
    pub author: Option<String>,

    /// AAC bitrate: 32k, 48k, 64k, 96k or 128k
    #[arg(short, long)]
    pub bitrate: Option<Bitrate>,

    /// Path to the ffmpeg binary
    #[arg(long)]
    pub ffmpeg: Option<PathBuf>,

    /// Path to the ffprobe binary
    #[arg(long)]
    pub ffprobe: Option<PathBuf>,

    /// Read track durations in-process instead of with ffprobe
    #[arg(long)]
    pub native_probe: bool,

    /// Show tracks, chapters and the ffmpeg command without encoding
    #[arg(long)]
    pub dry_run: bool,

    /// Remember bitrate, author and tool paths for next time
    #[arg(long)]
    pub save_settings: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Fold command-line overrides into the loaded settings
    pub fn apply_to(&self, settings: &mut AppSettings) {
        if let Some(bitrate) = self.bitrate {
            settings.default_bitrate = bitrate;
        }
        if let Some(author) = &self.author {
            settings.default_author = author.clone();
        }
        if let Some(path) = &self.ffmpeg {
            settings.ffmpeg_path = Some(path.clone());
        }
        if let Some(path) = &self.ffprobe {
            settings.ffprobe_path = Some(path.clone());
        }
        if self.native_probe {
            settings.native_probe = true;
        }
    }

    pub fn to_request(&self, settings: &AppSettings) -> ConversionRequest {
        let title = self
            .title
            .clone()
            .unwrap_or_else(|| folder_name(&self.input_dir).unwrap_or_default());
        let output = self
            .output
            .clone()
            .unwrap_or_else(|| default_output(&self.input_dir));

        ConversionRequest::new(&self.input_dir, output)
            .with_title(title)
            .with_author(settings.default_author.clone())
            .with_bitrate(settings.default_bitrate)
            .with_extensions(settings.extensions.clone())
    }
}

/// Last component of a folder path, resolving `.` and friends when possible
fn folder_name(dir: &Path) -> Option<String> {
    dir.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .or_else(|| {
            dir.canonicalize()
                .ok()?
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
        })
}

/// `<parent>/<folder name>.m4b`
fn default_output(input_dir: &Path) -> PathBuf {
    let dir = input_dir
        .canonicalize()
        .unwrap_or_else(|_| input_dir.to_path_buf());
    let name = folder_name(&dir).unwrap_or_else(|| DEFAULT_TITLE.to_string());
    let file_name = format!("{}.m4b", name);
    match dir.parent() {
        Some(parent) => parent.join(file_name),
        None => PathBuf::from(file_name),
    }
}
