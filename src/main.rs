//! Audiobook Binder - command-line front end

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use audiobook_binder::audio::metadata_writer::SIDECAR_FILE_NAME;
use audiobook_binder::audio::{DurationProbe, FfprobeProbe, NativeProbe};
use audiobook_binder::conversion::{locate_tool, EncodePlan, FfmpegEncoder};
use audiobook_binder::core::{format_duration, AppSettings};
use audiobook_binder::{logging, ConversionRequest, Pipeline, ProgressEvent};

use cli::Args;

/// Pick ffprobe when available, the in-process reader otherwise
fn choose_prober(settings: &AppSettings) -> Arc<dyn DurationProbe> {
    if settings.native_probe {
        log::debug!("Reading durations in-process");
        return Arc::new(NativeProbe);
    }
    match locate_tool("ffprobe", settings.ffprobe_path.as_deref()) {
        Ok(path) => Arc::new(FfprobeProbe::new(path)),
        Err(e) => {
            log::warn!("ffprobe unavailable, reading durations in-process: {}", e);
            Arc::new(NativeProbe)
        }
    }
}

fn dry_run(pipeline: &Pipeline, request: &ConversionRequest, ffmpeg: &Path) -> Result<ExitCode> {
    let layout = pipeline
        .preview(request)
        .context("Cannot prepare conversion")?;

    println!("Title:  {}", layout.metadata.title);
    println!("Author: {}", layout.metadata.author);
    println!("Chapters ({}):", layout.metadata.chapters.len());
    for (chapter, probed) in layout.metadata.chapters.iter().zip(&layout.tracks) {
        println!(
            "  {:>8}  {}  ({}{})",
            format_duration(chapter.start),
            chapter.title,
            format_duration(chapter.duration()),
            if probed.estimated { ", estimated" } else { "" }
        );
    }
    println!("Total:  {}", format_duration(layout.total_duration()));

    let tracks = layout.tracks.iter().map(|p| p.timed.track.clone()).collect();
    let sidecar = std::env::temp_dir()
        .join("audiobook-binder-XXXXXX")
        .join(SIDECAR_FILE_NAME);
    let plan = EncodePlan::new(
        tracks,
        sidecar,
        request.bitrate,
        request.output_path.clone(),
    );
    println!();
    println!("{}", plan.command_line(ffmpeg));

    Ok(ExitCode::SUCCESS)
}

fn main() -> Result<ExitCode> {
    let args = Args::parse();
    logging::init_logging(args.verbose);

    let mut settings = AppSettings::load();
    args.apply_to(&mut settings);

    if args.save_settings {
        let path = settings.save().map_err(anyhow::Error::msg)?;
        log::info!("Settings saved to {}", path.display());
    }

    let ffmpeg = locate_tool("ffmpeg", settings.ffmpeg_path.as_deref())?;
    let pipeline = Pipeline::new(
        choose_prober(&settings),
        Arc::new(FfmpegEncoder::new(&ffmpeg)),
    );
    let request = args.to_request(&settings);

    if args.dry_run {
        return dry_run(&pipeline, &request, &ffmpeg);
    }

    let mut handle = pipeline
        .start(request)
        .context("Cannot start conversion")?;

    while let Some(event) = handle.recv_blocking() {
        match event {
            ProgressEvent::Status(message) => println!("{}", message),
            ProgressEvent::Success { message, .. } => {
                println!("{}", message);
                return Ok(ExitCode::SUCCESS);
            }
            ProgressEvent::Error(message) => {
                eprintln!("{}", message);
                return Ok(ExitCode::FAILURE);
            }
        }
    }

    Ok(ExitCode::FAILURE)
}
