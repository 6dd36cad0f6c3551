//! Logger setup for the command-line binder
//!
//! Everything goes to the terminal and, when possible, to a log file that can
//! be attached to bug reports:
//! - macOS: `~/Library/Logs/Audiobook-Binder/audiobook-binder.log`
//! - elsewhere: `<data_local_dir>/audiobook-binder/logs/audiobook-binder.log`

use log::LevelFilter;
use simplelog::{
    ColorChoice, CombinedLogger, Config, ConfigBuilder, SharedLogger, TermLogger, TerminalMode,
    WriteLogger,
};
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

const LOG_FILE_NAME: &str = "audiobook-binder.log";
const ROTATED_LOG_FILE_NAME: &str = "audiobook-binder.log.old";
const MAX_LOG_BYTES: u64 = 10 * 1024 * 1024;

/// Directory holding the log file
pub fn log_directory() -> Option<PathBuf> {
    if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library").join("Logs").join("Audiobook-Binder"))
    } else {
        dirs::data_local_dir().map(|d| d.join("audiobook-binder").join("logs"))
    }
}

pub fn log_file_path() -> Option<PathBuf> {
    log_directory().map(|d| d.join(LOG_FILE_NAME))
}

/// Move an oversized log aside so the next session starts fresh
fn rotate_if_large(log_dir: &Path) {
    let log_path = log_dir.join(LOG_FILE_NAME);
    if let Ok(metadata) = fs::metadata(&log_path)
        && metadata.len() > MAX_LOG_BYTES
    {
        let _ = fs::rename(&log_path, log_dir.join(ROTATED_LOG_FILE_NAME));
    }
}

fn log_config() -> Config {
    ConfigBuilder::new()
        .set_time_format_rfc3339()
        .set_thread_level(LevelFilter::Off)
        .set_target_level(LevelFilter::Off)
        .build()
}

fn terminal_level(verbose: bool) -> LevelFilter {
    if verbose { LevelFilter::Debug } else { LevelFilter::Info }
}

/// Initialize terminal + file logging
///
/// Returns the log file path, or `None` when only terminal logging could be
/// set up.
pub fn init_logging(verbose: bool) -> Option<PathBuf> {
    let Some(log_dir) = log_directory() else {
        eprintln!("Warning: Could not determine log directory");
        init_terminal_only(verbose);
        return None;
    };

    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Could not create log directory: {}", e);
        init_terminal_only(verbose);
        return None;
    }

    rotate_if_large(&log_dir);
    let log_path = log_dir.join(LOG_FILE_NAME);

    let log_file = match OpenOptions::new().create(true).append(true).open(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not open log file: {}", e);
            init_terminal_only(verbose);
            return None;
        }
    };

    let loggers: Vec<Box<dyn SharedLogger>> = vec![
        TermLogger::new(
            terminal_level(verbose),
            log_config(),
            TerminalMode::Mixed,
            ColorChoice::Auto,
        ),
        WriteLogger::new(LevelFilter::Debug, log_config(), log_file),
    ];

    if CombinedLogger::init(loggers).is_err() {
        eprintln!("Warning: Logger already initialized");
    }

    log::debug!("=== Audiobook Binder session started ===");
    log::debug!("Log file: {}", log_path.display());

    Some(log_path)
}

fn init_terminal_only(verbose: bool) {
    let term_logger = TermLogger::new(
        terminal_level(verbose),
        log_config(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    );
    let _ = CombinedLogger::init(vec![term_logger]);
}
