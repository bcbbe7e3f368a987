use anyhow::Result;
use chrono::Local;
use colored::*;
use glob::glob;
use log::{Level, LevelFilter};
use std::path::{Path, PathBuf};

/// Maps a textual level (`trace`, `debug`, `info`, `warn`, `error`) to a filter.
///
/// Unknown strings fall back to `Info`. `fatal` is accepted as an alias of `error`.
pub fn parse_level(log_level: &str) -> LevelFilter {
    match log_level.trim().to_lowercase().as_str() {
        "trace" => LevelFilter::Trace,
        "debug" => LevelFilter::Debug,
        "warn" | "warning" => LevelFilter::Warn,
        "error" | "fatal" => LevelFilter::Error,
        "off" => LevelFilter::Off,
        _ => LevelFilter::Info,
    }
}

/// Colours a level tag for TTY output.
fn colored_level(level: Level) -> ColoredString {
    let tag = format!("[{}]", level);
    match level {
        Level::Error => tag.bright_red(),
        Level::Warn => tag.bright_yellow(),
        Level::Info => tag.bright_green(),
        Level::Debug => tag.bright_white(),
        Level::Trace => tag.bright_cyan(),
    }
}

/// Rotates log files for a given application and log directory.
///
/// Keeps only the most recent log file (the timestamp in the filename sorts
/// lexically) and deletes older ones. Called before a new file is opened, so
/// after startup the directory holds the previous run plus the current one.
///
/// # Returns
/// The paths that were removed.
pub fn rotate_logs(app_name: &str, log_dir: &Path) -> Vec<PathBuf> {
    let pattern = format!("{}/{}-*.log", log_dir.display(), app_name);
    let mut log_files: Vec<PathBuf> = match glob(&pattern) {
        Ok(paths) => paths.filter_map(|entry| entry.ok()).collect(),
        Err(e) => {
            eprintln!("Invalid log rotation pattern {}: {}", pattern, e);
            return Vec::new();
        }
    };

    // Newest first.
    log_files.sort_by(|a, b| b.file_name().cmp(&a.file_name()));

    let mut removed = Vec::new();
    for old_file in log_files.into_iter().skip(1) {
        match std::fs::remove_file(&old_file) {
            Ok(()) => removed.push(old_file),
            Err(e) => eprintln!("Error deleting old log file {}: {}", old_file.display(), e),
        }
    }
    removed
}

/// Installs the global `log` backend.
///
/// Output goes to stdout with coloured level tags and, when `log_dir` is
/// given, to `<log_dir>/<app_name>-YYYYmmdd_HHMMSS.log` without colours.
///
/// # Arguments
/// * `app_name` - Used as the log target prefix and the file stem.
/// * `log_dir` - Directory for the log file. `None` disables file output.
/// * `log_level` - Textual level, see [`parse_level`].
///
/// # Returns
/// The path of the log file, if one was opened.
///
/// # Errors
/// Fails if the directory or file cannot be created, or if a logger is
/// already installed for this process.
pub fn setup_logging(app_name: &str, log_dir: Option<&Path>, log_level: &str) -> Result<Option<PathBuf>> {
    let level = parse_level(log_level);

    let tty = fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{}{} {}",
                Local::now().format("[%Y-%m-%d %H:%M:%S]").to_string().truecolor(128, 128, 128),
                colored_level(record.level()),
                message
            ))
        })
        .chain(std::io::stdout());

    let mut root = fern::Dispatch::new().level(level).chain(tty);
    let mut log_path = None;

    if let Some(dir) = log_dir {
        std::fs::create_dir_all(dir)?;
        rotate_logs(app_name, dir);

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let path = dir.join(format!("{}-{}.log", app_name, timestamp));

        let app = app_name.to_string();
        let file = fern::Dispatch::new()
            .format(move |out, message, record| {
                out.finish(format_args!(
                    "{}[{}][{}][{}] {}",
                    Local::now().format("[%Y-%m-%d %H:%M:%S]"),
                    app,
                    record.target(),
                    record.level(),
                    message
                ))
            })
            .chain(fern::log_file(&path)?);

        root = root.chain(file);
        log_path = Some(path);
    }

    root.apply()?;
    Ok(log_path)
}
