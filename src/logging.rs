use env_logger::{Builder, Target};
use log::info;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

// The terminal UI owns stdout and stderr.
pub const LOG_FILE_NAME: &str = "route.log";

static LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

/// Installs the logger writing to `dir/route.log` at `level` (an env_logger
/// filter string such as `info` or `founders_route=debug`).
///
/// Repeated calls with the same directory are no-ops; a different directory
/// is rejected.
pub fn init_logging(level: &str, dir: &Path) -> Result<(), String> {
    let path = dir.join(LOG_FILE_NAME);
    if let Some(existing) = LOG_PATH.get() {
        if *existing == path {
            return Ok(());
        }
        return Err(format!(
            "logging already initialized at {}; refusing to switch to {}",
            existing.display(),
            path.display()
        ));
    }

    fs::create_dir_all(dir)
        .map_err(|err| format!("failed to create log directory {}: {err}", dir.display()))?;
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&path)
        .map_err(|err| format!("failed to open log file {}: {err}", path.display()))?;

    Builder::new()
        .parse_filters(level)
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(|err| format!("failed to install logger: {err}"))?;

    let _ = LOG_PATH.set(path);
    info!(
        "event=app_start status=ok platform={} version={} level={}",
        std::env::consts::OS,
        env!("CARGO_PKG_VERSION"),
        level
    );
    Ok(())
}

pub fn log_path() -> Option<&'static Path> {
    LOG_PATH.get().map(PathBuf::as_path)
}
