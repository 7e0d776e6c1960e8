// Conditional logging macros - debug/info only active in debug builds

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use log::LevelFilter;

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        log::debug!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)*) => {{}};
}

#[cfg(debug_assertions)]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {
        log::info!($($arg)*);
    };
}

#[cfg(not(debug_assertions))]
#[macro_export]
macro_rules! info_log {
    ($($arg:tt)*) => {{}};
}

// Rejected operations are worth seeing in release builds too.
#[macro_export]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        log::warn!($($arg)*);
    };
}

/// Where log records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTarget {
    Stderr,
    /// Append to a file; used while the full-screen UI owns the terminal.
    File(PathBuf),
}

/// Default log file for the full-screen UI, under the user's cache directory.
#[must_use]
pub fn default_log_path() -> Option<PathBuf> {
    dirs::cache_dir().map(|dir| dir.join("hangman").join("hangman.log"))
}

/// Install the global logger. `RUST_LOG` overrides `level`.
///
/// Calling this more than once is harmless; later calls are ignored.
pub fn init_logging(level: LevelFilter, target: &LogTarget) {
    let mut builder = env_logger::Builder::new();
    builder.filter_level(level).parse_default_env().format(|buf, record| {
        writeln!(
            buf,
            "{} {:<5} {}: {}",
            chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
            record.level(),
            record.target(),
            record.args()
        )
    });

    if let LogTarget::File(path) = target
        && let Some(file) = open_log_file(path)
    {
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }

    let _ = builder.try_init();
}

fn open_log_file(path: &Path) -> Option<File> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).ok()?;
    }
    File::options().create(true).append(true).open(path).ok()
}
