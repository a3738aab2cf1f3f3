//! Tracing configuration and log routing.
//!
//! Log lines go to stdout in compact form and are appended to the file named by
//! [`Config::log_file`](crate::config::Config::log_file). The file layer is best effort: when the
//! path cannot be opened the service keeps running with stdout only.
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;
use tracing_appender::non_blocking::{NonBlocking, WorkerGuard};
use tracing_appender::rolling::{InitError, RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

static LOG_GUARD: OnceLock<WorkerGuard> = OnceLock::new();

/// Reasons the log file could not be attached.
#[derive(Debug, Error)]
pub enum LogFileError {
    /// The configured path ends in `..` or a root and names no file.
    #[error("log path {0} does not name a file")]
    MissingFileName(PathBuf),
    /// The parent directory could not be created.
    #[error("failed to create log directory {path}: {source}")]
    CreateDir {
        /// Directory that was being created.
        path: PathBuf,
        /// Underlying filesystem error.
        #[source]
        source: io::Error,
    },
    /// The file itself could not be opened for appending.
    #[error("failed to open log file: {0}")]
    Open(#[from] InitError),
}

/// Install the global subscriber: `RUST_LOG` filtering (default `info`), stdout, and `log_file`.
pub fn init_tracing(log_file: &Path) {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let stdout_layer = fmt::layer().with_target(false).compact();
    let registry = tracing_subscriber::registry()
        .with(env_filter)
        .with(stdout_layer);

    match open_log_file(log_file) {
        Ok((writer, guard)) => {
            let _ = LOG_GUARD.set(guard);
            let file_layer = fmt::layer()
                .with_writer(writer)
                .with_target(true)
                .with_ansi(false)
                .compact();
            registry.with(file_layer).init();
        }
        Err(error) => {
            registry.init();
            tracing::warn!(error = %error, "File logging disabled");
        }
    }
}

/// Open `path` for appending behind a non-blocking writer, creating parent directories.
///
/// Lines are flushed until the returned guard is dropped.
pub fn open_log_file(path: &Path) -> Result<(NonBlocking, WorkerGuard), LogFileError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| LogFileError::MissingFileName(path.to_path_buf()))?;
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    std::fs::create_dir_all(directory).map_err(|source| LogFileError::CreateDir {
        path: directory.to_path_buf(),
        source,
    })?;
    let appender = RollingFileAppender::builder()
        .rotation(Rotation::NEVER)
        .filename_prefix(file_name)
        .build(directory)?;
    Ok(tracing_appender::non_blocking(appender))
}
