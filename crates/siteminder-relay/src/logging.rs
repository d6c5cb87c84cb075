// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Log subscriber setup.
//!
//! [`init`] installs the process-wide subscriber and returns a [`LogGuard`] owning the log
//! file. Keep the guard alive for as long as the relay runs; dropping it syncs the file.

use std::fs::{File, OpenOptions};
use std::path::Path;
use std::sync::Arc;

use crate::errors::StartupError;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Log file name that selects stderr instead of a file.
pub const STDERR: &str = "-";

#[must_use = "dropping the guard releases the log file"]
pub struct LogGuard {
    file: Option<Arc<File>>,
}

impl Drop for LogGuard {
    fn drop(&mut self) {
        if let Some(file) = &self.file {
            // nothing left to report to if this fails
            let _ = file.sync_all();
        }
    }
}

/// Installs the global subscriber, writing to `log_file` (or stderr for `-`).
pub fn init(debug: bool, log_file: &str) -> Result<LogGuard, StartupError> {
    let builder = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(env_filter(debug)?)
        .with_level(true)
        .with_thread_names(false)
        .with_thread_ids(false)
        .with_line_number(false)
        .with_file(false)
        .with_target(true)
        .with_ansi(false);

    let guard = if log_file == STDERR {
        let subscriber = builder.with_writer(std::io::stderr).finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| StartupError::Logger(e.to_string()))?;
        LogGuard { file: None }
    } else {
        let file = open_log_file(Path::new(log_file))?;
        let subscriber = builder.with_writer(Arc::clone(&file)).finish();
        tracing::subscriber::set_global_default(subscriber)
            .map_err(|e| StartupError::Logger(e.to_string()))?;
        LogGuard { file: Some(file) }
    };

    debug!("Logging subsystem enabled");
    Ok(guard)
}

fn env_filter(debug: bool) -> Result<EnvFilter, StartupError> {
    let level = if debug { "debug" } else { "info" };
    EnvFilter::try_new(format!("h2=off,hyper=off,rustls=off,{level}"))
        .map_err(|e| StartupError::Logger(e.to_string()))
}

fn open_log_file(path: &Path) -> Result<Arc<File>, StartupError> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map(Arc::new)
        .map_err(|source| StartupError::LogFile {
            path: path.to_path_buf(),
            source,
        })
}
