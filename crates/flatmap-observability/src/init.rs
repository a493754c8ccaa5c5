// Copyright 2025 Neuraville Inc.
// SPDX-License-Identifier: Apache-2.0

//! Logging initialization
//!
//! Console logging is always available. With the `file-logging` feature,
//! [`init_logging`] also writes JSON logs into a timestamped run folder:
//!
//! ```text
//! ./logs/
//!   └── run_20250101_120000/
//!       ├── flatmap-pathways.log
//!       ├── flatmap-config.log
//!       └── flatmap.log (combined)
//! ```

use anyhow::{Context, Result};
use chrono::{NaiveDateTime, TimeZone, Utc};
use std::path::{Path, PathBuf};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, Registry};

use crate::cli::CrateDebugFlags;
use crate::config::{LogFormat, LogOutput, LoggingConfig, RetentionConfig};

const RUN_PREFIX: &str = "run_";
const RUN_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Filter built from the configured level and the per-crate debug flags
pub fn build_filter(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<EnvFilter> {
    let directives = debug_flags.to_filter_string(&config.level);
    EnvFilter::try_new(&directives)
        .with_context(|| format!("Invalid log filter: {}", directives))
}

/// Install a console subscriber
///
/// Fails when a global subscriber is already set.
pub fn init_console_logging(debug_flags: &CrateDebugFlags, config: &LoggingConfig) -> Result<()> {
    let filter = build_filter(debug_flags, config)?;
    let to_stderr = config.output == LogOutput::Stderr;

    let layer = match (config.format, to_stderr) {
        (LogFormat::Text, false) => tracing_subscriber::fmt::layer().with_target(false).boxed(),
        (LogFormat::Text, true) => tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed(),
        (LogFormat::Json, false) => tracing_subscriber::fmt::layer().json().boxed(),
        (LogFormat::Json, true) => tracing_subscriber::fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .boxed(),
    };

    Registry::default()
        .with(layer.with_filter(filter))
        .try_init()
        .context("Failed to install console logging")
}

/// Keeps file writers alive; logs are flushed when dropped
#[cfg(feature = "file-logging")]
pub struct LoggingGuard {
    _file_guards: Vec<tracing_appender::non_blocking::WorkerGuard>,
    log_dir: PathBuf,
}

#[cfg(feature = "file-logging")]
impl LoggingGuard {
    /// The run folder of this process
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }
}

/// Install console logging plus per-crate and combined JSON log files
///
/// `config.file_path` is the base directory (default `./logs`). Old run
/// folders are removed according to `retention` before the new one is used.
#[cfg(feature = "file-logging")]
pub fn init_logging(
    debug_flags: &CrateDebugFlags,
    config: &LoggingConfig,
    retention: &RetentionConfig,
) -> Result<LoggingGuard> {
    use tracing_appender::rolling;

    let base_log_dir = config
        .file_path
        .clone()
        .unwrap_or_else(|| PathBuf::from("./logs"));
    let run_folder = base_log_dir.join(format!(
        "{}{}",
        RUN_PREFIX,
        Utc::now().format(RUN_TIMESTAMP_FORMAT)
    ));
    std::fs::create_dir_all(&run_folder)
        .with_context(|| format!("Failed to create log directory: {}", run_folder.display()))?;
    cleanup_old_logs(&base_log_dir, retention)?;

    let mut layers = Vec::new();
    let mut file_guards = Vec::new();

    layers.push(
        tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_filter(build_filter(debug_flags, config)?)
            .boxed(),
    );

    for crate_name in crate::KNOWN_CRATES {
        let (writer, guard) =
            tracing_appender::non_blocking(rolling::never(&run_folder, format!("{}.log", crate_name)));
        file_guards.push(guard);
        layers.push(
            tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_file(true)
                .with_line_number(true)
                .json()
                .with_filter(EnvFilter::try_new(format!(
                    "off,{}=debug",
                    crate_name.replace('-', "_")
                ))?)
                .boxed(),
        );
    }

    let (writer, guard) = tracing_appender::non_blocking(rolling::never(&run_folder, "flatmap.log"));
    file_guards.push(guard);
    layers.push(
        tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_file(true)
            .with_line_number(true)
            .json()
            .with_filter(build_filter(debug_flags, config)?)
            .boxed(),
    );

    Registry::default()
        .with(layers)
        .try_init()
        .context("Failed to install file logging")?;

    Ok(LoggingGuard {
        _file_guards: file_guards,
        log_dir: run_folder,
    })
}

/// Remove run folders older than `retention.days`, then the oldest ones
/// beyond `retention.runs`
///
/// Folders whose name is not a run timestamp are left alone. Returns the
/// number of folders removed.
pub fn cleanup_old_logs(base_log_dir: &Path, retention: &RetentionConfig) -> Result<usize> {
    if !base_log_dir.exists() {
        return Ok(0);
    }

    let mut runs: Vec<(PathBuf, chrono::DateTime<Utc>)> = Vec::new();
    let entries = std::fs::read_dir(base_log_dir)
        .with_context(|| format!("Failed to list log directory: {}", base_log_dir.display()))?;
    for entry in entries {
        let path = entry?.path();
        if !path.is_dir() {
            continue;
        }
        let Some(stamp) = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|n| n.strip_prefix(RUN_PREFIX))
        else {
            continue;
        };
        if let Ok(naive) = NaiveDateTime::parse_from_str(stamp, RUN_TIMESTAMP_FORMAT) {
            runs.push((path, Utc.from_utc_datetime(&naive)));
        }
    }
    // Newest first
    runs.sort_by(|a, b| b.1.cmp(&a.1));

    let cutoff = Utc::now() - chrono::Duration::days(retention.days as i64);
    let mut removed = 0;
    for (index, (path, started)) in runs.iter().enumerate() {
        if *started >= cutoff && index < retention.runs {
            continue;
        }
        match std::fs::remove_dir_all(path) {
            Ok(()) => removed += 1,
            Err(e) => tracing::warn!("Failed to remove old log directory {}: {}", path.display(), e),
        }
    }
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn run_dir(base: &Path, started: chrono::DateTime<Utc>) -> PathBuf {
        let dir = base.join(format!("{}{}", RUN_PREFIX, started.format(RUN_TIMESTAMP_FORMAT)));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_cleanup_keeps_recent_runs() {
        let base = tempdir().unwrap();
        let now = Utc::now();
        let newest = run_dir(base.path(), now);
        let middle = run_dir(base.path(), now - chrono::Duration::hours(1));
        let oldest = run_dir(base.path(), now - chrono::Duration::hours(2));
        let expired = run_dir(base.path(), now - chrono::Duration::days(40));
        let unrelated = base.path().join("keep-me");
        std::fs::create_dir_all(&unrelated).unwrap();

        let retention = RetentionConfig { days: 30, runs: 2 };
        let removed = cleanup_old_logs(base.path(), &retention).unwrap();

        assert_eq!(removed, 2);
        assert!(newest.exists());
        assert!(middle.exists());
        assert!(!oldest.exists());
        assert!(!expired.exists());
        assert!(unrelated.exists());
    }

    #[test]
    fn test_cleanup_missing_directory() {
        let base = tempdir().unwrap();
        let missing = base.path().join("absent");
        assert_eq!(cleanup_old_logs(&missing, &RetentionConfig::default()).unwrap(), 0);
    }

    #[test]
    fn test_build_filter() {
        let flags = CrateDebugFlags::from_args(vec!["--debug-flatmap-pathways".to_string()]);
        assert!(build_filter(&flags, &LoggingConfig::with_level("warn")).is_ok());
        assert!(build_filter(&flags, &LoggingConfig::with_level("info=loud")).is_err());
    }
}
