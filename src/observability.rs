// In: src/observability.rs

//! Logging setup for the bridge.
//!
//! Every module logs through the `log` facade. This module installs the one
//! process-wide `env_logger` backend, configured from the bridge config: a
//! level filter, an optional log file that is truncated and stamped with a
//! banner on open, and a timestamped line format. If the log file cannot be
//! opened the backend falls back to stderr.

use chrono::NaiveDateTime;
use log::{Level, LevelFilter};
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Once;

use crate::VERSION;

static INIT_LOGGER: Once = Once::new();

const BANNER_RULE: &str = "========================================";
const BRIDGE_NAME: &str = "GSPy: The GoldSim-Python Bridge";

/// The four verbosity levels accepted in the config file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    Warning,
    #[default]
    Info,
    Debug,
}

impl LogLevel {
    /// Maps `0..=3` to a level. Anything else keeps the default.
    pub fn from_int(value: i64) -> Self {
        match value {
            0 => Self::Error,
            1 => Self::Warning,
            2 => Self::Info,
            3 => Self::Debug,
            _ => Self::default(),
        }
    }

    pub fn to_level_filter(self) -> LevelFilter {
        match self {
            Self::Error => LevelFilter::Error,
            Self::Warning => LevelFilter::Warn,
            Self::Info => LevelFilter::Info,
            Self::Debug => LevelFilter::Debug,
        }
    }

    /// The level a single message is emitted at.
    pub fn to_level(self) -> Level {
        match self {
            Self::Error => Level::Error,
            Self::Warning => Level::Warn,
            Self::Info => Level::Info,
            Self::Debug => Level::Debug,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogSettings {
    pub level: LogLevel,
    /// `None` logs to stderr.
    pub file: Option<PathBuf>,
}

/// Installs the logger once per process. Later calls are no-ops, so the first
/// bridge to initialize decides the level and target.
pub fn init_logging(settings: &LogSettings) {
    INIT_LOGGER.call_once(|| {
        let mut builder = env_logger::Builder::new();

        builder.is_test(false);
        builder.filter_level(settings.level.to_level_filter());
        builder.format(|buf, record| {
            let now = chrono::Local::now().naive_local();
            writeln!(buf, "{}", format_line(now, record.level(), &record.args().to_string()))
        });

        match settings.file.as_ref().map(|path| (path, open_log_file(path))) {
            Some((_, Ok(file))) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Some((path, Err(e))) => {
                eprintln!(
                    "WARNING: could not open log file '{}' ({}); logging to stderr instead.",
                    path.display(),
                    e
                );
                eprint!("{}", banner());
                builder.target(env_logger::Target::Stderr);
            }
            None => {
                builder.target(env_logger::Target::Stderr);
            }
        }

        let _ = builder.try_init();
    });
}

/// Opens the log file for writing, discarding any previous contents, and
/// writes the banner.
fn open_log_file(path: &Path) -> std::io::Result<File> {
    let mut file = File::create(path)?;
    file.write_all(banner().as_bytes())?;
    file.flush()?;
    Ok(file)
}

/// The header written at the top of every log.
pub fn banner() -> String {
    format!(
        "{rule}\n{name}\nVersion: {version}\n{rule}\n\n",
        rule = BANNER_RULE,
        name = BRIDGE_NAME,
        version = VERSION
    )
}

/// Formats one log line as `YYYY-MM-DD HH:MM:SS - LEVEL: message`.
pub fn format_line(timestamp: NaiveDateTime, level: Level, message: &str) -> String {
    format!(
        "{} - {}: {}",
        timestamp.format("%Y-%m-%d %H:%M:%S"),
        level_label(level),
        message
    )
}

fn level_label(level: Level) -> &'static str {
    match level {
        Level::Error => "ERROR",
        Level::Warn => "WARNING",
        Level::Info => "INFO",
        Level::Debug => "DEBUG",
        Level::Trace => "TRACE",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    #[test]
    fn test_level_mapping() {
        assert_eq!(LogLevel::from_int(0), LogLevel::Error);
        assert_eq!(LogLevel::from_int(1).to_level_filter(), LevelFilter::Warn);
        assert_eq!(LogLevel::from_int(3).to_level_filter(), LevelFilter::Debug);
        assert_eq!(LogLevel::from_int(7), LogLevel::Info);
        assert_eq!(LogLevel::from_int(-1), LogLevel::Info);
    }

    #[test]
    fn test_message_level_matches_filter() {
        for raw in 0..=3 {
            let level = LogLevel::from_int(raw);
            assert_eq!(level.to_level().to_level_filter(), level.to_level_filter());
        }
        assert_eq!(LogLevel::from_int(9).to_level(), Level::Info);
    }

    #[test]
    fn test_line_format() {
        let ts = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(7, 5, 1)
            .unwrap();
        assert_eq!(
            format_line(ts, Level::Warn, "dimension coerced"),
            "2024-03-09 07:05:01 - WARNING: dimension coerced"
        );
        assert_eq!(
            format_line(ts, Level::Info, "ready"),
            "2024-03-09 07:05:01 - INFO: ready"
        );
    }

    #[test]
    fn test_banner_names_version() {
        let text = banner();
        assert!(text.starts_with(BANNER_RULE));
        assert!(text.contains(&format!("Version: {}", VERSION)));
        assert!(text.ends_with("\n\n"));
    }
}
