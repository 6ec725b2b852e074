//! Logging backend for termscheme.
//!
//! Receives records from the `log` facade, keeps the most recent ones in
//! memory for display, and appends them to an optional log file.

use chrono::Local;
use std::collections::VecDeque;
use std::fs::{self, OpenOptions};
use std::io::Write as IoWrite;
use std::path::PathBuf;
use std::sync::{Mutex, OnceLock};

/// Log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    /// Timestamp in HH:MM:SS format
    pub timestamp: String,
    /// Message level
    pub level: LogLevel,
    /// Module that emitted the record
    pub target: String,
    /// Message text
    pub message: String,
}

/// Log level
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Convert log level to string
    pub fn to_str(self) -> &'static str {
        match self {
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }

    /// Equivalent `log` crate filter.
    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Error => log::LevelFilter::Error,
        }
    }
}

impl From<log::Level> for LogLevel {
    fn from(level: log::Level) -> Self {
        match level {
            // Trace is folded into debug
            log::Level::Trace | log::Level::Debug => LogLevel::Debug,
            log::Level::Info => LogLevel::Info,
            log::Level::Warn => LogLevel::Warn,
            log::Level::Error => LogLevel::Error,
        }
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!("Unknown log level: {}", s)),
        }
    }
}

/// Logger state
#[derive(Debug)]
struct Logger {
    /// Recent entries (last N messages)
    entries: VecDeque<LogEntry>,
    /// Maximum number of entries in memory
    max_entries: usize,
    /// Minimum log level to record
    min_level: LogLevel,
    /// Log file path
    file_path: Option<PathBuf>,
}

impl Logger {
    /// Create new logger instance
    fn new(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) -> Self {
        if let Some(path) = &file_path {
            // Create parent directory if it doesn't exist
            if let Some(parent) = path.parent() {
                let _ = fs::create_dir_all(parent);
            }

            // Clear log file on startup
            if let Ok(mut file) = OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(true)
                .open(path)
            {
                let _ = writeln!(file, "=== termscheme log start ===");
            }
        }

        Self {
            entries: VecDeque::new(),
            max_entries,
            min_level,
            file_path,
        }
    }

    /// Add entry to log
    fn add_entry(&mut self, level: LogLevel, target: &str, message: String) {
        if level < self.min_level {
            return;
        }

        let timestamp = Local::now().format("%H:%M:%S").to_string();

        // Write to file (create if deleted)
        if let Some(path) = &self.file_path {
            if let Ok(mut file) = OpenOptions::new().append(true).create(true).open(path) {
                let _ = writeln!(file, "[{}] {}: {}", timestamp, level.to_str(), message);
            }
        }

        self.entries.push_back(LogEntry {
            timestamp,
            level,
            target: target.to_string(),
            message,
        });

        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
        }
    }

    fn get_entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    fn set_min_level(&mut self, level: LogLevel) {
        self.min_level = level;
    }
}

/// Global logger instance that persists for the application lifetime.
static LOGGER: OnceLock<Mutex<Logger>> = OnceLock::new();

/// Bridge from the `log` facade to the global logger.
struct Facade;

impl log::Log for Facade {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        LOGGER
            .get()
            .and_then(|logger| logger.lock().ok())
            .is_some_and(|logger| LogLevel::from(metadata.level()) >= logger.min_level)
    }

    fn log(&self, record: &log::Record) {
        if let Some(Ok(mut logger)) = LOGGER.get().map(|logger| logger.lock()) {
            logger.add_entry(
                record.level().into(),
                record.target(),
                record.args().to_string(),
            );
        }
    }

    fn flush(&self) {}
}

static FACADE: Facade = Facade;

/// Initialize the global logger and install it as the `log` backend.
///
/// Must be called once at application startup. Subsequent calls are
/// ignored and return `false`.
///
/// # Arguments
///
/// * `file_path` - Path to the log file, or `None` to keep logs in memory only
/// * `max_entries` - Maximum number of log entries to keep in memory
/// * `min_level` - Minimum log level to record (Debug, Info, Warn, Error)
pub fn init(file_path: Option<PathBuf>, max_entries: usize, min_level: LogLevel) -> bool {
    let mut installed = false;
    LOGGER.get_or_init(|| {
        installed = true;
        Mutex::new(Logger::new(file_path, max_entries, min_level))
    });
    if !installed {
        return false;
    }

    if log::set_logger(&FACADE).is_err() {
        // Another backend already owns the facade
        return false;
    }
    log::set_max_level(min_level.to_filter());
    true
}

/// Set minimum log level dynamically
///
/// Logs below this level will be ignored.
pub fn set_min_level(level: LogLevel) {
    if let Some(Ok(mut logger)) = LOGGER.get().map(|logger| logger.lock()) {
        logger.set_min_level(level);
        log::set_max_level(level.to_filter());
    }
}

/// Get all log entries
///
/// Returns the entries currently stored in memory, oldest first. Empty if
/// the logger was never initialized.
pub fn get_entries() -> Vec<LogEntry> {
    match LOGGER.get().map(|logger| logger.lock()) {
        Some(Ok(logger)) => logger.get_entries(),
        _ => Vec::new(),
    }
}
