//! Logger utility for application-wide logging
//!
//! A `log::Log` implementation writing every record to a log file and
//! echoing it to the console.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use log::{LevelFilter, Log, Metadata, Record};

/// File-backed logger
pub struct Logger {
    /// File handle for log output
    file: Mutex<File>,
    level: LevelFilter,
}

impl Logger {
    /// Creates a logger writing to `log_file` at Info level
    ///
    /// # Arguments
    ///
    /// * `log_file` - Path to the log file
    ///
    /// # Returns
    ///
    /// A new Logger instance or an error if the file cannot be created
    pub fn new(log_file: &Path) -> io::Result<Self> {
        let file = File::create(log_file)?;
        Ok(Logger {
            file: Mutex::new(file),
            level: LevelFilter::Info,
        })
    }

    pub fn with_level(mut self, level: LevelFilter) -> Self {
        self.level = level;
        self
    }

    /// Appends a line to the log file
    pub fn write_line(&self, message: &str) -> io::Result<()> {
        let mut guard = self.file
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log file lock poisoned"))?;
        writeln!(guard, "{}", message)?;
        guard.flush()
    }

    /// Installs the logger as the global `log` backend
    pub fn init_global_logger(self) -> io::Result<()> {
        let level = self.level;
        if log::set_boxed_logger(Box::new(self)).is_err() {
            eprintln!("Warning: Global logger was already initialized");
        }
        log::set_max_level(level);
        Ok(())
    }
}

impl Log for Logger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let message = format!("[{}] {}", record.level(), record.args());
            let stamped = format!("{} {}", Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ"), message);
            let _ = self.write_line(&stamped);

            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        if let Ok(mut guard) = self.file.lock() {
            let _ = guard.flush();
        }
    }
}
