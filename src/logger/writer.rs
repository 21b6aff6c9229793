//! Log writer module
//!
//! Thread-safe log writing to files or stdout/stderr.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Global log writer instance
static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// Log output target
enum LogTarget {
    Stdout,
    Stderr,
    File(File),
}

/// Thread-safe log writer with separate access and error targets
pub struct LogWriter {
    access: Mutex<LogTarget>,
    error: Mutex<LogTarget>,
}

impl LogWriter {
    /// Create a new log writer with optional file paths
    fn new(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<Self> {
        let access = match access_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stdout,
        };

        let error = match error_log_file {
            Some(path) => LogTarget::File(open_log_file(path)?),
            None => LogTarget::Stderr,
        };

        Ok(Self {
            access: Mutex::new(access),
            error: Mutex::new(error),
        })
    }

    /// Write to access log (also used for info messages)
    pub fn write_access(&self, message: &str) {
        write_to_target(&mut lock(&self.access), message);
    }

    /// Write to error log
    pub fn write_error(&self, message: &str) {
        write_to_target(&mut lock(&self.error), message);
    }
}

/// A panic while holding the lock cannot leave a target half-updated
fn lock(target: &Mutex<LogTarget>) -> MutexGuard<'_, LogTarget> {
    target
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    // Create parent directories if they don't exist
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    OpenOptions::new().create(true).append(true).open(path)
}

/// Write message to log target
fn write_to_target(target: &mut LogTarget, message: &str) {
    match target {
        LogTarget::Stdout => {
            println!("{message}");
        }
        LogTarget::Stderr => {
            eprintln!("{message}");
        }
        LogTarget::File(file) => {
            let _ = writeln!(file, "{message}");
        }
    }
}

/// Initialize the global log writer
///
/// This should be called once at application startup.
/// Returns error if log files cannot be opened.
pub fn init(access_log_file: Option<&str>, error_log_file: Option<&str>) -> io::Result<()> {
    let writer = LogWriter::new(access_log_file, error_log_file)?;
    LOG_WRITER.set(writer).map_err(|_| {
        io::Error::new(
            io::ErrorKind::AlreadyExists,
            "Log writer already initialized",
        )
    })
}

/// Get the global log writer, if initialized
pub fn get() -> Option<&'static LogWriter> {
    LOG_WRITER.get()
}
