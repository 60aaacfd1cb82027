//! Logger module
//!
//! Lifecycle, error, and access logging. Output goes to stdout/stderr until
//! [`init`] is called; after that, access and error streams go to the
//! configured targets (stdout/stderr or append-mode files).

mod format;

pub use format::AccessLogEntry;

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::net::SocketAddr;
use std::path::Path;
use std::sync::{Mutex, OnceLock};

use crate::config::{AppState, Config};

static LOG_WRITER: OnceLock<LogWriter> = OnceLock::new();

/// One output stream for a log category
enum LogTarget {
    Stdout,
    Stderr,
    File(Mutex<File>),
}

impl LogTarget {
    fn write(&self, message: &str) {
        match self {
            Self::Stdout => println!("{message}"),
            Self::Stderr => eprintln!("{message}"),
            Self::File(file) => {
                if let Ok(mut f) = file.lock() {
                    let _ = writeln!(f, "{message}");
                }
            }
        }
    }
}

struct LogWriter {
    access: LogTarget,
    error: LogTarget,
}

/// Initialize the global log writer from configuration.
///
/// Call once at startup. Returns an error if a log file cannot be opened or
/// the writer is already initialized.
pub fn init(config: &Config) -> io::Result<()> {
    let access = match config.logging.access_log_file.as_deref() {
        Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
        None => LogTarget::Stdout,
    };
    let error = match config.logging.error_log_file.as_deref() {
        Some(path) => LogTarget::File(Mutex::new(open_log_file(path)?)),
        None => LogTarget::Stderr,
    };

    LOG_WRITER.set(LogWriter { access, error }).map_err(|_| {
        io::Error::new(io::ErrorKind::AlreadyExists, "Log writer already initialized")
    })
}

/// Open or create a log file for appending
fn open_log_file(path: &str) -> io::Result<File> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    OpenOptions::new().create(true).append(true).open(path)
}

fn write_info(message: &str) {
    match LOG_WRITER.get() {
        Some(writer) => writer.access.write(message),
        None => println!("{message}"),
    }
}

fn write_error(message: &str) {
    match LOG_WRITER.get() {
        Some(writer) => writer.error.write(message),
        None => eprintln!("{message}"),
    }
}

pub fn log_server_start(addr: &SocketAddr, state: &AppState) {
    write_info("======================================");
    write_info("devserve started");
    write_info(&format!("Serving directory: {}", state.root.display()));
    write_info(&format!("Listening on: http://{addr}"));
    write_info(&format!("Log level: {}", state.config.logging.level));
    if let Some(workers) = state.config.server.workers {
        write_info(&format!("Worker threads: {workers}"));
    }
    write_info("Press Ctrl+C to stop");
    write_info("======================================\n");
}

pub fn log_shutdown() {
    write_info("\nServer stopped.");
}

pub fn log_connection_accepted(peer_addr: &SocketAddr) {
    write_info(&format!("[Connection] Accepted from: {peer_addr}"));
}

pub fn log_connection_error(err: &impl std::fmt::Debug) {
    write_error(&format!("[ERROR] Failed to serve connection: {err:?}"));
}

pub fn log_error(message: &str) {
    write_error(&format!("[ERROR] {message}"));
}

pub fn log_warning(message: &str) {
    write_error(&format!("[WARN] {message}"));
}

/// Log a formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
