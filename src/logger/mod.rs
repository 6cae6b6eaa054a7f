//! Logger module
//!
//! Line-oriented logging for the HTTP server:
//! - the startup line
//! - optional access logging (combined, common or json)
//! - errors and warnings, filtered by the configured level

mod format;
pub mod writer;

pub use format::AccessLogEntry;
pub use writer::Level;

use crate::config::LoggingConfig;

/// Initialize the logger with configuration
///
/// Should be called once at application startup.
pub fn init(config: &LoggingConfig) -> std::io::Result<()> {
    writer::init(
        Level::parse(&config.level),
        config.access_log_file.as_deref(),
        config.error_log_file.as_deref(),
    )
}

fn enabled(level: Level) -> bool {
    writer::get().map_or(level <= Level::Info, |w| w.enabled(level))
}

/// Write to info/access log
fn write_info(message: &str) {
    match writer::get() {
        Some(w) => w.write_access(message),
        None => println!("{message}"),
    }
}

/// Write to error log
fn write_error(message: &str) {
    match writer::get() {
        Some(w) => w.write_error(message),
        None => eprintln!("{message}"),
    }
}

/// The one line printed once the listener is bound, whatever the level
pub fn log_server_start(port: u16) {
    write_info(&format!("Server running on port {port}"));
}

/// Idle keep-alive connections closing on the head deadline are routine
pub fn log_connection_error(err: &hyper::Error) {
    if err.is_timeout() {
        log_debug(&format!("Connection closed: {err}"));
    } else {
        log_warning(&format!("Failed to serve connection: {err}"));
    }
}

pub fn log_error(message: &str) {
    if enabled(Level::Error) {
        write_error(&format!("[ERROR] {message}"));
    }
}

pub fn log_warning(message: &str) {
    if enabled(Level::Warn) {
        write_error(&format!("[WARN] {message}"));
    }
}

pub fn log_info(message: &str) {
    if enabled(Level::Info) {
        write_info(message);
    }
}

pub fn log_debug(message: &str) {
    if enabled(Level::Debug) {
        write_info(&format!("[DEBUG] {message}"));
    }
}

/// Log formatted access log entry
pub fn log_access(entry: &AccessLogEntry, format: &str) {
    write_info(&entry.format(format));
}
