use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};

pub const LOG_ENV: &str = "AURAFLOW_SEED_LOG";
pub const LOG_FILE_NAME: &str = "seed.log";

static LOG_FILE: OnceLock<Mutex<File>> = OnceLock::new();
static LEVEL: OnceLock<LogLevel> = OnceLock::new();

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Unknown or empty values fall back to `Info`.
    pub fn parse(value: &str) -> LogLevel {
        match value.trim().to_lowercase().as_str() {
            "error" => LogLevel::Error,
            "warn" | "warning" => LogLevel::Warn,
            "info" => LogLevel::Info,
            "debug" => LogLevel::Debug,
            "trace" => LogLevel::Trace,
            _ => LogLevel::Info,
        }
    }

    fn from_env() -> LogLevel {
        LogLevel::parse(&std::env::var(LOG_ENV).unwrap_or_default())
    }

    fn label(self) -> &'static str {
        match self {
            LogLevel::Trace => "TRACE",
            LogLevel::Debug => "DEBUG",
            LogLevel::Info => "INFO",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Open (or create) the append-only log file. Only the first call in a
/// process takes effect.
pub fn init(log_path: impl AsRef<Path>) -> std::io::Result<PathBuf> {
    let path = log_path.as_ref();
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(path)?;
    let _ = LOG_FILE.set(Mutex::new(file));
    let _ = LEVEL.set(LogLevel::from_env());
    info(&format!("logging initialized: {}", path.display()));
    Ok(path.to_path_buf())
}

fn enabled(level: LogLevel) -> bool {
    level >= *LEVEL.get_or_init(LogLevel::from_env)
}

fn write_line(level: LogLevel, msg: &str) {
    if let Some(m) = LOG_FILE.get() {
        if let Ok(mut f) = m.lock() {
            let ts = chrono::Local::now().format("%Y-%m-%dT%H:%M:%S%.3f");
            let _ = writeln!(f, "{} [{}] {}", ts, level.label(), msg);
            let _ = f.flush();
        }
    }
}

fn log(level: LogLevel, msg: &str) {
    if enabled(level) {
        write_line(level, msg);
    }
}

pub fn error(msg: &str) {
    log(LogLevel::Error, msg);
}
pub fn warn(msg: &str) {
    log(LogLevel::Warn, msg);
}
pub fn info(msg: &str) {
    log(LogLevel::Info, msg);
}
pub fn debug(msg: &str) {
    log(LogLevel::Debug, msg);
}
pub fn trace(msg: &str) {
    log(LogLevel::Trace, msg);
}
