// Logging for uiplugin-resolver
//
// A small `log` backend writing either plain text or JSON lines to stderr,
// to a file, or to both, with separate levels for console and file output.
//
// ```
// let config = LogConfig {
//     console_level: LevelFilter::Info,
//     file_level: Some(LevelFilter::Debug),
//     format: LogFormat::Json,
//     destination: LogDestination::Both(PathBuf::from("resolver.log")),
// };
// init_logger(config)?;
// log::info!("resolving monitoring plugin");
// ```

use log::{Level, LevelFilter};
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Local};
use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use anyhow::{Context, Result};

/// Log output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid log format: {}. Valid options: text, json", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum LogDestination {
    Console,
    File(PathBuf),
    Both(PathBuf),
}

/// One JSON log line
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonLogEntry {
    pub timestamp: String,
    pub level: String,
    pub target: String,
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub console_level: LevelFilter,
    pub file_level: Option<LevelFilter>,
    pub format: LogFormat,
    pub destination: LogDestination,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            console_level: LevelFilter::Info,
            file_level: None,
            format: LogFormat::Text,
            destination: LogDestination::Console,
        }
    }
}

impl LogConfig {
    /// Most verbose level any destination accepts
    pub fn max_level(&self) -> LevelFilter {
        match self.file_level {
            Some(file_level) => file_level.max(self.console_level),
            None => self.console_level,
        }
    }
}

pub struct ResolverLogger {
    config: LogConfig,
}

impl ResolverLogger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    fn format_timestamp() -> String {
        let now: DateTime<Local> = Local::now();
        now.format("%Y-%m-%d %H:%M:%S").to_string()
    }

    fn format_line(&self, level: Level, target: &str, message: &str) -> String {
        match self.config.format {
            LogFormat::Text => Self::format_text(level, target, message),
            LogFormat::Json => {
                let entry = JsonLogEntry {
                    timestamp: Self::format_timestamp(),
                    level: level.to_string().to_uppercase(),
                    target: target.to_string(),
                    message: message.to_string(),
                };
                serde_json::to_string(&entry).unwrap_or_else(|e| {
                    eprintln!("JSON formatting error: {}. Falling back to text format.", e);
                    Self::format_text(level, target, message)
                })
            }
        }
    }

    fn format_text(level: Level, target: &str, message: &str) -> String {
        format!(
            "{} [{}] {}: {}",
            Self::format_timestamp(),
            level.to_string().to_uppercase(),
            target,
            message
        )
    }

    fn console_accepts(&self, level: Level) -> bool {
        matches!(self.config.destination, LogDestination::Console | LogDestination::Both(_))
            && level <= self.config.console_level
    }

    fn file_accepts(&self, level: Level) -> bool {
        matches!(self.config.destination, LogDestination::File(_) | LogDestination::Both(_))
            && self.config.file_level.is_some_and(|file_level| level <= file_level)
    }

    fn file_path(&self) -> Option<&Path> {
        match &self.config.destination {
            LogDestination::File(path) | LogDestination::Both(path) => Some(path),
            LogDestination::Console => None,
        }
    }

    fn write_to_file(line: &str, path: &Path) -> Result<()> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file: {}", path.display()))?;
        writeln!(file, "{}", line).context("Failed to write to log file")
    }
}

impl log::Log for ResolverLogger {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        self.console_accepts(metadata.level()) || self.file_accepts(metadata.level())
    }

    fn log(&self, record: &log::Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let level = record.level();
        let line = self.format_line(level, record.target(), &record.args().to_string());

        if self.file_accepts(level) {
            if let Some(path) = self.file_path() {
                if let Err(e) = Self::write_to_file(&line, path) {
                    eprintln!("File logging error: {}", e);
                    // a file-only destination would otherwise lose the line
                    if !self.console_accepts(level) {
                        let _ = writeln!(io::stderr(), "{}", line);
                    }
                }
            }
        }
        if self.console_accepts(level) {
            let _ = writeln!(io::stderr(), "{}", line);
        }
    }

    fn flush(&self) {
        let _ = io::stderr().flush();
    }
}

pub fn init_logger(config: LogConfig) -> Result<()> {
    let max_level = config.max_level();
    log::set_boxed_logger(Box::new(ResolverLogger::new(config)))
        .context("Failed to set global logger")?;
    log::set_max_level(max_level);
    Ok(())
}

pub fn parse_log_level(level_str: &str) -> Result<LevelFilter> {
    match level_str.to_lowercase().as_str() {
        "error" => Ok(LevelFilter::Error),
        "warn" => Ok(LevelFilter::Warn),
        "info" => Ok(LevelFilter::Info),
        "debug" => Ok(LevelFilter::Debug),
        "trace" => Ok(LevelFilter::Trace),
        "off" => Ok(LevelFilter::Off),
        _ => Err(anyhow::anyhow!(
            "Invalid log level: {}. Valid levels: error, warn, info, debug, trace, off",
            level_str
        )),
    }
}
