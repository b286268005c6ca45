use anyhow::{Context, Result};
use log::{Level, LevelFilter, Log, Metadata, Record};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;
use tracing_appender::rolling::{RollingFileAppender, Rotation};

/// Prefix on every status line written to stdout
pub const TAG: &str = "[wayclip]";

/// Logger that writes tagged status lines to stdout and, optionally,
/// timestamped lines to a daily-rotated file
struct WayclipLogger {
    level: LevelFilter,
    file_writer: Option<Mutex<RollingFileAppender>>,
}

impl Log for WayclipLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let line = format_line(record.level(), &record.args().to_string());

        {
            let mut stdout = io::stdout().lock();
            let _ = writeln!(stdout, "{}", line);
            let _ = stdout.flush();
        }

        if let Some(writer) = &self.file_writer
            && let Ok(mut writer) = writer.lock()
        {
            let _ = writeln!(
                writer,
                "{} {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                line
            );
        }
    }

    fn flush(&self) {
        let _ = io::stdout().flush();
    }
}

/// `[wayclip] message`, with the level spelled out for warnings and errors
fn format_line(level: Level, message: &str) -> String {
    match level {
        Level::Error | Level::Warn => format!("{} {}: {}", TAG, level, message),
        _ => format!("{} {}", TAG, message),
    }
}

/// Parse log level string to LevelFilter
pub fn parse_level(level_str: &str) -> LevelFilter {
    match level_str.trim().to_lowercase().as_str() {
        "off" => LevelFilter::Off,
        "error" => LevelFilter::Error,
        "warn" => LevelFilter::Warn,
        "info" => LevelFilter::Info,
        "debug" => LevelFilter::Debug,
        "trace" => LevelFilter::Trace,
        _ => LevelFilter::Info, // Default to info
    }
}

fn file_appender(log_file_path: &Path) -> Result<RollingFileAppender> {
    let dir = log_file_path
        .parent()
        .ok_or_else(|| anyhow::anyhow!("Invalid log file path {:?}", log_file_path))?;
    fs::create_dir_all(dir).context("Failed to create log directory")?;

    // Daily rotation, keep 3 files
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(3)
        .filename_prefix(
            log_file_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("wayclip"),
        )
        .filename_suffix(
            log_file_path
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("log"),
        )
        .build(dir)
        .context("Failed to create rotating file appender")
}

/// Initialize the global logger
pub fn init_logger(level: &str, log_file_path: Option<&Path>) -> Result<()> {
    let file_writer = log_file_path
        .map(file_appender)
        .transpose()?
        .map(Mutex::new);

    let level = parse_level(level);
    let logger = WayclipLogger { level, file_writer };

    log::set_boxed_logger(Box::new(logger)).context("Failed to set global logger")?;
    log::set_max_level(level);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("DEBUG"), LevelFilter::Debug);
        assert_eq!(parse_level(" warn "), LevelFilter::Warn);
        assert_eq!(parse_level("off"), LevelFilter::Off);
        assert_eq!(parse_level("loud"), LevelFilter::Info);
    }

    #[test]
    fn test_format_line() {
        assert_eq!(
            format_line(Level::Info, "Saved: /x/clipboard-20240101-000000.png"),
            "[wayclip] Saved: /x/clipboard-20240101-000000.png"
        );
        assert_eq!(
            format_line(Level::Warn, "focus query failed"),
            "[wayclip] WARN: focus query failed"
        );
    }

    #[test]
    fn test_file_appender_creates_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("logs/wayclip.log");
        let mut appender = file_appender(&path).unwrap();
        writeln!(appender, "hello").unwrap();
        assert!(dir.path().join("logs").is_dir());
    }
}
