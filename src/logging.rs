use log::{LevelFilter, Metadata, Record};
use once_cell::sync::OnceCell;
use std::fs::{OpenOptions, create_dir_all};
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

pub const LOG_FILE: &str = "log.txt";

#[derive(Debug)]
pub struct SimpleLogger {
    log_path: PathBuf,
    level: LevelFilter,
}

static LOGGER: OnceCell<SimpleLogger> = OnceCell::new();

impl SimpleLogger {
    pub fn new(log_dir: &Path, level: LevelFilter) -> Self {
        Self {
            log_path: log_dir.join(LOG_FILE),
            level,
        }
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }
}

impl log::Log for SimpleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let timestamp = chrono::Local::now().format("%Y-%m-%d %H:%M:%S");
            let log_entry = format!("[{timestamp}] {} - {}\n", record.level(), record.args());

            if let Ok(mut file) = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&self.log_path)
            {
                let _ = file.write_all(log_entry.as_bytes());
            }
        }
    }

    fn flush(&self) {}
}

pub fn default_log_dir() -> Result<PathBuf> {
    Ok(dir::home_dir().ok_or(AppError::NoHomeDir)?.join("techpal"))
}

// The terminal belongs to the UI, so everything logged goes to a file instead.
pub fn init(log_dir: &Path, level: LevelFilter) -> Result<&'static Path> {
    create_dir_all(log_dir)?;

    let logger = LOGGER.get_or_init(|| SimpleLogger::new(log_dir, level));
    log::set_logger(logger)?;
    log::set_max_level(level);

    Ok(logger.log_path())
}
