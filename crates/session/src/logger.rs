//! File-based logger for tracking sessions.
//!
//! Each run writes to `~/.handspace/logs/{timestamp}_{uuid}/log` and mirrors every
//! record to stderr.

use anyhow::{Context, Result};
use chrono::Local;
use dirs::home_dir;
use log::{LevelFilter, Log, Metadata, Record};
use std::fs::{create_dir_all, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, OnceLock};
use uuid::Uuid;

static CURRENT_LOG_PATH: OnceLock<PathBuf> = OnceLock::new();

pub struct SessionLogger {
    level: LevelFilter,
    file: Mutex<File>,
    run_id: String,
    log_path: PathBuf,
    mirror_to_stderr: bool,
}

impl SessionLogger {
    /// Creates a logger writing to a fresh run directory under `~/.handspace/logs`.
    pub fn new(level: LevelFilter) -> Result<Self> {
        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let uuid_string = Uuid::new_v4().to_string();
        let uuid = uuid_string.split('-').next().unwrap_or("unknown");
        let run_id = format!("{timestamp}_{uuid}");

        let log_dir = Self::get_log_dir(&run_id)?;
        Self::with_path(level, run_id, &log_dir.join("log"))
    }

    /// Creates a logger writing to `log_path`, creating parent directories as needed.
    pub fn with_path(level: LevelFilter, run_id: String, log_path: &Path) -> Result<Self> {
        if let Some(dir) = log_path.parent() {
            create_dir_all(dir).with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)
            .with_context(|| format!("Failed to open log file: {}", log_path.display()))?;

        Ok(Self {
            level,
            file: Mutex::new(file),
            run_id,
            log_path: log_path.to_path_buf(),
            mirror_to_stderr: true,
        })
    }

    pub fn without_stderr(mut self) -> Self {
        self.mirror_to_stderr = false;
        self
    }

    /// Returns the path to the log directory for this run
    pub fn get_log_dir(run_id: &str) -> Result<PathBuf> {
        let home = home_dir().ok_or_else(|| anyhow::anyhow!("Could not find home directory"))?;
        Ok(home.join(".handspace").join("logs").join(run_id))
    }

    /// Installs a new logger as the global `log` backend.
    pub fn init(level: LevelFilter) -> Result<()> {
        let logger = Self::new(level)?;
        let run_id = logger.run_id.clone();
        let log_path = logger.log_path.clone();

        log::set_boxed_logger(Box::new(logger))
            .map(|()| log::set_max_level(level))
            .map_err(|e| anyhow::anyhow!("Failed to set logger: {}", e))?;
        let _ = CURRENT_LOG_PATH.set(log_path.clone());

        log::info!("Handspace logger initialized. Run ID: {}", run_id);
        log::info!("Log file: {}", log_path.display());
        Ok(())
    }

    pub fn current_log_path() -> Option<&'static Path> {
        CURRENT_LOG_PATH.get().map(PathBuf::as_path)
    }

    fn format(record: &Record) -> String {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S%.3f");
        format!("{} {} [{}] {}", timestamp, record.level(), record.target(), record.args())
    }
}

impl Log for SessionLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let message = Self::format(record);
        if let Ok(mut file) = self.file.lock() {
            // A failed log write must never take the session down.
            let _ = writeln!(file, "{}", message);
            let _ = file.flush();
        }

        if self.mirror_to_stderr {
            eprintln!("{}", message);
        }
    }

    fn flush(&self) {
        if let Ok(mut file) = self.file.lock() {
            let _ = file.flush();
        }
    }
}

/// Marks the beginning of a new phase in the log.
pub fn log_section(name: &str) {
    let separator = "=".repeat(50);
    log::info!("{}", separator);
    log::info!("SECTION: {}", name);
    log::info!("{}", separator);
}
