//! # Telemetry Module
//!
//! Logs received readings to JSONL files with rotation.
//!
//! This module handles:
//! - Formatting readings as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

use chrono::Utc;
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::config::TelemetryConfig;
use crate::error::{AngleLinkError, Result};
use crate::protocol::frame::Reading;

/// Prefix of every telemetry file name
const FILE_PREFIX: &str = "readings_";

/// Extension of every telemetry file name
const FILE_EXTENSION: &str = "jsonl";

/// One line of the telemetry log
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadingRecord {
    /// RFC 3339 UTC timestamp
    pub timestamp: String,
    pub angle1: u16,
    pub angle2: u16,
    pub angle1_deg: f32,
    pub angle2_deg: f32,
}

impl ReadingRecord {
    /// Stamp a reading with the current time
    pub fn now(reading: &Reading) -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339(),
            angle1: reading.angle1,
            angle2: reading.angle2,
            angle1_deg: reading.angle1_degrees(),
            angle2_deg: reading.angle2_degrees(),
        }
    }
}

/// Rotating JSONL writer for received readings
#[derive(Debug)]
pub struct TelemetryLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,
    writer: Option<BufWriter<File>>,
    current_path: Option<PathBuf>,
    records_in_file: usize,
    files_created: u64,
}

impl TelemetryLogger {
    /// Create a logger writing under `config.log_dir`
    ///
    /// # Errors
    ///
    /// Returns error if the log directory cannot be created
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        fs::create_dir_all(&config.log_dir)?;
        info!("Telemetry logging to {}", config.log_dir);

        Ok(Self {
            log_dir: PathBuf::from(&config.log_dir),
            max_records_per_file: config.max_records_per_file.max(1),
            max_files_to_keep: config.max_files_to_keep.max(1),
            writer: None,
            current_path: None,
            records_in_file: 0,
            files_created: 0,
        })
    }

    /// Append one reading, rotating first if the current file is full
    pub fn log(&mut self, reading: &Reading) -> Result<()> {
        self.log_record(&ReadingRecord::now(reading))
    }

    /// Append a prepared record
    pub fn log_record(&mut self, record: &ReadingRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)
            .map_err(|e| AngleLinkError::Telemetry(format!("Failed to serialize record: {}", e)))?;

        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            writer.flush()?;
        }
        self.records_in_file += 1;
        Ok(())
    }

    /// Path of the file currently being written
    pub fn current_path(&self) -> Option<&Path> {
        self.current_path.as_deref()
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let (path, file) = self.create_next_file()?;
        debug!("Opened telemetry file {}", path.display());

        self.writer = Some(BufWriter::new(file));
        self.current_path = Some(path);
        self.records_in_file = 0;

        self.prune()
    }

    /// Create a fresh file, skipping sequence numbers already taken on disk
    fn create_next_file(&mut self) -> Result<(PathBuf, File)> {
        let stamp = Utc::now().format("%Y%m%d_%H%M%S").to_string();
        loop {
            let name = format!(
                "{}{}_{:04}.{}",
                FILE_PREFIX, stamp, self.files_created, FILE_EXTENSION
            );
            let path = self.log_dir.join(name);
            self.files_created += 1;

            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    /// Delete the oldest telemetry files beyond the retention limit
    fn prune(&self) -> Result<()> {
        let mut files = list_telemetry_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names embed timestamp and sequence, so lexical order is age order
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            match fs::remove_file(&path) {
                Ok(()) => debug!("Removed old telemetry file {}", path.display()),
                Err(e) => warn!("Failed to remove {}: {}", path.display(), e),
            }
        }
        Ok(())
    }
}

/// Telemetry files in `dir`, unsorted
pub(crate) fn list_telemetry_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_telemetry = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.starts_with(FILE_PREFIX) && name.ends_with(FILE_EXTENSION))
            .unwrap_or(false);
        if is_telemetry {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn config(dir: &TempDir, max_records: usize, max_files: usize) -> TelemetryConfig {
        TelemetryConfig {
            enabled: true,
            log_dir: dir.path().to_string_lossy().to_string(),
            max_records_per_file: max_records,
            max_files_to_keep: max_files,
        }
    }

    #[test]
    fn test_record_fields() {
        let record = ReadingRecord::now(&Reading::new(1024, 2048));
        assert_eq!(record.angle1, 1024);
        assert_eq!(record.angle2, 2048);
        assert!((record.angle1_deg - 90.0).abs() < 0.001);
        assert!((record.angle2_deg - 180.0).abs() < 0.001);
        assert!(chrono::DateTime::parse_from_rfc3339(&record.timestamp).is_ok());
    }

    #[test]
    fn test_writes_jsonl_lines() {
        let dir = TempDir::new().unwrap();
        let mut logger = TelemetryLogger::new(&config(&dir, 100, 5)).unwrap();

        logger.log(&Reading::new(1, 2)).unwrap();
        logger.log(&Reading::new(3, 4)).unwrap();

        let contents = fs::read_to_string(logger.current_path().unwrap()).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let value: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(value["angle1"], 3);
        assert_eq!(value["angle2"], 4);
        assert!(value["timestamp"].is_string());
    }

    #[test]
    fn test_rotates_after_max_records() {
        let dir = TempDir::new().unwrap();
        let mut logger = TelemetryLogger::new(&config(&dir, 2, 10)).unwrap();

        for i in 0..5 {
            logger.log(&Reading::new(i, i)).unwrap();
        }

        let mut files = list_telemetry_files(dir.path()).unwrap();
        files.sort();
        assert_eq!(files.len(), 3);

        let line_counts: Vec<usize> = files
            .iter()
            .map(|path| fs::read_to_string(path).unwrap().lines().count())
            .collect();
        assert_eq!(line_counts, vec![2, 2, 1]);
    }

    #[test]
    fn test_keeps_only_newest_files() {
        let dir = TempDir::new().unwrap();
        let mut logger = TelemetryLogger::new(&config(&dir, 1, 2)).unwrap();

        for i in 0..5 {
            logger.log(&Reading::new(i, 0)).unwrap();
        }

        let mut files = list_telemetry_files(dir.path()).unwrap();
        files.sort();
        assert_eq!(files.len(), 2);

        // The survivors hold the last two readings
        let last = fs::read_to_string(&files[1]).unwrap();
        let value: serde_json::Value = serde_json::from_str(last.trim()).unwrap();
        assert_eq!(value["angle1"], 4);
        assert_eq!(files[1].as_path(), logger.current_path().unwrap());
    }

    #[test]
    fn test_restarted_logger_keeps_earlier_files() {
        let dir = TempDir::new().unwrap();

        {
            let mut first = TelemetryLogger::new(&config(&dir, 100, 10)).unwrap();
            first.log(&Reading::new(1, 1)).unwrap();
            first.log(&Reading::new(2, 2)).unwrap();
        }

        let mut second = TelemetryLogger::new(&config(&dir, 100, 10)).unwrap();
        second.log(&Reading::new(3, 3)).unwrap();

        let files = list_telemetry_files(dir.path()).unwrap();
        assert_eq!(files.len(), 2);

        let total_lines: usize = files
            .iter()
            .map(|path| fs::read_to_string(path).unwrap().lines().count())
            .sum();
        assert_eq!(total_lines, 3);
    }

    #[test]
    fn test_file_names_use_utc_stamp() {
        let dir = TempDir::new().unwrap();
        let mut logger = TelemetryLogger::new(&config(&dir, 10, 1)).unwrap();
        let before = Utc::now().format("%Y%m%d").to_string();
        logger.log(&Reading::new(0, 0)).unwrap();
        let after = Utc::now().format("%Y%m%d").to_string();

        let name = logger
            .current_path()
            .unwrap()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .to_string();
        assert!(name.starts_with(FILE_PREFIX));
        assert!(name.ends_with(".jsonl"));
        let date = &name[FILE_PREFIX.len()..FILE_PREFIX.len() + 8];
        assert!(date == before || date == after, "unexpected stamp in {}", name);
    }

    #[test]
    fn test_ignores_unrelated_files() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("notes.txt"), "keep me").unwrap();
        let mut logger = TelemetryLogger::new(&config(&dir, 1, 1)).unwrap();

        logger.log(&Reading::new(1, 1)).unwrap();
        logger.log(&Reading::new(2, 2)).unwrap();

        assert!(dir.path().join("notes.txt").exists());
        assert_eq!(list_telemetry_files(dir.path()).unwrap().len(), 1);
    }

    #[test]
    fn test_creates_missing_log_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("a").join("b");
        let config = TelemetryConfig {
            enabled: true,
            log_dir: nested.to_string_lossy().to_string(),
            max_records_per_file: 10,
            max_files_to_keep: 1,
        };

        TelemetryLogger::new(&config).unwrap();
        assert!(nested.is_dir());
    }
}
