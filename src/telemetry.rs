//! # Telemetry Module
//!
//! Handles command logging to JSONL files with rotation.
//!
//! This module handles:
//! - Recording every outbound actuator command
//! - Formatting as JSONL (JSON Lines)
//! - Writing to rotating log files
//! - Managing file rotation (max N records per file)
//! - Retaining only last M files

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::command::ActuatorCommand;
use crate::config::TelemetryConfig;
use crate::error::{Result, TeleopError};

/// One logged command, serialized as a single JSONL line.
#[derive(Debug, Clone, Serialize)]
pub struct CommandRecord {
    /// Wall-clock time the command was sent.
    pub timestamp: DateTime<Utc>,
    /// "velocity" or "pose".
    pub mode: &'static str,
    pub lx: f32,
    pub ly: f32,
    pub rx: f32,
    pub ry: f32,
}

impl CommandRecord {
    /// Builds a record for a command sent now.
    #[must_use]
    pub fn now(mode: &'static str, command: &ActuatorCommand) -> Self {
        Self {
            timestamp: Utc::now(),
            mode,
            lx: command.lx,
            ly: command.ly,
            rx: command.rx,
            ry: command.ry,
        }
    }
}

/// JSONL command logger with file rotation.
///
/// Files are named `commands-<utc>-<seq>.jsonl` so lexicographic order is
/// chronological; once a file reaches the record limit it is closed and the
/// oldest files beyond the retention limit are deleted.
#[derive(Debug)]
pub struct CommandLogger {
    log_dir: PathBuf,
    max_records_per_file: usize,
    max_files_to_keep: usize,

    writer: Option<BufWriter<File>>,
    records_in_file: usize,
    file_seq: u64,
}

impl CommandLogger {
    /// Creates a logger, creating the log directory if needed.
    pub fn new(config: &TelemetryConfig) -> Result<Self> {
        let log_dir = PathBuf::from(&config.log_dir);
        fs::create_dir_all(&log_dir)?;
        Ok(Self {
            log_dir,
            max_records_per_file: config.max_records_per_file,
            max_files_to_keep: config.max_files_to_keep,
            writer: None,
            records_in_file: 0,
            file_seq: 0,
        })
    }

    /// Appends one record, rotating the file if the record limit is reached.
    pub fn log(&mut self, record: &CommandRecord) -> Result<()> {
        if self.writer.is_none() || self.records_in_file >= self.max_records_per_file {
            self.rotate()?;
        }

        let line = serde_json::to_string(record)
            .map_err(|e| TeleopError::Telemetry(format!("failed to serialize record: {}", e)))?;

        // rotate() above guarantees a writer
        if let Some(writer) = self.writer.as_mut() {
            writeln!(writer, "{}", line)?;
            self.records_in_file += 1;
        }
        Ok(())
    }

    /// Flushes buffered records to disk.
    pub fn flush(&mut self) -> Result<()> {
        if let Some(writer) = self.writer.as_mut() {
            writer.flush()?;
        }
        Ok(())
    }

    fn rotate(&mut self) -> Result<()> {
        if let Some(mut writer) = self.writer.take() {
            writer.flush()?;
        }

        let name = format!(
            "commands-{}-{:04}.jsonl",
            Utc::now().format("%Y%m%d-%H%M%S"),
            self.file_seq
        );
        self.file_seq += 1;

        let path = self.log_dir.join(name);
        debug!(path = %path.display(), "opening telemetry file");
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        self.writer = Some(BufWriter::new(file));
        self.records_in_file = 0;

        self.prune_old_files()?;
        Ok(())
    }

    fn prune_old_files(&self) -> Result<()> {
        let mut files = list_log_files(&self.log_dir)?;
        if files.len() <= self.max_files_to_keep {
            return Ok(());
        }

        // Names sort chronologically; everything before the retention
        // window goes
        files.sort();
        let excess = files.len() - self.max_files_to_keep;
        for path in files.into_iter().take(excess) {
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "failed to prune telemetry file");
            }
        }
        Ok(())
    }
}

fn list_log_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        let is_jsonl = path.extension().is_some_and(|ext| ext == "jsonl");
        if path.is_file() && is_jsonl {
            files.push(path);
        }
    }
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_config(dir: &Path, max_records: usize, max_files: usize) -> TelemetryConfig {
        TelemetryConfig {
            enabled: true,
            log_dir: dir.to_string_lossy().into_owned(),
            max_records_per_file: max_records,
            max_files_to_keep: max_files,
        }
    }

    fn record() -> CommandRecord {
        CommandRecord::now(
            "velocity",
            &ActuatorCommand {
                lx: 0.1,
                ly: 0.5,
                rx: -0.2,
                ry: 0.0,
                keys: 0,
            },
        )
    }

    #[test]
    fn test_creates_log_directory() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("logs/teleop");
        let config = test_config(&nested, 100, 5);

        CommandLogger::new(&config).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn test_writes_jsonl_lines() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), 100, 5);
        let mut logger = CommandLogger::new(&config).unwrap();

        logger.log(&record()).unwrap();
        logger.log(&record()).unwrap();
        logger.flush().unwrap();

        let files = list_log_files(dir.path()).unwrap();
        assert_eq!(files.len(), 1);

        let contents = fs::read_to_string(&files[0]).unwrap();
        let lines: Vec<&str> = contents.lines().collect();
        assert_eq!(lines.len(), 2);

        let parsed: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(parsed["mode"], "velocity");
        assert_eq!(parsed["ly"], 0.5);
    }

    #[test]
    fn test_rotates_at_record_limit() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), 3, 5);
        let mut logger = CommandLogger::new(&config).unwrap();

        for _ in 0..7 {
            logger.log(&record()).unwrap();
        }
        logger.flush().unwrap();

        // 7 records at 3 per file: three files
        let files = list_log_files(dir.path()).unwrap();
        assert_eq!(files.len(), 3);
    }

    #[test]
    fn test_prunes_beyond_retention() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path(), 1, 2);
        let mut logger = CommandLogger::new(&config).unwrap();

        for _ in 0..6 {
            logger.log(&record()).unwrap();
        }
        logger.flush().unwrap();

        let files = list_log_files(dir.path()).unwrap();
        assert!(files.len() <= 2, "got {} files", files.len());
    }

    #[test]
    fn test_record_serializes_timestamp() {
        let line = serde_json::to_string(&record()).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&line).unwrap();
        assert!(parsed["timestamp"].is_string());
    }
}
