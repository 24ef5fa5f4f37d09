//! Per-run log file with an optional console callback.
//!
//! Warnings, errors and raw tool output are also kept in a bounded tail so
//! the end of a failed run can repeat what went wrong. Lines reach `tracing`
//! only when no callback is installed; with one, the callback is the
//! console and mirroring would print everything twice.

use std::collections::VecDeque;
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use chrono::Local;
use parking_lot::Mutex;

use super::types::{LogCallback, LogConfig, LogLevel, MessagePrefix};

pub struct RunLogger {
    run_name: String,
    log_path: PathBuf,
    file: Mutex<Option<BufWriter<File>>>,
    callback: Option<LogCallback>,
    config: LogConfig,
    tail: Mutex<VecDeque<String>>,
}

impl std::fmt::Debug for RunLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunLogger")
            .field("run_name", &self.run_name)
            .field("log_path", &self.log_path)
            .finish()
    }
}

impl RunLogger {
    /// Open `<log_dir>/<run_name>.log`, creating the folder if needed.
    pub fn new(
        run_name: impl Into<String>,
        log_dir: impl AsRef<Path>,
        config: LogConfig,
        callback: Option<LogCallback>,
    ) -> std::io::Result<Self> {
        let run_name = run_name.into();
        let log_dir = log_dir.as_ref();
        fs::create_dir_all(log_dir)?;

        let log_path = log_dir.join(format!("{}.log", sanitize_filename(&run_name)));
        let file = File::create(&log_path)?;

        Ok(Self {
            run_name,
            log_path,
            file: Mutex::new(Some(BufWriter::new(file))),
            callback,
            tail: Mutex::new(VecDeque::with_capacity(config.error_tail)),
            config,
        })
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    /// Log a message at `level`. Warnings and errors also enter the tail.
    pub fn log(&self, level: LogLevel, message: &str) {
        if level < self.config.level {
            return;
        }

        if self.callback.is_none() {
            match level {
                LogLevel::Trace => tracing::trace!(run = %self.run_name, "{}", message),
                LogLevel::Debug => tracing::debug!(run = %self.run_name, "{}", message),
                LogLevel::Info => tracing::info!(run = %self.run_name, "{}", message),
                LogLevel::Warn => tracing::warn!(run = %self.run_name, "{}", message),
                LogLevel::Error => tracing::error!(run = %self.run_name, "{}", message),
            }
        }

        if level >= LogLevel::Warn {
            self.remember(message);
        }
        self.output(message);
    }

    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message);
    }

    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, &MessagePrefix::Warning.format(message));
    }

    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, &MessagePrefix::Error.format(message));
    }

    /// `=== name ===`
    pub fn phase(&self, phase_name: &str) {
        self.log(LogLevel::Info, &MessagePrefix::Phase.format(phase_name));
    }

    pub fn prefixed(&self, level: LogLevel, prefix: MessagePrefix, message: &str) {
        self.log(level, &prefix.format(message));
    }

    /// Record a line of external tool output.
    ///
    /// Always kept in the tail; written out only when not compact.
    pub fn output_line(&self, line: &str) {
        self.remember(line);
        if !self.config.compact {
            self.output(line);
        }
    }

    /// Repeat the tail under a header. Does nothing when it is empty.
    pub fn show_tail(&self, header: &str) {
        let lines = self.get_tail();
        if lines.is_empty() {
            return;
        }

        self.output(&format!("[{}/tail]", header));
        for line in &lines {
            self.output(line);
        }
    }

    pub fn get_tail(&self) -> Vec<String> {
        self.tail.lock().iter().cloned().collect()
    }

    pub fn flush(&self) {
        if let Some(writer) = self.file.lock().as_mut() {
            let _ = writer.flush();
        }
    }

    /// Flush and release the file. Later lines only reach the callback.
    pub fn close(&self) {
        self.flush();
        *self.file.lock() = None;
    }

    fn remember(&self, line: &str) {
        if self.config.error_tail == 0 {
            return;
        }
        let mut tail = self.tail.lock();
        if tail.len() >= self.config.error_tail {
            tail.pop_front();
        }
        tail.push_back(line.to_string());
    }

    fn output(&self, message: &str) {
        let line = if self.config.show_timestamps {
            format!("[{}] {}", Local::now().format("%H:%M:%S"), message)
        } else {
            message.to_string()
        };

        if let Some(writer) = self.file.lock().as_mut() {
            let _ = writeln!(writer, "{}", line);
        }
        if let Some(callback) = &self.callback {
            callback(&line);
        }
    }
}

impl Drop for RunLogger {
    fn drop(&mut self) {
        self.close();
    }
}

/// Replace characters that are not allowed in file names.
fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            _ => c,
        })
        .collect()
}
