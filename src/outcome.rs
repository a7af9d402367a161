//! Per-model log buffer, outcome flags and run-wide aggregation.

use crate::sysexits;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogLevel::Info => "info",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.level, self.message)
    }
}

/// Log buffer and outcome recorder handed to whatever is running.
///
/// Every entry is forwarded to `tracing` as it is recorded, so the buffer only
/// exists to answer [`has_warnings`](RunLog::has_warnings) and
/// [`has_errors`](RunLog::has_errors) until it is cleared.
#[derive(Debug, Default)]
pub struct RunLog {
    entries: Vec<LogEntry>,
}

impl RunLog {
    pub fn new() -> Self {
        Self { entries: vec![] }
    }

    pub fn info(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::info!("{message}");
        self.push(LogLevel::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!("{message}");
        self.push(LogLevel::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        let message = message.into();
        tracing::error!("{message}");
        self.push(LogLevel::Error, message);
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.entries.push(LogEntry { level, message });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Warn)
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Error)
    }

    /// Empties the buffer, discarding the outcome flags with it.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Reads the outcome flags and then clears the buffer.
    pub fn take_outcome(&mut self) -> Outcome {
        let outcome = Outcome {
            had_warnings: self.has_warnings(),
            had_errors: self.has_errors(),
        };
        self.clear();
        outcome
    }
}

/// Warning and error flags of one model's execution.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub had_warnings: bool,
    pub had_errors: bool,
}

impl Outcome {
    pub fn is_clean(&self) -> bool {
        !self.had_warnings && !self.had_errors
    }
}

/// Accumulated flags of every model performed in one run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Aggregate {
    pub any_warning: bool,
    pub any_error: bool,
}

impl Aggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in one model's outcome. Flags only ever go from false to true.
    pub fn record(&mut self, outcome: Outcome) {
        self.any_warning |= outcome.had_warnings;
        self.any_error |= outcome.had_errors;
    }

    pub fn status(&self) -> ExitStatus {
        if self.any_error {
            ExitStatus::Error
        } else if self.any_warning {
            ExitStatus::Warning
        } else {
            ExitStatus::Success
        }
    }
}

/// Final status of an invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    Warning,
    Error,
    /// Preparation failed; nothing was performed.
    Aborted,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => sysexits::EX_OK,
            ExitStatus::Warning => sysexits::EX_WARNINGS,
            ExitStatus::Error => sysexits::EX_ERRORS,
            ExitStatus::Aborted => sysexits::EX_PREPARE,
        }
    }
}
