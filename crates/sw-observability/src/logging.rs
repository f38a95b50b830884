//! Structured logging with worker event context.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use sw_core::{EventId, WorkerEvent};

/// Log level for structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Trace => write!(f, "TRACE"),
            Self::Debug => write!(f, "DEBUG"),
            Self::Info => write!(f, "INFO"),
            Self::Warn => write!(f, "WARN"),
            Self::Error => write!(f, "ERROR"),
        }
    }
}

/// A structured log entry.
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Log level.
    pub level: LogLevel,
    /// Log message.
    pub message: String,
    /// Event id for correlation.
    pub event_id: String,
    /// Event kind.
    pub event: WorkerEvent,
    /// Logical resource key.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    /// Additional structured fields.
    #[serde(flatten)]
    pub fields: BTreeMap<String, serde_json::Value>,
    /// Microseconds since the event started.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub elapsed_us: Option<u64>,
}

impl LogEntry {
    /// Format as JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.message.clone())
    }

    /// Format as human-readable string.
    pub fn to_human(&self) -> String {
        let mut s = format!("[{}] {} {}", self.level, self.event_id, self.message);

        if let Some(key) = &self.key {
            s.push_str(&format!(" key={}", key));
        }

        if let Some(elapsed) = self.elapsed_us {
            s.push_str(&format!(" ({}us)", elapsed));
        }

        if !self.fields.is_empty() {
            s.push_str(" | ");
            let fields: Vec<String> = self
                .fields
                .iter()
                .map(|(k, v)| format!("{}={}", k, v))
                .collect();
            s.push_str(&fields.join(" "));
        }

        s
    }
}

/// Output format for logs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON format (for log aggregation).
    Json,
    /// Human-readable format (for development).
    #[default]
    Human,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "human" | "text" => Ok(Self::Human),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Structured logger scoped to one worker event.
///
/// Entries are rendered in the configured format and emitted through
/// `tracing` at the matching level, so the host's subscriber decides where
/// they go.
#[derive(Debug, Clone)]
pub struct WorkerLogger {
    event_id: EventId,
    event: WorkerEvent,
    key: Option<String>,
    start_time: std::time::Instant,
    min_level: LogLevel,
    format: LogFormat,
}

impl WorkerLogger {
    /// Create a logger for a new event dispatch.
    pub fn new(event: WorkerEvent) -> Self {
        Self {
            event_id: EventId::next(event),
            event,
            key: None,
            start_time: std::time::Instant::now(),
            min_level: LogLevel::Debug,
            format: LogFormat::default(),
        }
    }

    /// Set the logical resource key.
    pub fn with_key(mut self, key: impl Into<String>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Set minimum log level.
    pub fn with_min_level(mut self, level: LogLevel) -> Self {
        self.min_level = level;
        self
    }

    /// Set output format.
    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    /// Log at debug level.
    pub fn debug(&self, message: &str) {
        self.log(LogLevel::Debug, message, BTreeMap::new());
    }

    /// Log at info level.
    pub fn info(&self, message: &str) {
        self.log(LogLevel::Info, message, BTreeMap::new());
    }

    /// Log at warn level.
    pub fn warn(&self, message: &str) {
        self.log(LogLevel::Warn, message, BTreeMap::new());
    }

    /// Log at error level.
    pub fn error(&self, message: &str) {
        self.log(LogLevel::Error, message, BTreeMap::new());
    }

    /// Build the rendered line, or `None` if below the minimum level.
    pub fn render(
        &self,
        level: LogLevel,
        message: &str,
        fields: BTreeMap<String, serde_json::Value>,
    ) -> Option<String> {
        if level < self.min_level {
            return None;
        }

        let entry = LogEntry {
            level,
            message: message.to_string(),
            event_id: self.event_id.to_string(),
            event: self.event,
            key: self.key.clone(),
            fields,
            elapsed_us: Some(self.elapsed_us()),
        };

        Some(match self.format {
            LogFormat::Json => entry.to_json(),
            LogFormat::Human => entry.to_human(),
        })
    }

    fn log(&self, level: LogLevel, message: &str, fields: BTreeMap<String, serde_json::Value>) {
        let Some(line) = self.render(level, message, fields) else {
            return;
        };

        match level {
            LogLevel::Trace => tracing::trace!(target: "shellcache", "{}", line),
            LogLevel::Debug => tracing::debug!(target: "shellcache", "{}", line),
            LogLevel::Info => tracing::info!(target: "shellcache", "{}", line),
            LogLevel::Warn => tracing::warn!(target: "shellcache", "{}", line),
            LogLevel::Error => tracing::error!(target: "shellcache", "{}", line),
        }
    }

    /// Get the event id.
    pub fn event_id(&self) -> &EventId {
        &self.event_id
    }

    /// Get elapsed time since logger creation.
    pub fn elapsed_us(&self) -> u64 {
        self.start_time.elapsed().as_micros() as u64
    }
}

/// Builder for log entries with fluent API.
pub struct LogBuilder<'a> {
    logger: &'a WorkerLogger,
    level: LogLevel,
    message: String,
    fields: BTreeMap<String, serde_json::Value>,
}

impl<'a> LogBuilder<'a> {
    /// Create a new log builder.
    pub fn new(logger: &'a WorkerLogger, level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            logger,
            level,
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Add a string field.
    pub fn field(mut self, key: &str, value: impl Into<String>) -> Self {
        self.fields
            .insert(key.to_string(), serde_json::json!(value.into()));
        self
    }

    /// Add an integer field.
    pub fn field_u64(mut self, key: &str, value: u64) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(value));
        self
    }

    /// Add a list field.
    pub fn field_list(mut self, key: &str, values: &[String]) -> Self {
        self.fields.insert(key.to_string(), serde_json::json!(values));
        self
    }

    /// Emit the log entry.
    pub fn emit(self) {
        self.logger.log(self.level, &self.message, self.fields);
    }
}

impl WorkerLogger {
    /// Start building an info log entry.
    pub fn info_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Info, message)
    }

    /// Start building a warn log entry.
    pub fn warn_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Warn, message)
    }

    /// Start building an error log entry.
    pub fn error_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Error, message)
    }

    /// Start building a debug log entry.
    pub fn debug_builder(&self, message: impl Into<String>) -> LogBuilder<'_> {
        LogBuilder::new(self, LogLevel::Debug, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_below_min_level_is_dropped() {
        let logger = WorkerLogger::new(WorkerEvent::Fetch).with_min_level(LogLevel::Warn);
        assert!(logger.render(LogLevel::Info, "skip", BTreeMap::new()).is_none());
        assert!(logger.render(LogLevel::Error, "keep", BTreeMap::new()).is_some());
    }

    #[test]
    fn test_json_format() {
        let logger = WorkerLogger::new(WorkerEvent::Activate)
            .with_key("main.dart.js")
            .with_format(LogFormat::Json);
        let mut fields = BTreeMap::new();
        fields.insert("evicted".to_string(), serde_json::json!(3));

        let line = logger.render(LogLevel::Info, "done", fields).unwrap();
        let value: serde_json::Value = serde_json::from_str(&line).unwrap();

        assert_eq!(value["level"], "info");
        assert_eq!(value["event"], "activate");
        assert_eq!(value["key"], "main.dart.js");
        assert_eq!(value["evicted"], 3);
        assert!(value["event_id"].as_str().unwrap().starts_with("activate-"));
    }

    #[test]
    fn test_human_format() {
        let logger = WorkerLogger::new(WorkerEvent::Install);
        let mut fields = BTreeMap::new();
        fields.insert("count".to_string(), serde_json::json!(5));

        let line = logger.render(LogLevel::Error, "failed", fields).unwrap();
        assert!(line.starts_with("[ERROR] install-"));
        assert!(line.contains("failed"));
        assert!(line.ends_with("| count=5"));
    }

    #[test]
    fn test_log_format_from_str() {
        assert_eq!("json".parse::<LogFormat>().unwrap(), LogFormat::Json);
        assert_eq!("Text".parse::<LogFormat>().unwrap(), LogFormat::Human);
        assert!("xml".parse::<LogFormat>().is_err());
    }
}
