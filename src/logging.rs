//! Structured event log: one JSON object per line.

use serde_derive::Serialize;
use serde_json::{Map, Value};
use std::io::Write;
use std::str::FromStr;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::errors::*;

pub type LogFields = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = Error;

    fn from_str(s: &str) -> Result<LogLevel> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            other => Err(ErrorKind::Configuration(format!("unknown log level '{}'", other)).into()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct LogEvent {
    pub ts_ms: u128,
    pub level: LogLevel,
    pub target: String,
    pub message: String,
    #[serde(skip_serializing_if = "LogFields::is_empty")]
    pub fields: LogFields,
}

impl LogEvent {
    pub fn new(level: LogLevel, target: &str, message: &str) -> LogEvent {
        LogEvent {
            ts_ms: current_ms(),
            level,
            target: target.to_string(),
            message: message.to_string(),
            fields: LogFields::new(),
        }
    }

    pub fn field<V: Into<Value>>(mut self, key: &str, value: V) -> LogEvent {
        self.fields.insert(key.to_string(), value.into());
        self
    }
}

fn current_ms() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0)
}

/// Writes events at or above `threshold` to `out`.
#[derive(Debug)]
pub struct Logger<W: Write> {
    threshold: LogLevel,
    out: W,
}

impl<W: Write> Logger<W> {
    pub fn new(threshold: LogLevel, out: W) -> Logger<W> {
        Logger { threshold, out }
    }

    #[inline]
    pub fn enabled(&self, level: LogLevel) -> bool {
        level >= self.threshold
    }

    pub fn log(&mut self, event: &LogEvent) -> Result<()> {
        if !self.enabled(event.level) {
            return Ok(());
        }
        let mut line = serde_json::to_string(event)?;
        line.push('\n');
        self.out.write_all(line.as_bytes())?;
        self.out.flush()?;
        Ok(())
    }

    pub fn info(&mut self, target: &str, message: &str) -> Result<()> {
        self.log(&LogEvent::new(LogLevel::Info, target, message))
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn parses_levels() {
        assert_eq!("INFO".parse::<LogLevel>().unwrap(), LogLevel::Info);
        assert_eq!("trace".parse::<LogLevel>().unwrap(), LogLevel::Trace);
        assert!(matches!(*"loud".parse::<LogLevel>().unwrap_err().kind(), ErrorKind::Configuration(_)));
        assert!(LogLevel::Warn > LogLevel::Debug);
    }

    #[test]
    fn writes_json_lines_above_threshold() {
        let mut logger = Logger::new(LogLevel::Info, Vec::new());
        logger.log(&LogEvent::new(LogLevel::Debug, "mazes", "hidden")).unwrap();
        logger.log(&LogEvent::new(LogLevel::Info, "mazes", "generated").field("passages", 8)).unwrap();
        logger.info("mazes", "done").unwrap();

        let text = String::from_utf8(logger.into_inner()).unwrap();
        let lines: Vec<Value> = text.lines().map(|line| serde_json::from_str(line).unwrap()).collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0]["level"], "info");
        assert_eq!(lines[0]["message"], "generated");
        assert_eq!(lines[0]["fields"]["passages"], 8);
        assert!(lines[1].get("fields").is_none());
    }
}
