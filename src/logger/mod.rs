//! Logger capability
//!
//! Handlers report dispatch failures through a [`Logger`]. Any sink can be
//! plugged in; [`TracingLogger`] forwards entries to `tracing`, [`NullLogger`]
//! drops them.
//!
//! # Example
//!
//! ```rust
//! use meshestra_logging::logger::{Level, LogContext, Logger, NullLogger};
//!
//! let logger = NullLogger;
//! logger.log(Level::Info, "started", &LogContext::new()).unwrap();
//! ```

mod tracing_logger;

use crate::exception::Exception;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use strum_macros::{Display, EnumString};
use thiserror::Error;

pub use tracing_logger::TracingLogger;

/// Severity of a log entry, most severe first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum Level {
    Emergency,
    Alert,
    Critical,
    Error,
    Warning,
    Notice,
    Info,
    Debug,
}

/// Errors a logger may report instead of recording an entry
#[derive(Debug, Error)]
pub enum LogError {
    #[error("Log sink unavailable: {0}")]
    Unavailable(String),

    #[error("Logger panicked: {0}")]
    Panicked(String),
}

/// Contextual data attached to a log entry
#[derive(Debug, Default)]
pub struct LogContext<'a> {
    exception: Option<&'a Exception>,
    fields: Map<String, Value>,
}

impl<'a> LogContext<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_exception(mut self, exception: &'a Exception) -> Self {
        self.exception = Some(exception);
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }

    pub fn exception(&self) -> Option<&'a Exception> {
        self.exception
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// Flatten the context into a JSON object, the exception under `"exception"`.
    pub fn to_json(&self) -> Value {
        let mut object = self.fields.clone();
        if let Some(exception) = self.exception {
            object.insert(
                "exception".to_string(),
                json!({
                    "type": exception.kind(),
                    "message": exception.message(),
                    "file": exception.file(),
                    "line": exception.line(),
                }),
            );
        }
        Value::Object(object)
    }
}

/// The Logger trait
///
/// Implementations may fail; callers decide how to degrade.
pub trait Logger: Send + Sync + 'static {
    fn log(&self, level: Level, message: &str, context: &LogContext<'_>) -> Result<(), LogError>;

    fn error(&self, message: &str, context: &LogContext<'_>) -> Result<(), LogError> {
        self.log(Level::Error, message, context)
    }

    fn warning(&self, message: &str, context: &LogContext<'_>) -> Result<(), LogError> {
        self.log(Level::Warning, message, context)
    }

    fn info(&self, message: &str, context: &LogContext<'_>) -> Result<(), LogError> {
        self.log(Level::Info, message, context)
    }

    fn debug(&self, message: &str, context: &LogContext<'_>) -> Result<(), LogError> {
        self.log(Level::Debug, message, context)
    }
}

/// A logger that discards every entry
#[derive(Debug, Clone, Copy, Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn log(&self, _level: Level, _message: &str, _context: &LogContext<'_>) -> Result<(), LogError> {
        Ok(())
    }
}

/// Trait for handlers and collaborators that carry an attached logger
pub trait HasLogger {
    fn get_logger(&self) -> &Arc<dyn Logger>;
}
