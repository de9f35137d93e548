use crate::logger::{Level, LogContext, LogError, Logger};

/// Forwards log entries to `tracing` events.
///
/// Exception details are attached as structured fields; extra context fields
/// are rendered as a single JSON `context` field.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: Level, message: &str, context: &LogContext<'_>) -> Result<(), LogError> {
        let (kind, file, line) = match context.exception() {
            Some(e) => (e.kind(), e.file(), e.line()),
            None => ("", "", 0),
        };
        let fields = if context.fields().is_empty() {
            String::new()
        } else {
            serde_json::Value::Object(context.fields().clone()).to_string()
        };

        match level {
            Level::Emergency | Level::Alert | Level::Critical | Level::Error => tracing::error!(
                psr.level = %level,
                exception.kind = kind,
                exception.file = file,
                exception.line = line,
                context = %fields,
                "{}",
                message
            ),
            Level::Warning => tracing::warn!(
                psr.level = %level,
                exception.kind = kind,
                exception.file = file,
                exception.line = line,
                context = %fields,
                "{}",
                message
            ),
            Level::Notice | Level::Info => tracing::info!(
                psr.level = %level,
                exception.kind = kind,
                exception.file = file,
                exception.line = line,
                context = %fields,
                "{}",
                message
            ),
            Level::Debug => tracing::debug!(
                psr.level = %level,
                exception.kind = kind,
                exception.file = file,
                exception.line = line,
                context = %fields,
                "{}",
                message
            ),
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::exception::Exception;
    use std::io::Write;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl Write for Captured {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_tracing_logger_never_fails() {
        let _ = tracing_subscriber::fmt().with_test_writer().try_init();

        let exception = Exception::new("RuntimeException", "foo");
        let context = LogContext::new().with_exception(&exception);
        let logger = TracingLogger;

        for level in [Level::Critical, Level::Warning, Level::Notice, Level::Debug] {
            assert!(logger.log(level, "entry", &context).is_ok());
        }
    }

    #[test]
    fn test_every_level_carries_the_same_fields() {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();

        let exception = Exception::new("RuntimeException", "foo");
        let context = LogContext::new().with_exception(&exception);

        tracing::subscriber::with_default(subscriber, || {
            for level in [Level::Error, Level::Warning, Level::Info, Level::Debug] {
                assert!(TracingLogger.log(level, "entry", &context).is_ok());
            }
        });

        let output = String::from_utf8(captured.0.lock().unwrap().clone()).unwrap();
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 4, "output: {output}");
        for (line, level) in lines.iter().zip(["error", "warning", "info", "debug"]) {
            assert!(line.contains(&format!("psr.level={level}")), "line: {line}");
            assert!(line.contains("exception.kind=\"RuntimeException\""), "line: {line}");
            assert!(line.contains("exception.line="), "line: {line}");
        }
    }
}
