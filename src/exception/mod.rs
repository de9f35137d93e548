//! Failures captured at the dispatch boundary.
//!
//! An [`Exception`] records what went wrong and where: the failing type's name,
//! its message and the source location it was raised from. Errors converted via
//! `?` record the location of the `?` itself.

use std::any::Any;
use std::borrow::Cow;
use std::error::Error;
use std::fmt;
use std::panic::Location;

/// A type-erased error, as produced by tower services.
pub type BoxError = Box<dyn Error + Send + Sync>;

/// A failure raised while dispatching a request.
///
/// `Exception` deliberately does not implement [`std::error::Error`], so any
/// error type converts into it with `?`.
pub struct Exception {
    kind: Cow<'static, str>,
    message: String,
    file: Cow<'static, str>,
    line: u32,
    source: Option<BoxError>,
}

impl Exception {
    /// Create an exception of the given kind, located at the caller.
    #[track_caller]
    pub fn new(kind: impl Into<Cow<'static, str>>, message: impl Into<String>) -> Self {
        let location = Location::caller();
        Self {
            kind: kind.into(),
            message: message.into(),
            file: Cow::Borrowed(location.file()),
            line: location.line(),
            source: None,
        }
    }

    /// Capture a concrete error, naming it after its type.
    #[track_caller]
    pub fn from_error<E>(error: E) -> Self
    where
        E: Error + Send + Sync + 'static,
    {
        let mut exception = Self::new(short_type_name::<E>(), error.to_string());
        exception.source = Some(Box::new(error));
        exception
    }

    /// Capture a boxed error whose concrete type is no longer known.
    #[track_caller]
    pub fn from_boxed(error: BoxError) -> Self {
        let mut exception = Self::new("Error", error.to_string());
        exception.source = Some(error);
        exception
    }

    /// Capture an `anyhow` error, keeping its context chain as the message.
    #[track_caller]
    pub fn from_anyhow(error: anyhow::Error) -> Self {
        let message = format!("{error:#}");
        let mut exception = Self::new("Error", message);
        exception.source = Some(error.into());
        exception
    }

    /// Capture the payload of a caught panic.
    ///
    /// The panic site is not recoverable from the payload, so the location
    /// is recorded as the point where the panic was caught.
    #[track_caller]
    pub fn from_panic(payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(message) = payload.downcast_ref::<&'static str>() {
            (*message).to_string()
        } else if let Some(message) = payload.downcast_ref::<String>() {
            message.clone()
        } else {
            "Box<dyn Any>".to_string()
        };
        Self::new("Panic", message)
    }

    pub fn kind(&self) -> &str {
        &self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn file(&self) -> &str {
        &self.file
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    /// The captured error, if this exception wraps one.
    pub fn source(&self) -> Option<&(dyn Error + Send + Sync + 'static)> {
        self.source.as_deref()
    }

    /// Attempt to downcast the captured error to a concrete type.
    pub fn downcast_ref<E: Error + 'static>(&self) -> Option<&E> {
        self.source.as_deref().and_then(|e| e.downcast_ref::<E>())
    }

    /// Messages of the captured error's own sources, outermost first.
    pub fn causes(&self) -> Vec<String> {
        let mut causes = Vec::new();
        let mut next = self.source.as_deref().and_then(|e| e.source());
        while let Some(cause) = next {
            causes.push(cause.to_string());
            next = cause.source();
        }
        causes
    }
}

impl<E> From<E> for Exception
where
    E: Error + Send + Sync + 'static,
{
    #[track_caller]
    fn from(error: E) -> Self {
        Self::from_error(error)
    }
}

impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} in file {} on line {}",
            self.kind, self.message, self.file, self.line
        )
    }
}

impl fmt::Debug for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Exception")
            .field("kind", &self.kind)
            .field("message", &self.message)
            .field("file", &self.file)
            .field("line", &self.line)
            .field("source", &self.source)
            .finish()
    }
}

/// `std::io::error::Error` -> `Error`, `foo::Wrapper<bar::Baz>` -> `Wrapper`
fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path = full.split('<').next().unwrap_or(full);
    path.rsplit("::").next().unwrap_or(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("foo")]
    struct RuntimeError;

    #[derive(Debug, thiserror::Error)]
    #[error("outer")]
    struct Outer(#[source] RuntimeError);

    fn fails() -> Result<(), Exception> {
        Err::<(), _>(RuntimeError)?;
        Ok(())
    }

    #[test]
    fn test_question_mark_captures_type_and_location() {
        let exception = fails().unwrap_err();
        assert_eq!(exception.kind(), "RuntimeError");
        assert_eq!(exception.message(), "foo");
        assert!(exception.file().ends_with("mod.rs"));
        assert!(exception.line() > 0);
        assert!(exception.downcast_ref::<RuntimeError>().is_some());
    }

    #[test]
    fn test_display_format() {
        let exception = Exception::new("RuntimeException", "foo");
        let expected = format!(
            "RuntimeException: foo in file {} on line {}",
            exception.file(),
            exception.line()
        );
        assert_eq!(exception.to_string(), expected);
    }

    #[test]
    fn test_short_type_name() {
        assert_eq!(short_type_name::<std::io::Error>(), "Error");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec");
        assert_eq!(short_type_name::<RuntimeError>(), "RuntimeError");
    }

    #[test]
    fn test_causes_walk_the_source_chain() {
        let exception = Exception::from_error(Outer(RuntimeError));
        assert_eq!(exception.kind(), "Outer");
        assert_eq!(exception.causes(), vec!["foo".to_string()]);
    }

    #[test]
    fn test_from_panic_payloads() {
        let exception = Exception::from_panic(Box::new("boom"));
        assert_eq!(exception.kind(), "Panic");
        assert_eq!(exception.message(), "boom");

        let exception = Exception::from_panic(Box::new(String::from("owned boom")));
        assert_eq!(exception.message(), "owned boom");

        let exception = Exception::from_panic(Box::new(42_u8));
        assert_eq!(exception.message(), "Box<dyn Any>");
    }

    #[test]
    fn test_from_anyhow_keeps_context() {
        let error = anyhow::anyhow!("disk full").context("saving session");
        let exception = Exception::from_anyhow(error);
        assert_eq!(exception.kind(), "Error");
        assert_eq!(exception.message(), "saving session: disk full");
        assert!(exception.source().is_some());
    }
}
