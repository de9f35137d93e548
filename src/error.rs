use crate::renderer::ERROR_RENDERER;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while constructing a handler.
///
/// Construction is all-or-nothing: any of these means no handler was built.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Handlers are not configured")]
    HandlersNotConfigured,

    #[error("Handlers were not specified via an array!")]
    HandlersNotArray,

    #[error("No handlers were specified!")]
    NoHandlers,

    #[error("Handler config keys must be strings!")]
    KeyNotString,

    #[error("Handler config keys must refer to implementations of {}!", ERROR_RENDERER)]
    UnknownRenderer { kind: String },

    #[error(
        "Handler config keys must refer to implementations of {}, not the interface!",
        ERROR_RENDERER
    )]
    InterfaceNotImplementation,

    #[error("Handler arguments must be specifed as an array!")]
    ArgumentsNotArray { kind: String },

    #[error("Invalid arguments for {kind}: {reason}")]
    InvalidArguments { kind: String, reason: String },

    #[error("Invalid base url {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    #[error("Base path is not a directory: {path}")]
    InvalidBasePath { path: String },

    #[error("Failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Failed to parse TOML config: {0}")]
    Toml(#[from] toml::de::Error),
}

impl ConfigError {
    /// Create an error for a renderer factory that rejected its arguments
    pub fn invalid_arguments(kind: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArguments {
            kind: kind.into(),
            reason: reason.into(),
        }
    }

    /// Create an error for a malformed base url
    pub fn invalid_base_url(url: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidBaseUrl {
            url: url.into(),
            reason: reason.into(),
        }
    }
}
