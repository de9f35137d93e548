//! # Meshestra Logging
//!
//! Logger-attached and failure-catching HTTP handlers for Meshestra.
//!
//! A [`CatchingHttpHandler`] wraps request dispatch in a failure boundary: a
//! dispatch that returns an error or panics is logged through the attached
//! [`Logger`](logger::Logger) and rendered as a 500 by a configurable chain of
//! error renderers. Callers always get a response back, never an error.
//!
//! ## Features
//!
//! - **Logger attachment**: share one logger across handlers and collaborators
//! - **Failure boundary**: errors and panics become rendered 500 responses
//! - **Config-driven renderers**: `plain_text`, `json`, or your own kinds
//! - **Tower integration**: [`CatchingLayer`] wraps any service, including `axum::Router`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use meshestra_logging::prelude::*;
//! use axum::routing::get;
//!
//! async fn boom() -> &'static str {
//!     panic!("boom")
//! }
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     // 1. Describe the renderer chain
//!     let config = HandlerConfig::from_toml_str(r#"
//!         [error_renderers]
//!         plain_text = []
//!     "#)?;
//!
//!     // 2. Route requests
//!     let router = Router::new()
//!         .route("/", get(|| async { "home" }))
//!         .route("/boom", get(boom));
//!
//!     // 3. Wrap dispatch in the failure boundary
//!     let handler = CatchingHttpHandler::new(
//!         Arc::new(TracingLogger),
//!         "https://example.com/",
//!         ".",
//!         config,
//!         ServiceDispatcher::new(router),
//!     )?;
//!
//!     let listener = tokio::net::TcpListener::bind("0.0.0.0:3000").await?;
//!     axum::serve(listener, Router::new().fallback_service(handler)).await?;
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod exception;
pub mod handler;
pub mod logger;
pub mod renderer;

// Re-export core types
pub use config::{HandlerConfig, RendererSpec};
pub use error::{ConfigError, Result};
pub use exception::Exception;
pub use handler::{CatchingHttpHandler, CatchingLayer, HttpHandler, LoggingHttpHandler};

// Re-export commonly used types from dependencies
pub use async_trait::async_trait;
pub use axum;

/// Prelude module for convenient imports
///
/// ```
/// use meshestra_logging::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{HandlerConfig, RendererSpec};
    pub use crate::error::{ConfigError, Result};
    pub use crate::exception::Exception;
    pub use crate::handler::{
        CatchingHttpHandler, CatchingLayer, DispatchResult, Dispatcher, HttpHandler,
        LoggingHttpHandler, ServiceDispatcher, dispatcher_fn,
    };
    pub use crate::logger::{HasLogger, Level, LogContext, LogError, Logger, NullLogger, TracingLogger};
    pub use crate::renderer::{
        ErrorRenderer, JsonRenderer, PlainTextRenderer, RendererRegistry, Rendition, RequestInfo,
    };
    pub use async_trait::async_trait;
    pub use axum::{
        Router,
        http::StatusCode,
        response::{IntoResponse, Response},
    };
    pub use std::sync::Arc;
}
