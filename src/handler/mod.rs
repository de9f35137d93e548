//! HTTP handlers
//!
//! Handlers stack as decorators over a [`Dispatcher`]:
//!
//! ```text
//! CatchingHttpHandler      failures -> log -> rendered 500
//!   └─ LoggingHttpHandler  attached Logger
//!        └─ HttpHandler    base url, base path, settings
//!             └─ Dispatcher (router, closure, ...)
//! ```
//!
//! [`CatchingLayer`] provides the same failure boundary for any tower service.

mod catching;
mod dispatcher;
mod layer;
mod logging;

use crate::config::HandlerConfig;
use crate::error::{ConfigError, Result};
use crate::exception::Exception;
use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Request, Uri},
    response::Response,
};
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub use catching::{CatchingHttpHandler, FALLBACK_BODY, fallback_response};
pub use dispatcher::{FnDispatcher, ServiceDispatcher, dispatcher_fn};
pub use layer::{CatchingLayer, CatchingService};
pub use logging::LoggingHttpHandler;

/// Standard return type for dispatchers
pub type DispatchResult = std::result::Result<Response, Exception>;

/// The Dispatcher trait
///
/// Routes a request to application code. Failures are reported as an
/// [`Exception`]; panics are caught by the catching handlers.
#[async_trait]
pub trait Dispatcher: Send + Sync + 'static {
    async fn dispatch(&self, request: Request<Body>) -> DispatchResult;
}

/// Base handler: validated base url and path plus opaque settings around a dispatcher
#[derive(Clone)]
pub struct HttpHandler {
    base_url: Uri,
    base_path: PathBuf,
    settings: Arc<Map<String, Value>>,
    dispatcher: Arc<dyn Dispatcher>,
}

impl HttpHandler {
    /// # Errors
    /// Fails if `base_url` is not an absolute http(s) url whose path ends in
    /// `/`, or if `base_path` is not an existing directory.
    pub fn new<D: Dispatcher>(
        base_url: &str,
        base_path: impl AsRef<Path>,
        config: HandlerConfig,
        dispatcher: D,
    ) -> Result<Self> {
        let base_url = parse_base_url(base_url)?;
        let base_path = base_path.as_ref();
        if !base_path.is_dir() {
            return Err(ConfigError::InvalidBasePath {
                path: base_path.display().to_string(),
            });
        }

        Ok(Self {
            base_url,
            base_path: base_path.to_path_buf(),
            settings: Arc::new(config.settings),
            dispatcher: Arc::new(dispatcher),
        })
    }

    pub fn base_url(&self) -> &Uri {
        &self.base_url
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    pub fn settings(&self) -> &Map<String, Value> {
        &self.settings
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    pub async fn handle(&self, request: Request<Body>) -> DispatchResult {
        self.dispatcher.dispatch(request).await
    }
}

impl std::fmt::Debug for HttpHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpHandler")
            .field("base_url", &self.base_url)
            .field("base_path", &self.base_path)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

fn parse_base_url(base_url: &str) -> Result<Uri> {
    let uri: Uri = base_url
        .parse()
        .map_err(|e: axum::http::uri::InvalidUri| ConfigError::invalid_base_url(base_url, e.to_string()))?;

    if !matches!(uri.scheme_str(), Some("http") | Some("https")) {
        return Err(ConfigError::invalid_base_url(base_url, "scheme must be http or https"));
    }
    if uri.host().is_none() {
        return Err(ConfigError::invalid_base_url(base_url, "missing host"));
    }
    let raw = base_url.split(['?', '#']).next().unwrap_or(base_url);
    if !raw.ends_with('/') || !uri.path().ends_with('/') {
        return Err(ConfigError::invalid_base_url(base_url, "path must end with '/'"));
    }

    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::json;

    const BASE_PATH: &str = env!("CARGO_MANIFEST_DIR");

    fn ok_dispatcher() -> impl Dispatcher {
        dispatcher_fn(|_request: Request<Body>| async { Ok((StatusCode::OK, "ok").into_response()) })
    }

    #[test]
    fn test_base_url_validation() {
        for url in ["https://example.com/", "http://localhost:8080/app/"] {
            assert!(HttpHandler::new(url, BASE_PATH, HandlerConfig::new(), ok_dispatcher()).is_ok());
        }

        for url in ["example.com/", "ftp://example.com/", "/relative/", "https://example.com/app",
            "https://example.com", "https://example.com?x=/"] {
            let err = HttpHandler::new(url, BASE_PATH, HandlerConfig::new(), ok_dispatcher()).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidBaseUrl { .. }), "url: {url}");
        }
    }

    #[test]
    fn test_base_path_must_be_directory() {
        let missing = Path::new(BASE_PATH).join("does-not-exist");
        let err = HttpHandler::new("https://example.com/", &missing, HandlerConfig::new(), ok_dispatcher())
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidBasePath { .. }));

        let file = Path::new(BASE_PATH).join("Cargo.toml");
        assert!(HttpHandler::new("https://example.com/", &file, HandlerConfig::new(), ok_dispatcher()).is_err());
    }

    #[tokio::test]
    async fn test_settings_pass_through() {
        let config = HandlerConfig::new().with_setting("sources", json!(["routes"]));
        let handler = HttpHandler::new("https://example.com/", BASE_PATH, config, ok_dispatcher()).unwrap();

        assert_eq!(handler.setting("sources"), Some(&json!(["routes"])));
        assert_eq!(handler.base_url().host(), Some("example.com"));

        let response = handler
            .handle(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
