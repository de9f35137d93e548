use crate::config::HandlerConfig;
use crate::error::Result;
use crate::handler::{DispatchResult, Dispatcher, HttpHandler};
use crate::logger::{HasLogger, Logger};
use axum::{body::Body, http::Request};
use std::path::Path;
use std::sync::Arc;

/// A base handler with an attached [`Logger`]
///
/// The logger is shared, not copied: [`LoggingHttpHandler::logger`] returns
/// the same instance that was passed in.
#[derive(Clone)]
pub struct LoggingHttpHandler {
    base: HttpHandler,
    logger: Arc<dyn Logger>,
}

impl LoggingHttpHandler {
    pub fn new<D: Dispatcher>(
        logger: Arc<dyn Logger>,
        base_url: &str,
        base_path: impl AsRef<Path>,
        config: HandlerConfig,
        dispatcher: D,
    ) -> Result<Self> {
        let base = HttpHandler::new(base_url, base_path, config, dispatcher)?;
        Ok(Self { base, logger })
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    pub fn base(&self) -> &HttpHandler {
        &self.base
    }

    pub async fn handle(&self, request: Request<Body>) -> DispatchResult {
        self.base.handle(request).await
    }
}

impl HasLogger for LoggingHttpHandler {
    fn get_logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }
}

impl std::fmt::Debug for LoggingHttpHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoggingHttpHandler")
            .field("base", &self.base)
            .finish_non_exhaustive()
    }
}
