use crate::config::HandlerConfig;
use crate::error::Result;
use crate::exception::Exception;
use crate::handler::{DispatchResult, Dispatcher, LoggingHttpHandler};
use crate::logger::{HasLogger, Level, LogContext, LogError, Logger};
use crate::renderer::{RendererChain, RendererRegistry, RequestInfo};
use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use futures_util::FutureExt;
use std::convert::Infallible;
use std::future::Future;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::Service;

/// Body served when the logger itself fails
pub const FALLBACK_BODY: &str = "There was an internal error";

/// The last-resort response: 500 with [`FALLBACK_BODY`]
pub fn fallback_response() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, FALLBACK_BODY).into_response()
}

/// A logging handler that never lets a dispatch failure escape.
///
/// Successful responses pass through untouched. A failed dispatch (returned
/// error or panic) is logged at [`Level::Error`] and rendered through the
/// configured [`RendererChain`] as a 500. If logging fails too, the
/// [`fallback_response`] is served instead.
///
/// # Example
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use meshestra_logging::prelude::*;
///
/// # fn build() -> meshestra_logging::Result<CatchingHttpHandler> {
/// let router = Router::new().route("/", get(|| async { "home" }));
/// let config = HandlerConfig::new().with_renderer("plain_text", vec![]);
///
/// CatchingHttpHandler::new(
///     Arc::new(TracingLogger),
///     "https://example.com/",
///     "/srv/app",
///     config,
///     ServiceDispatcher::new(router),
/// )
/// # }
/// ```
#[derive(Clone)]
pub struct CatchingHttpHandler {
    inner: LoggingHttpHandler,
    renderers: Arc<RendererChain>,
}

impl CatchingHttpHandler {
    /// Build with the default renderer kinds.
    pub fn new<D: Dispatcher>(
        logger: Arc<dyn Logger>,
        base_url: &str,
        base_path: impl AsRef<Path>,
        config: HandlerConfig,
        dispatcher: D,
    ) -> Result<Self> {
        Self::with_registry(
            logger,
            base_url,
            base_path,
            config,
            dispatcher,
            &RendererRegistry::default(),
        )
    }

    /// Build, resolving renderer kinds against `registry`.
    ///
    /// # Errors
    /// Any base handler error, then the first problem found in the
    /// error-renderer section. Nothing is built unless every entry is valid.
    pub fn with_registry<D: Dispatcher>(
        logger: Arc<dyn Logger>,
        base_url: &str,
        base_path: impl AsRef<Path>,
        mut config: HandlerConfig,
        dispatcher: D,
        registry: &RendererRegistry,
    ) -> Result<Self> {
        let section = HandlerConfig {
            error_renderers: config.error_renderers.take(),
            ..HandlerConfig::default()
        };
        let inner = LoggingHttpHandler::new(logger, base_url, base_path, config, dispatcher)?;
        let specs = section.renderer_specs(registry)?;
        let renderers = registry.instantiate(&specs)?;

        tracing::debug!("Catching handler ready with {} error renderer(s)", renderers.len());

        Ok(Self {
            inner,
            renderers: Arc::new(renderers),
        })
    }

    pub fn logger(&self) -> &Arc<dyn Logger> {
        self.inner.logger()
    }

    pub fn inner(&self) -> &LoggingHttpHandler {
        &self.inner
    }

    pub fn renderers(&self) -> &RendererChain {
        &self.renderers
    }

    /// Handle a request. Always produces a response.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let info = RequestInfo::from_request(&request);
        catch(
            self.inner.handle(request),
            self.inner.logger().as_ref(),
            &self.renderers,
            &info,
        )
        .await
    }
}

impl HasLogger for CatchingHttpHandler {
    fn get_logger(&self) -> &Arc<dyn Logger> {
        self.inner.logger()
    }
}

impl Service<Request<Body>> for CatchingHttpHandler {
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response, Infallible>> + Send>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.handle(request).await) })
    }
}

impl std::fmt::Debug for CatchingHttpHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatchingHttpHandler")
            .field("inner", &self.inner)
            .field("renderers", &self.renderers)
            .finish()
    }
}

/// Run `dispatch`, turning any failure into a response.
///
/// Dispatching -> Success, or Dispatching -> Failed -> Logging ->
/// (LogFailed -> fallback | LogOK -> rendered 500).
pub(crate) async fn catch<F>(
    dispatch: F,
    logger: &dyn Logger,
    renderers: &RendererChain,
    request: &RequestInfo,
) -> Response
where
    F: Future<Output = DispatchResult>,
{
    let exception = match AssertUnwindSafe(dispatch).catch_unwind().await {
        Ok(Ok(response)) => return response,
        Ok(Err(exception)) => exception,
        Err(payload) => Exception::from_panic(payload),
    };

    if let Err(error) = log_exception(logger, &exception) {
        // The dispatch failure is dropped along with the logger's error.
        tracing::warn!(%error, "Logger failed while reporting a dispatch failure");
        return fallback_response();
    }

    render(renderers, &exception, request)
}

fn render(renderers: &RendererChain, exception: &Exception, request: &RequestInfo) -> Response {
    panic::catch_unwind(AssertUnwindSafe(|| renderers.respond(exception, request))).unwrap_or_else(|payload| {
        let error = Exception::from_panic(payload);
        tracing::warn!(error = %error.message(), "Error renderer panicked while rendering a dispatch failure");
        fallback_response()
    })
}

fn log_exception(logger: &dyn Logger, exception: &Exception) -> std::result::Result<(), LogError> {
    let message = exception.to_string();
    let context = LogContext::new().with_exception(exception);

    panic::catch_unwind(AssertUnwindSafe(|| logger.log(Level::Error, &message, &context)))
        .unwrap_or_else(|payload| {
            Err(LogError::Panicked(
                Exception::from_panic(payload).message().to_string(),
            ))
        })
}
