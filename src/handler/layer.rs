use crate::config::HandlerConfig;
use crate::error::Result;
use crate::exception::{BoxError, Exception};
use crate::handler::catching::catch;
use crate::logger::Logger;
use crate::renderer::{RendererChain, RendererRegistry, RequestInfo};
use axum::{body::Body, http::Request, response::Response};
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tower::{Layer, Service, ServiceExt};

/// Tower Layer that puts the catching failure boundary around any service
///
/// ```rust,no_run
/// use axum::{Router, routing::get};
/// use meshestra_logging::prelude::*;
///
/// # fn build() -> meshestra_logging::Result<()> {
/// let config = HandlerConfig::new().with_renderer("json", vec![]);
/// let layer = CatchingLayer::new(Arc::new(TracingLogger), config)?;
///
/// let app: Router = Router::new()
///     .route("/", get(|| async { "home" }))
///     .layer(layer);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct CatchingLayer {
    logger: Arc<dyn Logger>,
    renderers: Arc<RendererChain>,
}

impl CatchingLayer {
    /// Build the renderer chain from `config` using the default renderer kinds.
    pub fn new(logger: Arc<dyn Logger>, config: HandlerConfig) -> Result<Self> {
        Self::with_registry(logger, config, &RendererRegistry::default())
    }

    pub fn with_registry(
        logger: Arc<dyn Logger>,
        config: HandlerConfig,
        registry: &RendererRegistry,
    ) -> Result<Self> {
        let specs = config.renderer_specs(registry)?;
        let renderers = registry.instantiate(&specs)?;
        Ok(Self {
            logger,
            renderers: Arc::new(renderers),
        })
    }
}

impl<S> Layer<S> for CatchingLayer {
    type Service = CatchingService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        CatchingService {
            inner,
            logger: self.logger.clone(),
            renderers: self.renderers.clone(),
        }
    }
}

#[derive(Clone)]
pub struct CatchingService<S> {
    inner: S,
    logger: Arc<dyn Logger>,
    renderers: Arc<RendererChain>,
}

impl<S> Service<Request<Body>> for CatchingService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    type Response = Response;
    type Error = Infallible;
    type Future = Pin<Box<dyn Future<Output = std::result::Result<Response, Infallible>> + Send>>;

    // Readiness errors surface from `oneshot` in `call`, where they can be rendered.
    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<std::result::Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let info = RequestInfo::from_request(&request);
        let inner = self.inner.clone();
        let logger = self.logger.clone();
        let renderers = self.renderers.clone();

        Box::pin(async move {
            let dispatch = async move {
                inner
                    .oneshot(request)
                    .await
                    .map_err(|error| Exception::from_boxed(error.into()))
            };
            Ok(catch(dispatch, logger.as_ref(), &renderers, &info).await)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::FALLBACK_BODY;
    use crate::logger::{Level, LogContext, LogError, NullLogger};
    use axum::{Router, http::StatusCode, routing::get};

    struct BrokenLogger;

    impl Logger for BrokenLogger {
        fn log(&self, _level: Level, _message: &str, _context: &LogContext<'_>) -> std::result::Result<(), LogError> {
            Err(LogError::Unavailable("disk full".to_string()))
        }
    }

    async fn explode() -> &'static str {
        panic!("handler exploded")
    }

    fn router(logger: Arc<dyn Logger>) -> Router {
        let config = HandlerConfig::new().with_renderer("plain_text", vec![]);
        Router::new()
            .route("/", get(|| async { "home" }))
            .route("/panics", get(explode))
            .layer(CatchingLayer::new(logger, config).unwrap())
    }

    async fn body_string(response: Response) -> String {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        String::from_utf8(bytes.to_vec()).unwrap()
    }

    #[tokio::test]
    async fn test_layer_on_router() {
        let app = router(Arc::new(NullLogger));

        let response = app
            .clone()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_string(response).await, "home");

        let response = app
            .oneshot(Request::get("/panics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.starts_with("Panic: handler exploded"));
    }

    #[tokio::test]
    async fn test_layer_fallback_on_logger_failure() {
        let app = router(Arc::new(BrokenLogger));

        let response = app
            .oneshot(Request::get("/panics").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_string(response).await, FALLBACK_BODY);
    }

    #[tokio::test]
    async fn test_service_errors_are_rendered() {
        let service = tower::service_fn(|_request: Request<Body>| async {
            Err::<Response, _>(std::io::Error::other("upstream reset"))
        });
        let layer = CatchingLayer::new(
            Arc::new(NullLogger),
            HandlerConfig::new().with_renderer("plain_text", vec![]),
        )
        .unwrap();

        let response = layer
            .layer(service)
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body_string(response).await.starts_with("Error: upstream reset in file "));
    }

    #[test]
    fn test_layer_validates_config() {
        let err = CatchingLayer::new(Arc::new(NullLogger), HandlerConfig::new()).err().unwrap();
        assert_eq!(err.to_string(), "Handlers are not configured");
    }
}
