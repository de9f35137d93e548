use crate::exception::{BoxError, Exception};
use crate::handler::{DispatchResult, Dispatcher};
use async_trait::async_trait;
use axum::{body::Body, http::Request, response::Response};
use std::future::Future;
use tower::{Service, ServiceExt};

/// Dispatches through any cloneable tower service, such as an `axum::Router`
#[derive(Clone)]
pub struct ServiceDispatcher<S> {
    service: S,
}

impl<S> ServiceDispatcher<S> {
    pub fn new(service: S) -> Self {
        Self { service }
    }
}

#[async_trait]
impl<S> Dispatcher for ServiceDispatcher<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + Sync + 'static,
    S::Future: Send + 'static,
    S::Error: Into<BoxError> + Send,
{
    async fn dispatch(&self, request: Request<Body>) -> DispatchResult {
        self.service
            .clone()
            .oneshot(request)
            .await
            .map_err(|error| Exception::from_boxed(error.into()))
    }
}

/// Dispatches through an async closure
#[derive(Clone)]
pub struct FnDispatcher<F> {
    f: F,
}

/// Wrap an async closure as a [`Dispatcher`]
///
/// ```rust
/// use axum::{body::Body, http::Request, response::IntoResponse};
/// use meshestra_logging::{Exception, handler::dispatcher_fn};
///
/// let dispatcher = dispatcher_fn(|request: Request<Body>| async move {
///     if request.uri().path() == "/" {
///         Ok("home".into_response())
///     } else {
///         Err(Exception::new("NotFound", "no route"))
///     }
/// });
/// ```
pub fn dispatcher_fn<F, Fut>(f: F) -> FnDispatcher<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DispatchResult> + Send + 'static,
{
    FnDispatcher { f }
}

#[async_trait]
impl<F, Fut> Dispatcher for FnDispatcher<F>
where
    F: Fn(Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = DispatchResult> + Send + 'static,
{
    async fn dispatch(&self, request: Request<Body>) -> DispatchResult {
        (self.f)(request).await
    }
}
