//! Error renderers
//!
//! When dispatch fails, the catching handler turns the captured [`Exception`]
//! into a 500 response by running it through a [`RendererChain`]. Chains are
//! assembled from named kinds held in a [`RendererRegistry`].

mod json;
mod plain_text;
mod registry;

use crate::exception::Exception;
use axum::{
    http::{HeaderMap, Method, Request, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};

pub use json::JsonRenderer;
pub use plain_text::PlainTextRenderer;
pub use registry::{RendererFactory, RendererRegistry};

/// Identifier of the renderer capability itself.
///
/// Configuration may not use it as a renderer kind.
pub const ERROR_RENDERER: &str = "ErrorRenderer";

/// The parts of a request that renderers may inspect.
///
/// Captured before dispatch, since dispatch consumes the request.
#[derive(Debug, Clone)]
pub struct RequestInfo {
    pub method: Method,
    pub uri: Uri,
    pub headers: HeaderMap,
}

impl RequestInfo {
    pub fn from_request<B>(request: &Request<B>) -> Self {
        Self {
            method: request.method().clone(),
            uri: request.uri().clone(),
            headers: request.headers().clone(),
        }
    }
}

/// Whether the chain continues after a renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Output of a single renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendition {
    pub body: String,
    pub content_type: &'static str,
    pub flow: Flow,
}

impl Rendition {
    pub fn new(body: impl Into<String>, content_type: &'static str) -> Self {
        Self {
            body: body.into(),
            content_type,
            flow: Flow::Continue,
        }
    }

    pub fn text(body: impl Into<String>) -> Self {
        Self::new(body, "text/plain; charset=utf-8")
    }

    pub fn json(body: impl Into<String>) -> Self {
        Self::new(body, "application/json")
    }

    /// Stop the chain after this rendition
    pub fn stop(mut self) -> Self {
        self.flow = Flow::Stop;
        self
    }
}

/// The ErrorRenderer trait
///
/// Renderers are built once from configuration and shared across requests,
/// so `render` takes `&self`.
pub trait ErrorRenderer: Send + Sync + 'static {
    fn render(&self, exception: &Exception, request: &RequestInfo) -> Rendition;
}

/// Combined output of a chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedPage {
    pub body: String,
    pub content_type: &'static str,
}

/// An ordered, immutable sequence of renderers
pub struct RendererChain {
    renderers: Vec<Box<dyn ErrorRenderer>>,
}

impl RendererChain {
    pub(crate) fn new(renderers: Vec<Box<dyn ErrorRenderer>>) -> Self {
        Self { renderers }
    }

    pub fn len(&self) -> usize {
        self.renderers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderers.is_empty()
    }

    /// Run every renderer in order until one asks to stop.
    ///
    /// Bodies are concatenated; the last renderer to run picks the content type.
    pub fn render(&self, exception: &Exception, request: &RequestInfo) -> RenderedPage {
        let mut page = RenderedPage {
            body: String::new(),
            content_type: "text/plain; charset=utf-8",
        };

        for renderer in &self.renderers {
            let rendition = renderer.render(exception, request);
            page.body.push_str(&rendition.body);
            page.content_type = rendition.content_type;
            if rendition.flow == Flow::Stop {
                break;
            }
        }

        page
    }

    /// Render into a 500 response
    pub fn respond(&self, exception: &Exception, request: &RequestInfo) -> Response {
        let page = self.render(exception, request);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            [(header::CONTENT_TYPE, page.content_type)],
            page.body,
        )
            .into_response()
    }
}

impl std::fmt::Debug for RendererChain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RendererChain")
            .field("len", &self.renderers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    struct Fixed(&'static str, Flow);

    impl ErrorRenderer for Fixed {
        fn render(&self, _exception: &Exception, _request: &RequestInfo) -> Rendition {
            Rendition {
                body: self.0.to_string(),
                content_type: "text/html",
                flow: self.1,
            }
        }
    }

    fn request_info() -> RequestInfo {
        let request = Request::get("/throws").body(Body::empty()).unwrap();
        RequestInfo::from_request(&request)
    }

    #[test]
    fn test_chain_concatenates_in_order() {
        let chain = RendererChain::new(vec![
            Box::new(Fixed("a", Flow::Continue)),
            Box::new(PlainTextRenderer::default()),
            Box::new(Fixed("c", Flow::Continue)),
        ]);
        let exception = Exception::new("RuntimeException", "foo");

        let page = chain.render(&exception, &request_info());
        assert!(page.body.starts_with("aRuntimeException: foo in file "));
        assert!(page.body.ends_with('c'));
        assert_eq!(page.content_type, "text/html");
    }

    #[test]
    fn test_chain_stops_early() {
        let chain = RendererChain::new(vec![
            Box::new(Fixed("first", Flow::Stop)),
            Box::new(Fixed("second", Flow::Continue)),
        ]);
        let exception = Exception::new("RuntimeException", "foo");

        let page = chain.render(&exception, &request_info());
        assert_eq!(page.body, "first");
    }

    #[test]
    fn test_respond_is_500() {
        let chain = RendererChain::new(vec![Box::new(JsonRenderer::default())]);
        let exception = Exception::new("RuntimeException", "foo");

        let response = chain.respond(&exception, &request_info());
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            response.headers()[header::CONTENT_TYPE],
            "application/json"
        );
    }
}
