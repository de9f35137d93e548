use crate::exception::Exception;
use crate::renderer::{ErrorRenderer, RequestInfo, Rendition};
use serde_json::json;

/// Renders the failure as a JSON document under an `"error"` key
#[derive(Debug, Clone, Default)]
pub struct JsonRenderer {
    pretty: bool,
}

impl JsonRenderer {
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }
}

impl ErrorRenderer for JsonRenderer {
    fn render(&self, exception: &Exception, request: &RequestInfo) -> Rendition {
        let document = json!({
            "error": {
                "type": exception.kind(),
                "message": exception.message(),
                "file": exception.file(),
                "line": exception.line(),
                "request": {
                    "method": request.method.as_str(),
                    "uri": request.uri.to_string(),
                },
            }
        });

        let body = if self.pretty {
            serde_json::to_string_pretty(&document).unwrap_or_else(|_| document.to_string())
        } else {
            document.to_string()
        };
        Rendition::json(body)
    }
}
