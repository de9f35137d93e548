use crate::exception::Exception;
use crate::renderer::{ErrorRenderer, RequestInfo, Rendition};

/// Renders `<Type>: <message> in file <file> on line <line>` as plain text
#[derive(Debug, Clone, Default)]
pub struct PlainTextRenderer {
    with_sources: bool,
}

impl PlainTextRenderer {
    /// Also print a `Caused by:` line per error in the source chain
    pub fn with_sources(mut self, with_sources: bool) -> Self {
        self.with_sources = with_sources;
        self
    }
}

impl ErrorRenderer for PlainTextRenderer {
    fn render(&self, exception: &Exception, _request: &RequestInfo) -> Rendition {
        let mut body = exception.to_string();
        if self.with_sources {
            for cause in exception.causes() {
                body.push_str("\nCaused by: ");
                body.push_str(&cause);
            }
        }
        body.push('\n');
        Rendition::text(body)
    }
}
