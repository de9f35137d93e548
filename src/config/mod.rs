//! Handler configuration
//!
//! [`HandlerConfig`] carries the error-renderer section in a named field and
//! everything else as opaque settings for the base handler. The renderer
//! section stays a loosely-typed document until construction, where
//! [`HandlerConfig::renderer_specs`] validates it into [`RendererSpec`]s.
//!
//! The section may be a table of `kind = [arguments...]` (document order is
//! kept) or a sequence of `[kind, [arguments...]]` pairs:
//!
//! ```toml
//! app_name = "blog"
//!
//! [error_renderers]
//! plain_text = []
//! json = [true]
//! ```

use crate::error::{ConfigError, Result};
use crate::renderer::{ERROR_RENDERER, RendererRegistry};
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::path::Path;

/// A validated renderer entry: which kind to build and with what arguments
#[derive(Debug, Clone, PartialEq)]
pub struct RendererSpec {
    pub kind: String,
    pub arguments: Vec<Value>,
}

/// Configuration consumed once when a handler is constructed
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HandlerConfig {
    /// Raw error-renderer section, validated at construction
    #[serde(default)]
    pub error_renderers: Option<Value>,

    /// Everything else, passed through to the base handler untouched
    #[serde(flatten)]
    pub settings: Map<String, Value>,
}

impl HandlerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from a file; `.json` files are parsed as JSON,
    /// anything else as TOML.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    pub fn from_json_str(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Append a renderer entry to the section.
    pub fn with_renderer(mut self, kind: impl Into<String>, arguments: Vec<Value>) -> Self {
        let kind = kind.into();
        match &mut self.error_renderers {
            Some(Value::Array(entries)) => entries.push(json!([kind, arguments])),
            Some(Value::Object(table)) => {
                table.insert(kind, Value::Array(arguments));
            }
            section => *section = Some(json!([[kind, arguments]])),
        }
        self
    }

    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.insert(key.into(), value.into());
        self
    }

    pub fn setting(&self, key: &str) -> Option<&Value> {
        self.settings.get(key)
    }

    /// Validate the error-renderer section against the kinds in `registry`.
    ///
    /// Shape problems are reported before any entry is looked at; entries
    /// are then checked one at a time, in order.
    pub fn renderer_specs(&self, registry: &RendererRegistry) -> Result<Vec<RendererSpec>> {
        let section = match &self.error_renderers {
            None | Some(Value::Null) => return Err(ConfigError::HandlersNotConfigured),
            Some(section) => section,
        };

        let entries: Vec<(Option<&str>, Option<&Value>)> = match section {
            Value::Object(table) => table
                .iter()
                .map(|(kind, arguments)| (Some(kind.as_str()), Some(arguments)))
                .collect(),
            Value::Array(pairs) => pairs.iter().map(pair_entry).collect(),
            _ => return Err(ConfigError::HandlersNotArray),
        };

        if entries.is_empty() {
            return Err(ConfigError::NoHandlers);
        }

        entries
            .into_iter()
            .map(|(kind, arguments)| -> Result<RendererSpec> {
                let kind = kind.ok_or(ConfigError::KeyNotString)?;

                if kind != ERROR_RENDERER && !registry.contains(kind) {
                    return Err(ConfigError::UnknownRenderer {
                        kind: kind.to_string(),
                    });
                }
                if kind == ERROR_RENDERER {
                    return Err(ConfigError::InterfaceNotImplementation);
                }

                match arguments {
                    Some(Value::Array(arguments)) => Ok(RendererSpec {
                        kind: kind.to_string(),
                        arguments: arguments.clone(),
                    }),
                    _ => Err(ConfigError::ArgumentsNotArray {
                        kind: kind.to_string(),
                    }),
                }
            })
            .collect()
    }
}

/// `[kind, arguments]` -> (kind, arguments). Anything not led by a string
/// kind has no usable key.
fn pair_entry(entry: &Value) -> (Option<&str>, Option<&Value>) {
    match entry.as_array().map(Vec::as_slice) {
        Some([Value::String(kind), arguments]) => (Some(kind.as_str()), Some(arguments)),
        Some([Value::String(kind), ..]) => (Some(kind.as_str()), None),
        _ => (None, None),
    }
}
