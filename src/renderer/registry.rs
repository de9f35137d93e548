use crate::config::RendererSpec;
use crate::error::{ConfigError, Result};
use crate::renderer::{ErrorRenderer, JsonRenderer, PlainTextRenderer, RendererChain};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// Builds a renderer from its configured argument list
pub type RendererFactory = Arc<dyn Fn(&[Value]) -> Result<Box<dyn ErrorRenderer>> + Send + Sync>;

/// Named renderer kinds available to configuration.
///
/// [`RendererRegistry::default`] knows the built-in `plain_text` and `json`
/// kinds; applications add their own with [`RendererRegistry::register`].
///
/// # Example
///
/// ```rust
/// use meshestra_logging::renderer::{RendererRegistry, Rendition};
///
/// struct Maintenance;
///
/// impl meshestra_logging::renderer::ErrorRenderer for Maintenance {
///     fn render(
///         &self,
///         _: &meshestra_logging::Exception,
///         _: &meshestra_logging::renderer::RequestInfo,
///     ) -> Rendition {
///         Rendition::text("Back soon").stop()
///     }
/// }
///
/// let mut registry = RendererRegistry::default();
/// registry.register("maintenance", |_args| Ok(Box::new(Maintenance)));
/// assert!(registry.contains("maintenance"));
/// ```
#[derive(Clone)]
pub struct RendererRegistry {
    factories: HashMap<String, RendererFactory>,
}

impl Default for RendererRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry
            .register("plain_text", |args| {
                let with_sources = single_flag("plain_text", args)?;
                Ok(Box::new(PlainTextRenderer::default().with_sources(with_sources)))
            })
            .register("json", |args| {
                let pretty = single_flag("json", args)?;
                Ok(Box::new(JsonRenderer::default().pretty(pretty)))
            });
        registry
    }
}

impl RendererRegistry {
    /// A registry with no kinds at all
    pub fn empty() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    pub fn register<F>(&mut self, kind: impl Into<String>, factory: F) -> &mut Self
    where
        F: Fn(&[Value]) -> Result<Box<dyn ErrorRenderer>> + Send + Sync + 'static,
    {
        self.factories.insert(kind.into(), Arc::new(factory));
        self
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.factories.contains_key(kind)
    }

    /// Instantiate one renderer per spec, preserving order.
    ///
    /// Fails on the first unknown kind or rejected argument list.
    pub fn instantiate(&self, specs: &[RendererSpec]) -> Result<RendererChain> {
        let renderers = specs
            .iter()
            .map(|spec| -> Result<Box<dyn ErrorRenderer>> {
                let factory =
                    self.factories
                        .get(&spec.kind)
                        .ok_or_else(|| ConfigError::UnknownRenderer {
                            kind: spec.kind.clone(),
                        })?;
                tracing::debug!("Instantiating error renderer: {}", spec.kind);
                factory(spec.arguments.as_slice())
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RendererChain::new(renderers))
    }
}

impl std::fmt::Debug for RendererRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut kinds: Vec<_> = self.factories.keys().collect();
        kinds.sort();
        f.debug_struct("RendererRegistry").field("kinds", &kinds).finish()
    }
}

/// Accepts `[]` (false) or `[bool]`.
fn single_flag(kind: &str, args: &[Value]) -> Result<bool> {
    match args {
        [] => Ok(false),
        [Value::Bool(flag)] => Ok(*flag),
        [other] => Err(ConfigError::invalid_arguments(
            kind,
            format!("expected a boolean, got {other}"),
        )),
        _ => Err(ConfigError::invalid_arguments(
            kind,
            format!("expected at most one argument, got {}", args.len()),
        )),
    }
}
