//! Value sources for `|name|` elements.
//!
//! A dynamic element names a value that is looked up while parsing. The
//! name is matched (case-insensitively) against the configured sources; a
//! name with no configuration falls back to the environment variable of the
//! same name.
//!
//! ```rust
//! use xferlang::{DynamicSourceRegistry, SourceConfig};
//!
//! let mut sources = DynamicSourceRegistry::new();
//! sources.configure("greeting", SourceConfig::new("const", "hello"));
//! assert_eq!(sources.resolve("GREETING").as_deref(), Some("hello"));
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

/// Resolves keys for one source type (`const`, `env`, `file`, ...).
pub trait DynamicSourceHandler: Send + Sync {
    /// The source type name this handler serves.
    fn source_type(&self) -> &str;

    /// Produces the value for `key` given the configured `source_value`.
    fn resolve(&self, source_value: &str, key: &str) -> Option<String>;
}

/// Where a dynamic name gets its value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceConfig {
    pub source_type: String,
    pub value: String,
}

impl SourceConfig {
    pub fn new(source_type: impl Into<String>, value: impl Into<String>) -> Self {
        SourceConfig {
            source_type: source_type.into(),
            value: value.into(),
        }
    }

    /// A literal value.
    pub fn constant(value: impl Into<String>) -> Self {
        SourceConfig::new("const", value)
    }
}

struct ConstHandler;

impl DynamicSourceHandler for ConstHandler {
    fn source_type(&self) -> &str {
        "const"
    }

    fn resolve(&self, source_value: &str, _key: &str) -> Option<String> {
        Some(source_value.to_string())
    }
}

struct EnvHandler;

impl DynamicSourceHandler for EnvHandler {
    fn source_type(&self) -> &str {
        "env"
    }

    fn resolve(&self, source_value: &str, key: &str) -> Option<String> {
        let variable = if source_value.is_empty() { key } else { source_value };
        std::env::var(variable).ok()
    }
}

struct FileHandler;

impl DynamicSourceHandler for FileHandler {
    fn source_type(&self) -> &str {
        "file"
    }

    fn resolve(&self, source_value: &str, _key: &str) -> Option<String> {
        match std::fs::read_to_string(source_value) {
            Ok(contents) => Some(contents),
            Err(err) => {
                debug!(path = source_value, error = %err, "dynamic file source unreadable");
                None
            }
        }
    }
}

/// Source handlers plus the per-name configuration.
#[derive(Clone, Default)]
pub struct DynamicSourceRegistry {
    handlers: HashMap<String, Arc<dyn DynamicSourceHandler>>,
    configurations: HashMap<String, SourceConfig>,
}

impl fmt::Debug for DynamicSourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut handlers: Vec<_> = self.handlers.keys().collect();
        handlers.sort();
        f.debug_struct("DynamicSourceRegistry")
            .field("handlers", &handlers)
            .field("configurations", &self.configurations)
            .finish()
    }
}

impl DynamicSourceRegistry {
    /// A registry with the `const`, `env` and `file` handlers.
    pub fn new() -> Self {
        let mut registry = DynamicSourceRegistry::empty();
        registry.register(ConstHandler);
        registry.register(EnvHandler);
        registry.register(FileHandler);
        registry
    }

    /// A registry with no handlers; only the environment fallback applies.
    pub fn empty() -> Self {
        DynamicSourceRegistry::default()
    }

    /// Adds a handler, replacing any handler of the same source type.
    pub fn register<H: DynamicSourceHandler + 'static>(&mut self, handler: H) {
        let name = handler.source_type().to_ascii_lowercase();
        self.handlers.insert(name, Arc::new(handler));
    }

    /// Removes a handler; returns whether one was registered.
    pub fn unregister(&mut self, source_type: &str) -> bool {
        self.handlers
            .remove(&source_type.to_ascii_lowercase())
            .is_some()
    }

    pub fn has_handler(&self, source_type: &str) -> bool {
        self.handlers
            .contains_key(&source_type.to_ascii_lowercase())
    }

    /// Replaces the whole configuration table.
    pub fn set_configurations<I, S>(&mut self, configurations: I)
    where
        I: IntoIterator<Item = (S, SourceConfig)>,
        S: AsRef<str>,
    {
        self.configurations.clear();
        for (name, config) in configurations {
            self.configure(name.as_ref(), config);
        }
    }

    pub fn configure(&mut self, name: &str, config: SourceConfig) {
        self.configurations.insert(name.to_ascii_lowercase(), config);
    }

    pub fn configuration(&self, name: &str) -> Option<&SourceConfig> {
        self.configurations.get(&name.to_ascii_lowercase())
    }

    /// Looks up the value for `name`.
    pub fn resolve(&self, name: &str) -> Option<String> {
        let Some(config) = self.configuration(name) else {
            return std::env::var(name).ok();
        };
        match self.handlers.get(&config.source_type.to_ascii_lowercase()) {
            Some(handler) => handler.resolve(&config.value, name),
            None => {
                warn!(
                    name,
                    source_type = config.source_type.as_str(),
                    "no handler for dynamic source type"
                );
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Upper;

    impl DynamicSourceHandler for Upper {
        fn source_type(&self) -> &str {
            "upper"
        }

        fn resolve(&self, source_value: &str, _key: &str) -> Option<String> {
            Some(source_value.to_uppercase())
        }
    }

    #[test]
    fn test_const_and_custom_handlers() {
        let mut sources = DynamicSourceRegistry::new();
        sources.configure("a", SourceConfig::constant("one"));
        sources.configure("b", SourceConfig::new("UPPER", "shout"));
        assert_eq!(sources.resolve("A").as_deref(), Some("one"));
        assert_eq!(sources.resolve("b"), None);

        sources.register(Upper);
        assert_eq!(sources.resolve("b").as_deref(), Some("SHOUT"));
        assert!(sources.unregister("upper"));
        assert!(!sources.unregister("upper"));
    }

    #[test]
    fn test_env_fallback() {
        std::env::set_var("XFERLANG_DYNAMIC_TEST", "from-env");
        let sources = DynamicSourceRegistry::empty();
        assert_eq!(
            sources.resolve("XFERLANG_DYNAMIC_TEST").as_deref(),
            Some("from-env")
        );
        assert_eq!(sources.resolve("XFERLANG_DYNAMIC_MISSING_VAR"), None);
    }

    #[test]
    fn test_env_handler_reads_named_variable() {
        std::env::set_var("XFERLANG_DYNAMIC_ENV_TARGET", "target");
        let mut sources = DynamicSourceRegistry::new();
        sources.configure("alias", SourceConfig::new("env", "XFERLANG_DYNAMIC_ENV_TARGET"));
        assert_eq!(sources.resolve("alias").as_deref(), Some("target"));
    }

    #[test]
    fn test_set_configurations_replaces() {
        let mut sources = DynamicSourceRegistry::new();
        sources.configure("old", SourceConfig::constant("x"));
        sources.set_configurations(vec![("new", SourceConfig::constant("y"))]);
        assert!(sources.configuration("old").is_none());
        assert_eq!(sources.resolve("NEW").as_deref(), Some("y"));
    }
}
