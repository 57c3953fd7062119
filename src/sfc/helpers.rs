//! Shared helper functions available to every component template.
//!
//! Helpers are Tera filters. The registry is built once, handed to the
//! renderer at construction and registered on the fresh `Tera` instance of
//! every render; templates never see helpers added after that point.

use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tera::Tera;

/// Signature of a helper filter.
pub type HelperFn =
    Arc<dyn Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync>;

/// Immutable set of named helper filters.
///
/// ```rust,no_run
/// use stylegraph::sfc::HelperRegistry;
/// use serde_json::Value;
///
/// let helpers = HelperRegistry::new().with_filter("shout", |value, _args| {
///     Ok(Value::String(format!("{}!", value.as_str().unwrap_or_default())))
/// });
/// assert!(helpers.contains("shout"));
/// ```
#[derive(Clone, Default)]
pub struct HelperRegistry {
    filters: BTreeMap<String, HelperFn>,
}

impl HelperRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a filter, replacing any filter of the same name.
    #[must_use]
    pub fn with_filter<F>(mut self, name: impl Into<String>, filter: F) -> Self
    where
        F: Fn(&Value, &HashMap<String, Value>) -> tera::Result<Value> + Send + Sync + 'static,
    {
        self.filters.insert(name.into(), Arc::new(filter));
        self
    }

    /// Add the helpers every project gets.
    ///
    /// - `url_slug` turns a page URL into a slug (`/blog/post/` becomes `blog-post`)
    /// - `json` serializes any value to compact JSON
    #[must_use]
    pub fn with_defaults(self) -> Self {
        self.with_filter("url_slug", |value, _args| {
            let url = value
                .as_str()
                .ok_or_else(|| tera::Error::msg("url_slug filter requires a string"))?;
            let slug = url.split('/').filter(|part| !part.is_empty()).collect::<Vec<_>>().join("-");
            Ok(Value::String(slug))
        })
        .with_filter("json", |value, _args| {
            serde_json::to_string(value)
                .map(Value::String)
                .map_err(|e| tera::Error::msg(format!("json filter error: {e}")))
        })
    }

    /// Whether a filter named `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.filters.contains_key(name)
    }

    /// Registered filter names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.filters.keys().map(String::as_str)
    }

    /// Register every helper on `tera`.
    pub(crate) fn register(&self, tera: &mut Tera) {
        for (name, filter) in &self.filters {
            let filter = Arc::clone(filter);
            tera.register_filter(name, move |value: &Value, args: &HashMap<String, Value>| {
                filter(value, args)
            });
        }
    }
}

impl fmt::Debug for HelperRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HelperRegistry").field("filters", &self.names().collect::<Vec<_>>()).finish()
    }
}
