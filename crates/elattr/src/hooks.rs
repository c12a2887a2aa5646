//! Hook points where other code rewrites attributes during resolution.
//!
//! An [`AttributeSet`](crate::AttributeSet) calls into a [`Filters`]
//! implementation at four points, named by [`HookNames`]:
//!
//! | Hook                        | Value          | When                          |
//! |-----------------------------|----------------|-------------------------------|
//! | `{prefix}/{name}/defaults`  | [`AttrMap`]    | after element default rules   |
//! | `{prefix}`                  | [`AttrMap`]    | after merging input, any name |
//! | `{prefix}/{name}`           | [`AttrMap`]    | after the global hook         |
//! | `{prefix}/{name}/class`     | class list     | only when subscribed          |
//!
//! [`FilterRegistry`] is the in-process implementation; hosts with their own
//! dispatch can implement [`Filters`] directly.

use std::collections::HashMap;
use std::fmt;

use serde_json::{Map, Value};

use crate::value::AttrMap;

/// Callback rewriting an attribute map.
pub type AttrFilter = Box<dyn Fn(AttrMap, &FilterArgs<'_>) -> AttrMap + Send + Sync>;

/// Callback rewriting a class list.
pub type ClassFilter = Box<dyn Fn(Vec<String>, &FilterArgs<'_>) -> Vec<String> + Send + Sync>;

/// What a filter callback knows about the attribute set being resolved.
#[derive(Debug, Clone, Copy)]
pub struct FilterArgs<'a> {
    /// Element name (e.g. `body`, `sidebar`).
    pub name: &'a str,
    /// Element context (e.g. `primary`), empty when not given.
    pub context: &'a str,
    /// Auxiliary data added with `with()` before resolution.
    pub data: &'a Map<String, Value>,
}

impl FilterArgs<'_> {
    /// Look up an auxiliary data value.
    #[must_use]
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }
}

/// Hook dispatch consumed by attribute resolution.
pub trait Filters: Send + Sync {
    /// Whether any callback is subscribed to `hook`.
    fn has_filter(&self, hook: &str) -> bool;

    /// Run the attribute-map callbacks subscribed to `hook`.
    fn apply_attrs(&self, hook: &str, attrs: AttrMap, args: &FilterArgs<'_>) -> AttrMap;

    /// Run the class-list callbacks subscribed to `hook`.
    fn apply_classes(&self, hook: &str, classes: Vec<String>, args: &FilterArgs<'_>)
    -> Vec<String>;
}

/// Dispatch with no subscribers: every hook returns its value unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFilters;

impl Filters for NoFilters {
    fn has_filter(&self, _hook: &str) -> bool {
        false
    }

    fn apply_attrs(&self, _hook: &str, attrs: AttrMap, _args: &FilterArgs<'_>) -> AttrMap {
        attrs
    }

    fn apply_classes(
        &self,
        _hook: &str,
        classes: Vec<String>,
        _args: &FilterArgs<'_>,
    ) -> Vec<String> {
        classes
    }
}

struct Subscriber<F> {
    priority: i32,
    callback: F,
}

/// Insert keeping ascending priority; equal priorities run in registration order.
fn subscribe<F>(list: &mut Vec<Subscriber<F>>, priority: i32, callback: F) {
    let index = list.partition_point(|s| s.priority <= priority);
    list.insert(index, Subscriber { priority, callback });
}

/// In-process filter registry.
///
/// # Example
///
/// ```
/// use elattr::{AttrMap, FilterArgs, Filters, FilterRegistry};
/// use serde_json::Map;
///
/// let filters = FilterRegistry::new()
///     .with_filter("attr/sidebar", |mut attrs: AttrMap, _args: &FilterArgs<'_>| {
///         attrs.insert("role", "complementary");
///         attrs
///     });
///
/// let data = Map::new();
/// let args = FilterArgs { name: "sidebar", context: "", data: &data };
/// let attrs = filters.apply_attrs("attr/sidebar", AttrMap::new(), &args);
/// assert_eq!(attrs.get("role").map(ToString::to_string).as_deref(), Some("complementary"));
/// ```
#[derive(Default)]
pub struct FilterRegistry {
    attr_filters: HashMap<String, Vec<Subscriber<AttrFilter>>>,
    class_filters: HashMap<String, Vec<Subscriber<ClassFilter>>>,
}

impl FilterRegistry {
    /// Priority used by [`with_filter`](Self::with_filter) and
    /// [`with_class_filter`](Self::with_class_filter).
    pub const DEFAULT_PRIORITY: i32 = 10;

    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an attribute-map callback at the default priority.
    #[must_use]
    pub fn with_filter<F>(mut self, hook: impl Into<String>, callback: F) -> Self
    where
        F: Fn(AttrMap, &FilterArgs<'_>) -> AttrMap + Send + Sync + 'static,
    {
        self.add_filter(hook, Self::DEFAULT_PRIORITY, callback);
        self
    }

    /// Subscribe a class-list callback at the default priority.
    #[must_use]
    pub fn with_class_filter<F>(mut self, hook: impl Into<String>, callback: F) -> Self
    where
        F: Fn(Vec<String>, &FilterArgs<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        self.add_class_filter(hook, Self::DEFAULT_PRIORITY, callback);
        self
    }

    /// Subscribe an attribute-map callback. Lower priorities run first.
    pub fn add_filter<F>(&mut self, hook: impl Into<String>, priority: i32, callback: F)
    where
        F: Fn(AttrMap, &FilterArgs<'_>) -> AttrMap + Send + Sync + 'static,
    {
        let list = self.attr_filters.entry(hook.into()).or_default();
        subscribe(list, priority, Box::new(callback) as AttrFilter);
    }

    /// Subscribe a class-list callback. Lower priorities run first.
    pub fn add_class_filter<F>(&mut self, hook: impl Into<String>, priority: i32, callback: F)
    where
        F: Fn(Vec<String>, &FilterArgs<'_>) -> Vec<String> + Send + Sync + 'static,
    {
        let list = self.class_filters.entry(hook.into()).or_default();
        subscribe(list, priority, Box::new(callback) as ClassFilter);
    }

    /// Unsubscribe every callback from `hook`. Returns whether any existed.
    pub fn remove_all(&mut self, hook: &str) -> bool {
        let attrs = self.attr_filters.remove(hook).is_some();
        let classes = self.class_filters.remove(hook).is_some();
        attrs || classes
    }
}

impl Filters for FilterRegistry {
    fn has_filter(&self, hook: &str) -> bool {
        self.attr_filters.get(hook).is_some_and(|l| !l.is_empty())
            || self.class_filters.get(hook).is_some_and(|l| !l.is_empty())
    }

    fn apply_attrs(&self, hook: &str, attrs: AttrMap, args: &FilterArgs<'_>) -> AttrMap {
        let Some(subscribers) = self.attr_filters.get(hook) else {
            return attrs;
        };
        tracing::trace!(hook, count = subscribers.len(), "Applying attribute filters");
        subscribers
            .iter()
            .fold(attrs, |acc, s| (s.callback)(acc, args))
    }

    fn apply_classes(
        &self,
        hook: &str,
        classes: Vec<String>,
        args: &FilterArgs<'_>,
    ) -> Vec<String> {
        let Some(subscribers) = self.class_filters.get(hook) else {
            return classes;
        };
        tracing::trace!(hook, count = subscribers.len(), "Applying class filters");
        subscribers
            .iter()
            .fold(classes, |acc, s| (s.callback)(acc, args))
    }
}

impl fmt::Debug for FilterRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut attr_hooks: Vec<_> = self.attr_filters.keys().collect();
        attr_hooks.sort();
        let mut class_hooks: Vec<_> = self.class_filters.keys().collect();
        class_hooks.sort();
        f.debug_struct("FilterRegistry")
            .field("attr_hooks", &attr_hooks)
            .field("class_hooks", &class_hooks)
            .finish()
    }
}

/// Builds hook names from a configurable prefix.
///
/// # Example
///
/// ```
/// use elattr::HookNames;
///
/// let hooks = HookNames::new("theme/attr");
/// assert_eq!(hooks.defaults("body"), "theme/attr/body/defaults");
/// assert_eq!(hooks.global(), "theme/attr");
/// assert_eq!(hooks.element("body"), "theme/attr/body");
/// assert_eq!(hooks.class("body"), "theme/attr/body/class");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookNames {
    prefix: String,
}

impl Default for HookNames {
    fn default() -> Self {
        Self::new("attr")
    }
}

impl HookNames {
    /// Create hook names under `prefix`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Hook over an element's defaults.
    #[must_use]
    pub fn defaults(&self, name: &str) -> String {
        format!("{}/{name}/defaults", self.prefix)
    }

    /// Hook over every element's merged attributes.
    #[must_use]
    pub fn global(&self) -> &str {
        &self.prefix
    }

    /// Hook over one element's merged attributes.
    #[must_use]
    pub fn element(&self, name: &str) -> String {
        format!("{}/{name}", self.prefix)
    }

    /// Hook over one element's class list.
    #[must_use]
    pub fn class(&self, name: &str) -> String {
        format!("{}/{name}/class", self.prefix)
    }
}
