//! Filterable HTML attribute sets.
//!
//! This crate builds the attribute string of an HTML element from three
//! sources: caller input, computed defaults, and hooks registered by other
//! code. It works for any element; `html`, `body`, `post`/`entry` and
//! `comment` get extra defaults from the host's [`SiteContext`].
//!
//! # Architecture
//!
//! - [`AttributeSet`]: resolves, caches and renders one element's attributes
//! - [`Filters`]: hook dispatch, with [`FilterRegistry`] as the in-process
//!   implementation
//! - [`SiteContext`]: site and content services, with [`StaticSite`] as the
//!   in-memory implementation
//! - [`Registry`]: binds the [`Attributes`] capability to a factory
//! - [`attr`], [`render`], [`display`]: template shorthand over a registry
//!
//! # Example
//!
//! ```
//! use elattr::{AttrMap, FilterArgs, FilterRegistry, Host, Registry, StaticSite, render};
//!
//! let filters = FilterRegistry::new()
//!     .with_filter("attr/nav", |mut attrs: AttrMap, _: &FilterArgs<'_>| {
//!         attrs.insert("role", "navigation");
//!         attrs
//!     })
//!     .with_class_filter("attr/nav/class", |mut classes: Vec<String>, _: &FilterArgs<'_>| {
//!         classes.push("is-sticky".to_owned());
//!         classes
//!     });
//! let registry = Registry::new(Host::new(filters, StaticSite::new()));
//!
//! let input: AttrMap = [("id", "site-nav")].into_iter().collect();
//! assert_eq!(
//!     render(&registry, "nav", "primary", input),
//!     r#"class="nav nav--primary is-sticky" id="site-nav" role="navigation""#
//! );
//! ```

mod attribute_set;
pub mod escape;
mod helpers;
mod hooks;
mod host;
pub mod language;
mod registry;
mod rules;
mod site;
mod value;

pub use attribute_set::{AttributeSet, Attributes};
pub use helpers::{attr, display, render};
pub use hooks::{AttrFilter, ClassFilter, FilterArgs, FilterRegistry, Filters, HookNames, NoFilters};
pub use host::Host;
pub use registry::{AttributesFactory, DefaultFactory, Registry};
pub use rules::ElementRule;
pub use site::{Post, SiteContext, StaticSite};
pub use value::{AttrMap, AttrValue};

// Re-export configuration types for convenience
pub use elattr_config::{Config, ConfigError, TextDirection};
