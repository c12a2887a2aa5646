//! Shorthand for resolving, rendering and writing attributes in templates.

use std::io;

use crate::attribute_set::Attributes;
use crate::registry::Registry;
use crate::value::AttrMap;

/// Resolve an attribute set for `name` in `context` through `registry`.
///
/// The instance is not resolved yet; add data with `with` before rendering.
pub fn attr(registry: &Registry, name: &str, context: &str, input: AttrMap) -> Box<dyn Attributes> {
    registry.resolve(name, context, input)
}

/// Render the attribute string for `name` in `context`.
///
/// # Example
///
/// ```
/// use elattr::{AttrMap, Host, Registry, render};
///
/// let registry = Registry::new(Host::default());
/// let input: AttrMap = [("hidden", false)].into_iter().collect();
/// assert_eq!(render(&registry, "panel", "", input), r#"class="panel" hidden"#);
/// ```
pub fn render(registry: &Registry, name: &str, context: &str, input: AttrMap) -> String {
    attr(registry, name, context, input).render()
}

/// Write the attribute string for `name` in `context` to `out`.
pub fn display<W: io::Write>(
    registry: &Registry,
    out: &mut W,
    name: &str,
    context: &str,
    input: AttrMap,
) -> io::Result<()> {
    attr(registry, name, context, input).display(out)
}
