//! Attribute sets: merge, filter and render the attributes of one element.
//!
//! # Resolution
//!
//! The first call to [`AttributeSet::all`] (directly or through `get`,
//! `render` or `display`) computes the final attributes:
//!
//! 1. The default class is the input `class` if given (it is taken out of the
//!    input), otherwise `{name}` or `{name} {name}--{context}`.
//! 2. The element rule for `name`, if any, rewrites the defaults.
//! 3. The `{prefix}/{name}/defaults` hook rewrites the defaults.
//! 4. The input is merged over the defaults, input winning.
//! 5. The `{prefix}` hook and then the `{prefix}/{name}` hook rewrite the
//!    merged attributes.
//! 6. If there is a class and `{prefix}/{name}/class` has subscribers, the
//!    class is split on spaces, filtered, deduplicated and joined again.
//!
//! The result is cached for the lifetime of the instance. Data added with
//! `with` after that point is kept but never consulted.

use std::borrow::Cow;
use std::cell::OnceCell;
use std::fmt;
use std::io;
use std::sync::Arc;

use serde_json::{Map, Value};

use crate::escape::{escape_attr, escape_html, escape_url};
use crate::hooks::FilterArgs;
use crate::host::Host;
use crate::rules::ElementRule;
use crate::value::{AttrMap, AttrValue, dedup_classes};

/// The attributes capability: what helpers and factories hand out.
///
/// [`AttributeSet`] is the standard implementation; a
/// [`Registry`](crate::Registry) can be bound to produce another.
pub trait Attributes: fmt::Display {
    /// Resolved, unescaped attributes.
    fn all(&self) -> &AttrMap;

    /// A single resolved, unescaped value, or `""` when absent.
    fn get(&self, name: &str) -> Cow<'_, str>;

    /// Add an auxiliary data value for default rules and hooks.
    fn with(&mut self, key: &str, value: Value) -> &mut dyn Attributes;

    /// Add auxiliary data values; later values win on conflicting keys.
    fn with_map(&mut self, data: Map<String, Value>) -> &mut dyn Attributes;

    /// Escaped attribute string for use inside an HTML tag.
    fn render(&self) -> String;

    /// Write the escaped attribute string to `out`.
    fn display(&self, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(self.render().as_bytes())
    }
}

/// Attributes for one element, resolved once and rendered on demand.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use elattr::{AttrMap, AttributeSet, Host};
///
/// let host = Arc::new(Host::default());
/// let input: AttrMap = [("id", "menu-primary")].into_iter().collect();
/// let set = AttributeSet::new(host, "menu", "primary", input);
///
/// assert_eq!(set.render(), r#"class="menu menu--primary" id="menu-primary""#);
/// ```
#[derive(Debug)]
pub struct AttributeSet {
    host: Arc<Host>,
    name: String,
    context: String,
    input: AttrMap,
    data: Map<String, Value>,
    resolved: OnceCell<AttrMap>,
}

impl AttributeSet {
    /// Create an attribute set for element `name` in `context` (may be empty).
    #[must_use]
    pub fn new(
        host: Arc<Host>,
        name: impl Into<String>,
        context: impl Into<String>,
        input: AttrMap,
    ) -> Self {
        Self {
            host,
            name: name.into(),
            context: context.into(),
            input,
            data: Map::new(),
            resolved: OnceCell::new(),
        }
    }

    /// Element name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element context, empty when not given.
    pub fn context(&self) -> &str {
        &self.context
    }

    /// Look up an auxiliary data value.
    pub fn data(&self, key: &str) -> Option<&Value> {
        self.data.get(key)
    }

    /// Add an auxiliary data value.
    pub fn with(&mut self, key: impl Into<String>, value: impl Into<Value>) -> &mut Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Add auxiliary data values; later values win on conflicting keys.
    pub fn with_map(&mut self, data: Map<String, Value>) -> &mut Self {
        self.data.extend(data);
        self
    }

    /// Resolved, unescaped attributes.
    pub fn all(&self) -> &AttrMap {
        self.resolved.get_or_init(|| self.resolve())
    }

    /// A single resolved, unescaped value, or `""` when absent.
    pub fn get(&self, name: &str) -> Cow<'_, str> {
        self.all()
            .get(name)
            .map_or(Cow::Borrowed(""), AttrValue::as_text)
    }

    /// Escaped attribute string.
    ///
    /// `href` values are URL-escaped, other values attribute-escaped, and
    /// `false` values become bare attribute names.
    pub fn render(&self) -> String {
        let mut html = String::new();

        for (name, value) in self.all().iter() {
            if value.is_bare() {
                html.push_str(&escape_html(&format!(" {name}")));
                continue;
            }

            let escaped = if name == "href" {
                escape_url(&value.as_text(), self.host.url_protocols())
            } else {
                escape_attr(&value.as_text())
            };
            html.push(' ');
            html.push_str(&escape_html(name));
            html.push_str("=\"");
            html.push_str(&escaped);
            html.push('"');
        }

        html.trim().to_owned()
    }

    /// Write the escaped attribute string to `out`.
    pub fn display(&self, out: &mut dyn io::Write) -> io::Result<()> {
        out.write_all(self.render().as_bytes())
    }

    fn resolve(&self) -> AttrMap {
        let filters = self.host.filters();
        let hooks = self.host.hooks();
        let args = FilterArgs {
            name: &self.name,
            context: &self.context,
            data: &self.data,
        };

        let mut input = self.input.clone();
        let mut defaults = AttrMap::new();
        if let Some(class) = input.remove("class") {
            defaults.insert("class", class);
        } else if self.context.is_empty() {
            defaults.insert("class", self.name.clone());
        } else {
            defaults.insert("class", format!("{0} {0}--{1}", self.name, self.context));
        }

        if let Some(rule) = ElementRule::for_name(&self.name) {
            defaults = rule.apply(defaults, self.host.site(), &self.data);
        }

        let defaults = filters.apply_attrs(&hooks.defaults(&self.name), defaults, &args);

        let mut attrs = input.merge_over(defaults);
        attrs = filters.apply_attrs(hooks.global(), attrs, &args);
        attrs = filters.apply_attrs(&hooks.element(&self.name), attrs, &args);

        let class_hook = hooks.class(&self.name);
        if filters.has_filter(&class_hook)
            && let Some(class) = attrs.get("class")
        {
            let classes = class.as_text().split(' ').map(str::to_owned).collect();
            let classes = dedup_classes(filters.apply_classes(&class_hook, classes, &args));
            attrs.insert("class", classes.join(" "));
        }

        tracing::debug!(
            name = %self.name,
            context = %self.context,
            count = attrs.len(),
            "Resolved attributes"
        );
        attrs
    }
}

impl fmt::Display for AttributeSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.render())
    }
}

impl Attributes for AttributeSet {
    fn all(&self) -> &AttrMap {
        AttributeSet::all(self)
    }

    fn get(&self, name: &str) -> Cow<'_, str> {
        AttributeSet::get(self, name)
    }

    fn with(&mut self, key: &str, value: Value) -> &mut dyn Attributes {
        AttributeSet::with(self, key, value)
    }

    fn with_map(&mut self, data: Map<String, Value>) -> &mut dyn Attributes {
        AttributeSet::with_map(self, data)
    }

    fn render(&self) -> String {
        AttributeSet::render(self)
    }

    fn display(&self, out: &mut dyn io::Write) -> io::Result<()> {
        AttributeSet::display(self, out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hooks::FilterRegistry;
    use crate::site::{Post, StaticSite};
    use elattr_config::TextDirection;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn host_with(filters: FilterRegistry, site: StaticSite) -> Arc<Host> {
        Arc::new(Host::new(filters, site))
    }

    fn plain_host() -> Arc<Host> {
        host_with(FilterRegistry::new(), StaticSite::new())
    }

    fn input<const N: usize>(pairs: [(&str, AttrValue); N]) -> AttrMap {
        pairs.into_iter().collect()
    }

    fn text_pairs(attrs: &AttrMap) -> Vec<(String, String)> {
        attrs
            .iter()
            .map(|(k, v)| (k.to_owned(), v.to_string()))
            .collect()
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_owned(), value.to_owned())
    }

    #[test]
    fn test_default_class_is_name() {
        let set = AttributeSet::new(plain_host(), "sidebar", "", AttrMap::new());
        assert_eq!(text_pairs(set.all()), vec![pair("class", "sidebar")]);
    }

    #[test]
    fn test_default_class_with_context() {
        let set = AttributeSet::new(plain_host(), "sidebar", "primary", AttrMap::new());
        assert_eq!(set.get("class"), "sidebar sidebar--primary");
    }

    #[test]
    fn test_input_class_wins() {
        let input = input([("class", "foo".into())]);
        let set = AttributeSet::new(plain_host(), "sidebar", "primary", input);
        assert_eq!(text_pairs(set.all()), vec![pair("class", "foo")]);
    }

    #[test]
    fn test_input_merged_after_defaults() {
        let input = input([("id", "main".into()), ("role", "main".into())]);
        let set = AttributeSet::new(plain_host(), "content", "", input);
        assert_eq!(
            text_pairs(set.all()),
            vec![pair("class", "content"), pair("id", "main"), pair("role", "main")]
        );
    }

    #[test]
    fn test_empty_name_accepted() {
        let set = AttributeSet::new(plain_host(), "", "", AttrMap::new());
        assert_eq!(set.render(), r#"class="""#);
    }

    #[test]
    fn test_all_is_cached() {
        let site = StaticSite::new().with_post(Post::new(5, "post"));
        let mut set = AttributeSet::new(host_with(FilterRegistry::new(), site), "post", "", AttrMap::new());

        let first = set.all().clone();
        set.with("post", 5);

        assert_eq!(set.all(), &first);
        assert_eq!(set.get("id"), "post-0");
        assert_eq!(set.data("post"), Some(&json!(5)));
    }

    #[test]
    fn test_with_before_resolution_is_used() {
        let site = StaticSite::new().with_post(Post::new(5, "post"));
        let mut set = AttributeSet::new(host_with(FilterRegistry::new(), site), "post", "", AttrMap::new());

        set.with("post", 5);

        assert_eq!(set.get("id"), "post-5");
    }

    #[test]
    fn test_with_map_merges() {
        let mut set = AttributeSet::new(plain_host(), "x", "", AttrMap::new());
        set.with("a", 1).with("b", 2);

        let mut data = Map::new();
        data.insert("b".to_owned(), json!(3));
        data.insert("c".to_owned(), json!(4));
        set.with_map(data);

        assert_eq!(set.data("a"), Some(&json!(1)));
        assert_eq!(set.data("b"), Some(&json!(3)));
        assert_eq!(set.data("c"), Some(&json!(4)));
    }

    #[test]
    fn test_get_missing_is_empty() {
        let set = AttributeSet::new(plain_host(), "sidebar", "", AttrMap::new());
        assert_eq!(set.get("missing"), "");
    }

    #[test]
    fn test_render_bare_false() {
        let input = input([("class", "x".into()), ("disabled", false.into())]);
        let set = AttributeSet::new(plain_host(), "button", "", input);
        assert_eq!(set.render(), r#"class="x" disabled"#);
    }

    #[test]
    fn test_render_true_and_int() {
        let input = input([("class", "x".into()), ("data-open", AttrValue::Bool(true)), ("tabindex", AttrValue::Int(-1))]);
        let set = AttributeSet::new(plain_host(), "dialog", "", input);
        assert_eq!(set.render(), r#"class="x" data-open="1" tabindex="-1""#);
    }

    #[test]
    fn test_render_escapes_values() {
        let input = input([("title", r#"Say "hi" <now> & 'then'"#.into())]);
        let set = AttributeSet::new(plain_host(), "a", "", input);
        assert_eq!(
            set.get("title"),
            r#"Say "hi" <now> & 'then'"#
        );
        assert_eq!(
            set.render(),
            r#"class="a" title="Say &quot;hi&quot; &lt;now&gt; &amp; &#039;then&#039;""#
        );
    }

    #[test]
    fn test_render_href_uses_url_escaping() {
        let raw = "https://example.com/?a=1&b=2";
        let input = input([("href", raw.into()), ("data-url", raw.into())]);
        let set = AttributeSet::new(plain_host(), "link", "", input);
        assert_eq!(
            set.render(),
            r#"class="link" href="https://example.com/?a=1&#038;b=2" data-url="https://example.com/?a=1&amp;b=2""#
        );
    }

    #[test]
    fn test_render_href_disallowed_protocol() {
        let input = input([("href", "javascript:alert(1)".into())]);
        let set = AttributeSet::new(plain_host(), "link", "", input);
        assert_eq!(set.render(), r#"class="link" href="""#);
    }

    #[test]
    fn test_render_escapes_names() {
        let input = input([("data-<x>", "1".into()), ("on\"y", false.into())]);
        let set = AttributeSet::new(plain_host(), "div", "", input);
        assert_eq!(set.render(), r#"class="div" data-&lt;x&gt;="1" on&quot;y"#);
    }

    #[test]
    fn test_render_empty() {
        let registry = FilterRegistry::new().with_filter("attr", |_: AttrMap, _: &FilterArgs<'_>| AttrMap::new());
        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "x", "", AttrMap::new());
        assert_eq!(set.render(), "");
    }

    #[test]
    fn test_display_writes_render() {
        let set = AttributeSet::new(plain_host(), "footer", "site", AttrMap::new());
        let mut out = Vec::new();
        set.display(&mut out).unwrap();

        assert_eq!(String::from_utf8(out).unwrap(), r#"class="footer footer--site""#);
        assert_eq!(set.to_string(), r#"class="footer footer--site""#);
    }

    #[test]
    fn test_hook_order() {
        let registry = FilterRegistry::new()
            .with_filter("attr/nav", |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                let seen = attrs.get("data-trace").map(ToString::to_string).unwrap_or_default();
                attrs.insert("data-trace", format!("{seen} element"));
                attrs
            })
            .with_filter("attr", |mut attrs: AttrMap, args: &FilterArgs<'_>| {
                let seen = attrs.get("data-trace").map(ToString::to_string).unwrap_or_default();
                attrs.insert("data-trace", format!("{seen} global:{}", args.name));
                attrs
            })
            .with_filter("attr/nav/defaults", |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                attrs.insert("data-trace", "defaults");
                attrs
            });

        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "nav", "", AttrMap::new());
        assert_eq!(set.get("data-trace"), "defaults global:nav element");
    }

    #[test]
    fn test_input_overrides_defaults_hook() {
        let registry = FilterRegistry::new().with_filter(
            "attr/nav/defaults",
            |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                attrs.insert("role", "navigation");
                attrs.insert("aria-label", "Primary");
                attrs
            },
        );
        let input = input([("aria-label", "Footer".into())]);

        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "nav", "", input);
        assert_eq!(
            text_pairs(set.all()),
            vec![
                pair("class", "nav"),
                pair("role", "navigation"),
                pair("aria-label", "Footer"),
            ]
        );
    }

    #[test]
    fn test_defaults_hook_sees_input_class() {
        let registry = FilterRegistry::new().with_filter(
            "attr/nav/defaults",
            |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                let class = attrs.get("class").map(ToString::to_string).unwrap_or_default();
                attrs.insert("class", format!("{class} from-hook"));
                attrs
            },
        );
        let input = input([("class", "custom".into())]);

        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "nav", "", input);
        assert_eq!(set.get("class"), "custom from-hook");
    }

    #[test]
    fn test_class_hook_deduplicates() {
        let registry = FilterRegistry::new().with_class_filter(
            "attr/list/class",
            |mut classes: Vec<String>, _: &FilterArgs<'_>| {
                classes.push("b".to_owned());
                classes
            },
        );
        let input = input([("class", "a a b".into())]);

        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "list", "", input);
        assert_eq!(set.get("class"), "a b");
    }

    #[test]
    fn test_class_hook_receives_split_list() {
        let registry = FilterRegistry::new().with_class_filter(
            "attr/list/class",
            |classes: Vec<String>, _: &FilterArgs<'_>| vec![classes.len().to_string()],
        );

        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "list", "wide", AttrMap::new());
        assert_eq!(set.get("class"), "2");
    }

    #[test]
    fn test_class_hook_skipped_without_class() {
        let registry = FilterRegistry::new()
            .with_filter("attr/list", |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                attrs.remove("class");
                attrs
            })
            .with_class_filter("attr/list/class", |_: Vec<String>, _: &FilterArgs<'_>| {
                vec!["added".to_owned()]
            });

        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "list", "", AttrMap::new());
        assert!(!set.all().contains_key("class"));
    }

    #[test]
    fn test_no_dedup_without_class_hook() {
        let input = input([("class", "a a".into())]);
        let set = AttributeSet::new(plain_host(), "list", "", input);
        assert_eq!(set.get("class"), "a a");
    }

    #[test]
    fn test_entry_fires_own_hook_names() {
        let registry = FilterRegistry::new()
            .with_filter("attr/entry/defaults", |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                attrs.insert("data-hook", "entry");
                attrs
            })
            .with_filter("attr/post/defaults", |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                attrs.insert("data-hook", "post");
                attrs
            });

        let set = AttributeSet::new(host_with(registry, StaticSite::new()), "entry", "", AttrMap::new());
        assert_eq!(set.get("data-hook"), "entry");
        assert_eq!(set.get("id"), "post-0");
    }

    #[test]
    fn test_body_rule_and_hook_override() {
        let site = StaticSite::new()
            .with_body_class("home")
            .with_direction(TextDirection::Rtl);
        let registry = FilterRegistry::new().with_filter(
            "attr/body",
            |mut attrs: AttrMap, _: &FilterArgs<'_>| {
                attrs.insert("dir", "ltr");
                attrs
            },
        );

        let set = AttributeSet::new(host_with(registry, site), "body", "", AttrMap::new());
        assert_eq!(set.render(), r#"class="home rtl" dir="ltr""#);
    }

    #[test]
    fn test_html_rule() {
        let site = StaticSite::new().with_language("fr-FR");
        let set = AttributeSet::new(host_with(FilterRegistry::new(), site), "html", "", AttrMap::new());
        assert_eq!(set.render(), r#"lang="fr-FR""#);
    }

    #[test]
    fn test_html_rule_replaces_input_class() {
        let site = StaticSite::new().with_language("fr-FR");
        let input = input([("class", "no-js".into())]);
        let set = AttributeSet::new(host_with(FilterRegistry::new(), site), "html", "", input);
        assert_eq!(set.render(), r#"lang="fr-FR""#);
    }

    #[test]
    fn test_post_rule_with_data_hook() {
        let site = StaticSite::new().with_post(Post::new(12, "post"));
        let registry = FilterRegistry::new().with_filter(
            "attr/post/defaults",
            |mut attrs: AttrMap, args: &FilterArgs<'_>| {
                if args.data("post").is_some() {
                    attrs.insert("data-explicit", true);
                }
                attrs
            },
        );

        let mut set = AttributeSet::new(host_with(registry, site), "post", "", AttrMap::new());
        set.with("post", 12);

        assert_eq!(
            set.render(),
            r#"class="post post-12 type-post status-publish format-standard hentry" id="post-12" data-explicit="1""#
        );
    }

    #[test]
    fn test_comment_rule() {
        let site = StaticSite::new().with_current_comment(3, ["comment", "even"]);
        let set = AttributeSet::new(host_with(FilterRegistry::new(), site), "comment", "", AttrMap::new());
        assert_eq!(set.render(), r#"class="comment even" id="comment-3""#);
    }

    #[test]
    fn test_trait_object_chaining() {
        let site = StaticSite::new().with_post(Post::new(8, "page"));
        let mut boxed: Box<dyn Attributes> = Box::new(AttributeSet::new(
            host_with(FilterRegistry::new(), site),
            "entry",
            "",
            AttrMap::new(),
        ));

        boxed.with("unused", json!("x")).with("post", json!(8));

        assert_eq!(boxed.get("id"), "post-8");
        assert_eq!(boxed.to_string(), boxed.render());
    }
}
