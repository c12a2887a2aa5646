//! Built-in default rules for well-known elements.
//!
//! A rule runs between the generic class default and the defaults hook, so
//! hooks always see (and may override) what it produced. Rules are selected by
//! exact element name; any other name skips this step.

use serde_json::{Map, Value};

use crate::site::SiteContext;
use crate::value::AttrMap;

/// Protocols allowed in `<html>` language attribute values.
const LANGUAGE_PROTOCOLS: [&str; 2] = ["http", "https"];

/// Element default rule, chosen by element name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementRule {
    /// `html`: language attributes replace all defaults.
    Html,
    /// `body`: body classes and `dir`.
    Body,
    /// `post` and `entry`: post `id` and classes.
    Post,
    /// `comment`: comment `id` and classes.
    Comment,
}

impl ElementRule {
    /// Find the rule for an element name.
    ///
    /// ```
    /// use elattr::ElementRule;
    ///
    /// assert_eq!(ElementRule::for_name("entry"), Some(ElementRule::Post));
    /// assert_eq!(ElementRule::for_name("sidebar"), None);
    /// ```
    #[must_use]
    pub fn for_name(name: &str) -> Option<Self> {
        match name {
            "html" => Some(Self::Html),
            "body" => Some(Self::Body),
            "post" | "entry" => Some(Self::Post),
            "comment" => Some(Self::Comment),
            _ => None,
        }
    }

    /// Rewrite `defaults` for this element.
    pub(crate) fn apply(
        self,
        defaults: AttrMap,
        site: &dyn SiteContext,
        data: &Map<String, Value>,
    ) -> AttrMap {
        tracing::trace!(rule = ?self, "Applying element default rule");
        match self {
            Self::Html => html(site),
            Self::Body => body(defaults, site),
            Self::Post => post(defaults, site, data),
            Self::Comment => comment(defaults, site),
        }
    }
}

fn class_of(attrs: &AttrMap) -> String {
    attrs
        .get("class")
        .map(|v| v.as_text().into_owned())
        .unwrap_or_default()
}

fn html(site: &dyn SiteContext) -> AttrMap {
    let allowed = LANGUAGE_PROTOCOLS.map(str::to_owned);
    crate::language::parse_attribute_pairs(&site.language_attributes(), &allowed)
        .into_iter()
        .collect()
}

fn body(mut attrs: AttrMap, site: &dyn SiteContext) -> AttrMap {
    let class = class_of(&attrs);
    let extra = if class == "body" { "" } else { class.as_str() };

    attrs.insert("class", site.body_classes(extra).join(" "));
    attrs.insert("dir", if site.is_rtl() { "rtl" } else { "ltr" });
    attrs
}

fn post(mut attrs: AttrMap, site: &dyn SiteContext, data: &Map<String, Value>) -> AttrMap {
    let post = match data.get("post").filter(|v| !v.is_null()) {
        Some(reference) => site.resolve_post(reference),
        None => site.current_post(),
    };
    let class = class_of(&attrs);

    let id = post
        .as_ref()
        .map_or_else(|| "post-0".to_owned(), |p| format!("post-{}", p.id));
    attrs.insert("id", id);
    attrs.insert("class", site.post_classes(&class, post.as_ref()).join(" "));
    attrs
}

fn comment(mut attrs: AttrMap, site: &dyn SiteContext) -> AttrMap {
    let class = class_of(&attrs);

    attrs.insert("id", format!("comment-{}", site.current_comment_id()));
    attrs.insert("class", site.comment_classes(&class).join(" "));
    attrs
}
