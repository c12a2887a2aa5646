//! Site and content services consulted by element default rules.
//!
//! The `html`, `body`, `post`/`entry` and `comment` rules need to know the
//! site language, text direction, the post being rendered and the classes the
//! host computes for those elements. [`SiteContext`] is that seam;
//! [`StaticSite`] is an in-memory implementation driven by configuration.

use std::collections::HashMap;

use elattr_config::{SiteConfig, TextDirection};
use serde_json::Value;

use crate::value::dedup_classes;

/// A content record rendered by the `post` and `entry` rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    /// Numeric post ID.
    pub id: u64,
    /// Post type (e.g. `post`, `page`).
    pub post_type: String,
    /// Publication status (e.g. `publish`, `draft`).
    pub status: String,
    /// Post format; `None` means standard.
    pub format: Option<String>,
}

impl Post {
    /// Create a published post of the given type.
    #[must_use]
    pub fn new(id: u64, post_type: impl Into<String>) -> Self {
        Self {
            id,
            post_type: post_type.into(),
            status: "publish".to_owned(),
            format: None,
        }
    }

    /// Set the publication status.
    #[must_use]
    pub fn with_status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Set the post format.
    #[must_use]
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }
}

/// Host services for site-level and content-specific attribute values.
///
/// `extra` arguments carry the class already chosen for the element; the
/// returned list must include its classes.
pub trait SiteContext: Send + Sync {
    /// Language attributes for `<html>`, as HTML attribute text
    /// (e.g. `dir="rtl" lang="he-IL"`).
    fn language_attributes(&self) -> String;

    /// Whether the site language is written right to left.
    fn is_rtl(&self) -> bool;

    /// Classes for `<body>`.
    fn body_classes(&self, extra: &str) -> Vec<String>;

    /// Look up a post from a caller-supplied reference (usually an ID).
    fn resolve_post(&self, reference: &Value) -> Option<Post>;

    /// The post currently being rendered, if any.
    fn current_post(&self) -> Option<Post>;

    /// Classes for a post wrapper.
    fn post_classes(&self, extra: &str, post: Option<&Post>) -> Vec<String>;

    /// ID of the comment currently being rendered, `0` when none.
    fn current_comment_id(&self) -> u64;

    /// Classes for the current comment wrapper.
    fn comment_classes(&self, extra: &str) -> Vec<String>;
}

/// Split a class attribute value on whitespace.
fn split_classes(extra: &str) -> impl Iterator<Item = String> + '_ {
    extra.split_whitespace().map(str::to_owned)
}

/// Extract a post ID from a reference: a number, a numeric string, or an
/// object with an `id` (or `ID`) field.
fn post_id(reference: &Value) -> Option<u64> {
    match reference {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        Value::Object(map) => map.get("id").or_else(|| map.get("ID")).and_then(post_id),
        _ => None,
    }
}

#[derive(Debug, Clone)]
struct CurrentComment {
    id: u64,
    classes: Vec<String>,
}

/// In-memory [`SiteContext`].
///
/// # Example
///
/// ```
/// use elattr::{Post, SiteContext, StaticSite};
///
/// let site = StaticSite::new()
///     .with_post(Post::new(42, "post"))
///     .with_current_post(42);
///
/// let post = site.current_post().unwrap();
/// assert_eq!(
///     site.post_classes("featured", Some(&post)),
///     ["featured", "post-42", "post", "type-post", "status-publish", "format-standard", "hentry"]
/// );
/// ```
#[derive(Debug, Clone)]
pub struct StaticSite {
    language: String,
    direction: TextDirection,
    body_classes: Vec<String>,
    posts: HashMap<u64, Post>,
    current_post: Option<u64>,
    current_comment: Option<CurrentComment>,
}

impl Default for StaticSite {
    fn default() -> Self {
        Self::from_config(&SiteConfig::default())
    }
}

impl StaticSite {
    /// Create a site with default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a site from the `[site]` configuration section.
    #[must_use]
    pub fn from_config(config: &SiteConfig) -> Self {
        Self {
            language: config.language.clone(),
            direction: config.text_direction,
            body_classes: config.body_classes.clone(),
            posts: HashMap::new(),
            current_post: None,
            current_comment: None,
        }
    }

    /// Set the site language tag.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Set the text direction.
    #[must_use]
    pub fn with_direction(mut self, direction: TextDirection) -> Self {
        self.direction = direction;
        self
    }

    /// Add a class always present on `<body>`.
    #[must_use]
    pub fn with_body_class(mut self, class: impl Into<String>) -> Self {
        self.body_classes.push(class.into());
        self
    }

    /// Register a post so it can be resolved by ID.
    #[must_use]
    pub fn with_post(mut self, post: Post) -> Self {
        self.posts.insert(post.id, post);
        self
    }

    /// Mark a registered post as the one being rendered.
    #[must_use]
    pub fn with_current_post(mut self, id: u64) -> Self {
        self.current_post = Some(id);
        self
    }

    /// Set the comment being rendered and its host-computed classes.
    #[must_use]
    pub fn with_current_comment<I, S>(mut self, id: u64, classes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.current_comment = Some(CurrentComment {
            id,
            classes: classes.into_iter().map(Into::into).collect(),
        });
        self
    }
}

impl SiteContext for StaticSite {
    fn language_attributes(&self) -> String {
        let mut parts = Vec::new();
        if self.is_rtl() {
            parts.push(r#"dir="rtl""#.to_owned());
        }
        if !self.language.is_empty() {
            parts.push(format!(r#"lang="{}""#, self.language));
        }
        parts.join(" ")
    }

    fn is_rtl(&self) -> bool {
        self.direction == TextDirection::Rtl
    }

    fn body_classes(&self, extra: &str) -> Vec<String> {
        let mut classes = self.body_classes.clone();
        if self.is_rtl() {
            classes.push("rtl".to_owned());
        }
        classes.extend(split_classes(extra));
        dedup_classes(classes)
    }

    fn resolve_post(&self, reference: &Value) -> Option<Post> {
        post_id(reference).and_then(|id| self.posts.get(&id).cloned())
    }

    fn current_post(&self) -> Option<Post> {
        self.current_post
            .and_then(|id| self.posts.get(&id).cloned())
    }

    fn post_classes(&self, extra: &str, post: Option<&Post>) -> Vec<String> {
        let mut classes: Vec<String> = split_classes(extra).collect();
        if let Some(post) = post {
            classes.push(format!("post-{}", post.id));
            classes.push(post.post_type.clone());
            classes.push(format!("type-{}", post.post_type));
            classes.push(format!("status-{}", post.status));
            if post.post_type == "post" {
                let format = post.format.as_deref().unwrap_or("standard");
                classes.push(format!("format-{format}"));
            }
            classes.push("hentry".to_owned());
        }
        dedup_classes(classes)
    }

    fn current_comment_id(&self) -> u64 {
        self.current_comment.as_ref().map_or(0, |c| c.id)
    }

    fn comment_classes(&self, extra: &str) -> Vec<String> {
        let mut classes = self
            .current_comment
            .as_ref()
            .map(|c| c.classes.clone())
            .unwrap_or_default();
        classes.extend(split_classes(extra));
        dedup_classes(classes)
    }
}
