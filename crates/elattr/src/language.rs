//! Splitting an HTML attribute string into name/value pairs.
//!
//! Used by the `html` rule to turn the host's language attribute text
//! (`dir="rtl" lang="he-IL"`) back into an attribute map.

use std::sync::LazyLock;

use regex::Regex;

use crate::escape::strip_bad_protocols;

/// `name`, `name="v"`, `name='v'` or `name=v`.
static ATTR_PAIR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"([A-Za-z_:][-A-Za-z0-9_:.]*)(?:\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s"'>]+)))?"#,
    )
    .unwrap()
});

/// Parse attribute text into ordered `(name, value)` pairs.
///
/// Names are lower-cased and the first occurrence of a name wins. Values
/// lose any leading protocol not listed in `allowed`; a name without a value
/// gets an empty value.
///
/// # Examples
///
/// ```
/// use elattr::language::parse_attribute_pairs;
///
/// let allowed = ["http".to_owned(), "https".to_owned()];
/// let pairs = parse_attribute_pairs(r#"dir="rtl" LANG='he-IL' dir=ltr"#, &allowed);
/// assert_eq!(pairs, [
///     ("dir".to_owned(), "rtl".to_owned()),
///     ("lang".to_owned(), "he-IL".to_owned()),
/// ]);
/// ```
#[must_use]
pub fn parse_attribute_pairs(s: &str, allowed: &[String]) -> Vec<(String, String)> {
    let mut pairs: Vec<(String, String)> = Vec::new();

    for caps in ATTR_PAIR_RE.captures_iter(s) {
        let name = caps[1].to_ascii_lowercase();
        if pairs.iter().any(|(n, _)| *n == name) {
            continue;
        }

        let raw = caps
            .get(2)
            .or_else(|| caps.get(3))
            .or_else(|| caps.get(4))
            .map_or("", |m| m.as_str());
        let value = strip_bad_protocols(raw, allowed);
        if value != raw {
            tracing::debug!(attribute = %name, "Removed disallowed protocol from attribute value");
        }

        pairs.push((name, value));
    }

    pairs
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn web() -> Vec<String> {
        vec!["http".to_owned(), "https".to_owned()]
    }

    fn pair(name: &str, value: &str) -> (String, String) {
        (name.to_owned(), value.to_owned())
    }

    #[test]
    fn test_language_attributes() {
        assert_eq!(
            parse_attribute_pairs(r#"lang="en-US""#, &web()),
            vec![pair("lang", "en-US")]
        );
    }

    #[test]
    fn test_quote_styles_and_bare() {
        assert_eq!(
            parse_attribute_pairs(r#"a="1" b='2' c=3 hidden"#, &web()),
            vec![pair("a", "1"), pair("b", "2"), pair("c", "3"), pair("hidden", "")]
        );
    }

    #[test]
    fn test_spaces_around_equals() {
        assert_eq!(
            parse_attribute_pairs(r#"lang = "fr""#, &web()),
            vec![pair("lang", "fr")]
        );
    }

    #[test]
    fn test_prefixed_names() {
        assert_eq!(
            parse_attribute_pairs(r#"xml:lang="en" data-x="y""#, &web()),
            vec![pair("xml:lang", "en"), pair("data-x", "y")]
        );
    }

    #[test]
    fn test_strips_disallowed_protocols() {
        assert_eq!(
            parse_attribute_pairs(
                r#"about="javascript:alert(1)" cite="https://example.com""#,
                &web()
            ),
            vec![pair("about", "alert(1)"), pair("cite", "https://example.com")]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(parse_attribute_pairs("", &web()).is_empty());
        assert!(parse_attribute_pairs("   ", &web()).is_empty());
    }
}
