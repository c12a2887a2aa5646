//! Escaping for rendered attribute names and values.
//!
//! - [`escape_html`]: attribute names (and any HTML text)
//! - [`escape_attr`]: attribute values
//! - [`escape_url`]: values of `href`
//!
//! Valid character and entity references (`&amp;`, `&#8217;`, `&#x2014;`)
//! are never encoded twice.

use std::sync::LazyLock;

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use regex::Regex;

/// Character or named entity reference at the start of the haystack.
static ENTITY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^&(?:[A-Za-z][A-Za-z0-9]*|#[0-9]+|#[xX][0-9A-Fa-f]+);").unwrap());

/// Protocol separator, including its encoded forms.
static COLON_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i):|&#0*58;|&#x0*3a;").unwrap());

/// Bytes percent-encoded in URLs. Non-ASCII is always encoded.
const URL_ENCODE_SET: &AsciiSet = &CONTROLS.add(b' ');

/// Escape text for HTML output.
///
/// Encodes `&`, `<`, `>`, `"` and `'`.
///
/// # Examples
///
/// ```
/// use elattr::escape::escape_html;
///
/// assert_eq!(escape_html("<b>\"Tom\" & 'Jerry'</b>"),
///     "&lt;b&gt;&quot;Tom&quot; &amp; &#039;Jerry&#039;&lt;/b&gt;");
/// assert_eq!(escape_html("Fish &amp; Chips"), "Fish &amp; Chips");
/// ```
#[must_use]
pub fn escape_html(s: &str) -> String {
    encode_special_chars(s)
}

/// Escape an attribute value for use inside double quotes.
#[must_use]
pub fn escape_attr(s: &str) -> String {
    encode_special_chars(s)
}

fn encode_special_chars(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    for (i, c) in s.char_indices() {
        match c {
            '&' if ENTITY_RE.is_match(&s[i..]) => result.push('&'),
            '&' => result.push_str("&amp;"),
            '<' => result.push_str("&lt;"),
            '>' => result.push_str("&gt;"),
            '"' => result.push_str("&quot;"),
            '\'' => result.push_str("&#039;"),
            _ => result.push(c),
        }
    }
    result
}

/// Escape a URL for use in an `href` attribute.
///
/// Characters that can't appear in a URL are dropped, spaces and non-ASCII
/// are percent-encoded, and a URL with no scheme gets `http://` unless it is
/// relative to the host (`/`), a fragment (`#`) or a query (`?`). A URL
/// whose scheme is not in `protocols` escapes to the empty string.
///
/// # Examples
///
/// ```
/// use elattr::escape::escape_url;
///
/// let protocols = ["http".to_owned(), "https".to_owned()];
/// assert_eq!(escape_url("https://example.com/?a=1&b=2", &protocols),
///     "https://example.com/?a=1&#038;b=2");
/// assert_eq!(escape_url("example.com/my page", &protocols), "http://example.com/my%20page");
/// assert_eq!(escape_url("javascript:alert(1)", &protocols), "");
/// ```
#[must_use]
pub fn escape_url(url: &str, protocols: &[String]) -> String {
    let url = url.trim_start();
    if url.is_empty() {
        return String::new();
    }

    let filtered: String = url
        .chars()
        .filter(|&c| c == ' ' || !c.is_ascii() || is_url_char(c))
        .collect();
    let mut encoded = utf8_percent_encode(&filtered, URL_ENCODE_SET).to_string();
    if encoded.is_empty() {
        return String::new();
    }

    if !encoded.contains(':') && !encoded.starts_with(['/', '#', '?']) {
        encoded.insert_str(0, "http://");
    }

    if strip_bad_protocols(&encoded, protocols) != encoded {
        tracing::debug!(url = %encoded, "Dropped URL with disallowed protocol");
        return String::new();
    }

    let mut result = String::with_capacity(encoded.len());
    let mut rest = encoded.as_str();
    while let Some(pos) = rest.find(['&', '\'']) {
        result.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        if tail.starts_with('\'') {
            result.push_str("&#039;");
            rest = &tail[1..];
        } else if let Some(entity) = ENTITY_RE.find(tail) {
            if entity.as_str() == "&amp;" {
                result.push_str("&#038;");
            } else {
                result.push_str(entity.as_str());
            }
            rest = &tail[entity.end()..];
        } else {
            result.push_str("&#038;");
            rest = &tail[1..];
        }
    }
    result.push_str(rest);
    result
}

/// ASCII characters allowed to appear in an escaped URL.
fn is_url_char(c: char) -> bool {
    c.is_ascii_alphanumeric()
        || matches!(
            c,
            '-' | '~'
                | '+'
                | '_'
                | '.'
                | '?'
                | '#'
                | '='
                | '!'
                | '&'
                | ';'
                | ','
                | '/'
                | ':'
                | '%'
                | '@'
                | '$'
                | '|'
                | '*'
                | '\''
                | '('
                | ')'
                | '['
                | ']'
        )
}

/// Remove leading `scheme:` prefixes whose scheme is not in `allowed`.
///
/// Runs until the value stops changing, so `javascript:javascript:x` loses
/// both prefixes. A colon that follows `/`, `?` or `#` is not a scheme
/// separator.
///
/// # Examples
///
/// ```
/// use elattr::escape::strip_bad_protocols;
///
/// let allowed = ["https".to_owned()];
/// assert_eq!(strip_bad_protocols("javascript:alert(1)", &allowed), "alert(1)");
/// assert_eq!(strip_bad_protocols("https://example.com", &allowed), "https://example.com");
/// assert_eq!(strip_bad_protocols("/path?t=10:30", &allowed), "/path?t=10:30");
/// ```
#[must_use]
pub fn strip_bad_protocols(value: &str, allowed: &[String]) -> String {
    let mut current = value.to_owned();
    loop {
        let next = strip_bad_protocol_once(&current, allowed);
        if next == current {
            return next;
        }
        current = next;
    }
}

fn strip_bad_protocol_once(value: &str, allowed: &[String]) -> String {
    let Some(separator) = COLON_RE.find(value) else {
        return value.to_owned();
    };

    let scheme = &value[..separator.start()];
    if scheme.contains(['/', '?', '#']) {
        return value.to_owned();
    }

    let scheme: String = scheme
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect();
    if allowed.iter().any(|p| p.eq_ignore_ascii_case(&scheme)) {
        value.to_owned()
    } else {
        value[separator.end()..].to_owned()
    }
}
