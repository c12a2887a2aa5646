//! Configuration management for elattr.
//!
//! Parses `elattr.toml` configuration files with serde and provides
//! auto-discovery of config files in parent directories.
//!
//! Programmatic overrides can be applied during load via [`ConfigOverrides`].
//!
//! ```toml
//! [hooks]
//! prefix = "theme/attr"
//!
//! [escape]
//! url_protocols = ["http", "https", "mailto"]
//!
//! [site]
//! language = "he-IL"
//! text_direction = "rtl"
//! body_classes = ["home", "blog"]
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Configuration filename to search for.
const CONFIG_FILENAME: &str = "elattr.toml";

/// Protocols accepted in URL-escaped attribute values by default.
const DEFAULT_URL_PROTOCOLS: &[&str] = &[
    "http", "https", "ftp", "ftps", "mailto", "news", "irc", "irc6", "ircs", "gopher", "nntp",
    "feed", "telnet", "mms", "rtsp", "sms", "svn", "tel", "fax", "xmpp", "webcal", "urn",
];

/// Settings that override configuration file values.
///
/// All fields are optional. Only non-None values override the loaded config.
#[derive(Debug, Default)]
pub struct ConfigOverrides {
    /// Override the hook name prefix.
    pub hook_prefix: Option<String>,
    /// Override the site language.
    pub language: Option<String>,
    /// Override the text direction.
    pub text_direction: Option<TextDirection>,
}

/// Application configuration.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Hook naming configuration.
    pub hooks: HooksConfig,
    /// Escaping configuration.
    pub escape: EscapeConfig,
    /// Site-wide values consulted by element default rules.
    pub site: SiteConfig,

    /// Path to the config file (set after loading).
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Hook naming configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct HooksConfig {
    /// Prefix for every hook name (`{prefix}/{name}/defaults` and friends).
    pub prefix: String,
}

impl Default for HooksConfig {
    fn default() -> Self {
        Self {
            prefix: "attr".to_owned(),
        }
    }
}

/// Escaping configuration.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct EscapeConfig {
    /// URL schemes allowed in `href` values. Anything else renders empty.
    pub url_protocols: Vec<String>,
}

impl Default for EscapeConfig {
    fn default() -> Self {
        Self {
            url_protocols: DEFAULT_URL_PROTOCOLS
                .iter()
                .map(|p| (*p).to_owned())
                .collect(),
        }
    }
}

/// Writing direction of the site language.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextDirection {
    /// Left to right.
    #[default]
    Ltr,
    /// Right to left.
    Rtl,
}

impl TextDirection {
    /// Value used for the HTML `dir` attribute.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ltr => "ltr",
            Self::Rtl => "rtl",
        }
    }
}

impl fmt::Display for TextDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Site-wide values.
#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Language tag emitted in the `lang` attribute.
    pub language: String,
    /// Writing direction.
    pub text_direction: TextDirection,
    /// Classes always present on `<body>`.
    pub body_classes: Vec<String>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            language: "en-US".to_owned(),
            text_direction: TextDirection::default(),
            body_classes: Vec::new(),
        }
    }
}

/// Configuration error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File not found.
    #[error("Configuration file not found: {}", .0.display())]
    NotFound(PathBuf),
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// Validation error.
    #[error("Configuration error: {0}")]
    Validation(String),
}

/// Require a string field to be non-empty.
fn require_non_empty(value: &str, field: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Validation(format!("{field} cannot be empty")));
    }
    Ok(())
}

/// Require a URL scheme name: ASCII letter followed by letters, digits, `+`, `-` or `.`.
fn require_scheme(value: &str, field: &str) -> Result<(), ConfigError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'));
    if !valid {
        return Err(ConfigError::Validation(format!(
            "{field} contains invalid protocol {value:?}"
        )));
    }
    Ok(())
}

impl Config {
    /// Load configuration from file with optional overrides.
    ///
    /// If `config_path` is provided, loads from that file.
    /// Otherwise, searches for `elattr.toml` in current directory and parents,
    /// falling back to defaults when none is found.
    ///
    /// # Errors
    ///
    /// Returns error if explicit `config_path` doesn't exist, parsing fails or
    /// the resulting configuration is invalid.
    pub fn load(
        config_path: Option<&Path>,
        overrides: Option<&ConfigOverrides>,
    ) -> Result<Self, ConfigError> {
        let mut config = if let Some(path) = config_path {
            if !path.exists() {
                return Err(ConfigError::NotFound(path.to_path_buf()));
            }
            Self::load_from_file(path)?
        } else if let Some(discovered) = Self::discover_config() {
            Self::load_from_file(&discovered)?
        } else {
            Self::default()
        };

        if let Some(overrides) = overrides {
            config.apply_overrides(overrides);
            config.validate()?;
        }

        Ok(config)
    }

    /// Apply overrides to the configuration.
    fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(prefix) = &overrides.hook_prefix {
            self.hooks.prefix.clone_from(prefix);
        }
        if let Some(language) = &overrides.language {
            self.site.language.clone_from(language);
        }
        if let Some(direction) = overrides.text_direction {
            self.site.text_direction = direction;
        }
    }

    /// Search for config file in current directory and parents.
    fn discover_config() -> Option<PathBuf> {
        let current = std::env::current_dir().ok()?;
        Self::discover_from(&current)
    }

    /// Search for config file starting at `start` and walking up to the root.
    fn discover_from(start: &Path) -> Option<PathBuf> {
        let mut current = start.to_path_buf();
        loop {
            let candidate = current.join(CONFIG_FILENAME);
            if candidate.exists() {
                return Some(candidate);
            }
            if !current.pop() {
                return None;
            }
        }
    }

    /// Load configuration from a specific file.
    fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.config_path = Some(path.to_path_buf());

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values.
    ///
    /// Called automatically after loading from file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Validation` if any validation fails.
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_empty(&self.hooks.prefix, "hooks.prefix")?;
        if self.hooks.prefix.ends_with('/') {
            return Err(ConfigError::Validation(
                "hooks.prefix cannot end with '/'".to_owned(),
            ));
        }

        for protocol in &self.escape.url_protocols {
            require_scheme(protocol, "escape.url_protocols")?;
        }

        require_non_empty(&self.site.language, "site.language")?;
        if self.site.language.contains(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "site.language cannot contain whitespace".to_owned(),
            ));
        }

        Ok(())
    }
}
