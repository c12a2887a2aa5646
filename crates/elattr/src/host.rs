//! Services shared by every attribute set resolved for a host.

use std::fmt;

use elattr_config::{Config, EscapeConfig};

use crate::hooks::{Filters, HookNames, NoFilters};
use crate::site::{SiteContext, StaticSite};

/// Hook dispatch, site services, hook naming and URL policy for a host.
///
/// Immutable once built; share it through an `Arc`.
pub struct Host {
    filters: Box<dyn Filters>,
    site: Box<dyn SiteContext>,
    hooks: HookNames,
    url_protocols: Vec<String>,
}

impl Default for Host {
    fn default() -> Self {
        Self::new(NoFilters, StaticSite::default())
    }
}

impl Host {
    /// Create a host with the default hook prefix and URL protocols.
    #[must_use]
    pub fn new(filters: impl Filters + 'static, site: impl SiteContext + 'static) -> Self {
        Self {
            filters: Box::new(filters),
            site: Box::new(site),
            hooks: HookNames::default(),
            url_protocols: EscapeConfig::default().url_protocols,
        }
    }

    /// Create a host from configuration, with a [`StaticSite`] built from the
    /// `[site]` section.
    #[must_use]
    pub fn from_config(config: &Config, filters: impl Filters + 'static) -> Self {
        Self {
            filters: Box::new(filters),
            site: Box::new(StaticSite::from_config(&config.site)),
            hooks: HookNames::new(config.hooks.prefix.clone()),
            url_protocols: config.escape.url_protocols.clone(),
        }
    }

    /// Replace the site services.
    #[must_use]
    pub fn with_site(mut self, site: impl SiteContext + 'static) -> Self {
        self.site = Box::new(site);
        self
    }

    /// Set the hook name prefix.
    #[must_use]
    pub fn with_hook_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.hooks = HookNames::new(prefix);
        self
    }

    /// Set the URL schemes allowed in `href` values.
    #[must_use]
    pub fn with_url_protocols<I, S>(mut self, protocols: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_protocols = protocols.into_iter().map(Into::into).collect();
        self
    }

    /// Hook dispatch.
    pub fn filters(&self) -> &dyn Filters {
        self.filters.as_ref()
    }

    /// Site services.
    pub fn site(&self) -> &dyn SiteContext {
        self.site.as_ref()
    }

    /// Hook names.
    pub fn hooks(&self) -> &HookNames {
        &self.hooks
    }

    /// URL schemes allowed in `href` values.
    pub fn url_protocols(&self) -> &[String] {
        &self.url_protocols
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host")
            .field("hooks", &self.hooks)
            .field("url_protocols", &self.url_protocols)
            .finish_non_exhaustive()
    }
}
