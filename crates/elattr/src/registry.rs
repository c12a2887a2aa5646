//! Binding of the [`Attributes`] capability to a concrete implementation.
//!
//! Helpers never name [`AttributeSet`] directly: they ask a [`Registry`],
//! which builds instances through whichever [`AttributesFactory`] is bound.
//! Rebinding swaps the implementation for every helper call at once.

use std::fmt;
use std::sync::Arc;

use elattr_config::Config;

use crate::attribute_set::{AttributeSet, Attributes};
use crate::hooks::Filters;
use crate::host::Host;
use crate::value::AttrMap;

/// Builds [`Attributes`] instances for a registry.
pub trait AttributesFactory: Send + Sync {
    /// Create an instance for element `name` in `context` with `input`.
    fn create(
        &self,
        host: Arc<Host>,
        name: &str,
        context: &str,
        input: AttrMap,
    ) -> Box<dyn Attributes>;
}

impl<F> AttributesFactory for F
where
    F: Fn(Arc<Host>, &str, &str, AttrMap) -> Box<dyn Attributes> + Send + Sync,
{
    fn create(
        &self,
        host: Arc<Host>,
        name: &str,
        context: &str,
        input: AttrMap,
    ) -> Box<dyn Attributes> {
        self(host, name, context, input)
    }
}

/// Factory producing [`AttributeSet`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFactory;

impl AttributesFactory for DefaultFactory {
    fn create(
        &self,
        host: Arc<Host>,
        name: &str,
        context: &str,
        input: AttrMap,
    ) -> Box<dyn Attributes> {
        Box::new(AttributeSet::new(host, name, context, input))
    }
}

/// Resolves [`Attributes`] instances for a host.
///
/// # Example
///
/// ```
/// use elattr::{AttrMap, Host, Registry};
///
/// let registry = Registry::new(Host::default());
/// let attrs = registry.resolve("widget", "footer", AttrMap::new());
/// assert_eq!(attrs.render(), r#"class="widget widget--footer""#);
/// ```
pub struct Registry {
    host: Arc<Host>,
    factory: Box<dyn AttributesFactory>,
}

impl Registry {
    /// Create a registry bound to [`DefaultFactory`].
    #[must_use]
    pub fn new(host: impl Into<Arc<Host>>) -> Self {
        Self {
            host: host.into(),
            factory: Box::new(DefaultFactory),
        }
    }

    /// Create a registry for a host built from configuration.
    #[must_use]
    pub fn from_config(config: &Config, filters: impl Filters + 'static) -> Self {
        Self::new(Host::from_config(config, filters))
    }

    /// Bind another implementation of the attributes capability.
    pub fn bind(&mut self, factory: impl AttributesFactory + 'static) -> &mut Self {
        tracing::debug!("Rebinding attributes factory");
        self.factory = Box::new(factory);
        self
    }

    /// Create an instance through the bound factory.
    pub fn resolve(&self, name: &str, context: &str, input: AttrMap) -> Box<dyn Attributes> {
        self.factory
            .create(Arc::clone(&self.host), name, context, input)
    }

    /// Shared host services.
    pub fn host(&self) -> &Arc<Host> {
        &self.host
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
