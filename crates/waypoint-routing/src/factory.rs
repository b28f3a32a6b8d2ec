// Presenter factory
// Resolves presenter names to registered classes and builds presenters

use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard};

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, trace};
use waypoint_component::Presenter;
use waypoint_core::{InvalidLinkMode, RequestHandler, WaypointConfig};
use waypoint_error::{ResolveError, ResolveResult, Result};

use crate::container::{HandlerContainer, INJECT_TAG};
use crate::mapping::{Mapping, Mask};
use crate::registry::ClassRegistry;

/// Letters, digits, underscores and colons; never a leading digit or colon
static PRESENTER_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z_\x{7f}-\x{10ffff}][a-zA-Z0-9_:\x{7f}-\x{10ffff}]*$")
        .expect("presenter name pattern is a valid regex")
});

/// Whether `name` is a syntactically valid presenter name
pub fn is_valid_presenter_name(name: &str) -> bool {
    PRESENTER_NAME.is_match(name)
}

/// Turns presenter names into class names and presenter instances
pub struct PresenterFactory {
    mapping: RwLock<Mapping>,
    /// Resolved class per presenter name
    cache: RwLock<HashMap<String, String>>,
    registry: Arc<ClassRegistry>,
    container: Arc<dyn HandlerContainer>,
    /// Invalid link mode forced on new presenters instead of the debug default
    link_mode: Option<InvalidLinkMode>,
}

impl PresenterFactory {
    pub fn new(registry: Arc<ClassRegistry>, container: Arc<dyn HandlerContainer>) -> Self {
        PresenterFactory {
            mapping: RwLock::new(Mapping::default()),
            cache: RwLock::new(HashMap::new()),
            registry,
            container,
            link_mode: None,
        }
    }

    /// Factory configured from `config`: its mapping section is applied and
    /// an explicit invalid link mode overrides the debug default
    pub fn from_config(
        config: &WaypointConfig,
        registry: Arc<ClassRegistry>,
        container: Arc<dyn HandlerContainer>,
    ) -> ResolveResult<Self> {
        let mut factory = Self::new(registry, container);
        factory.link_mode = config.application.invalid_link_mode;
        factory.set_mapping(config.mapping.iter())?;
        Ok(factory)
    }

    /// Class registry the factory validates against
    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }

    /// Replace the masks of the given modules. Every mask is validated
    /// before any is applied; on failure the mapping is left unchanged.
    /// Readers see either the old table or the new one.
    pub fn set_mapping<I, K, V>(&self, mapping: I) -> ResolveResult<&Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let parsed = mapping
            .into_iter()
            .map(|(module, mask)| Ok((module.as_ref().to_string(), Mask::parse(mask.as_ref())?)))
            .collect::<ResolveResult<Vec<_>>>()?;

        self.remap(|table| {
            for (module, mask) in parsed {
                debug!(module = %module, mask = %mask, "setting presenter mapping");
                table.insert(module, mask);
            }
        })?;
        Ok(self)
    }

    /// Replace the mask of one module
    pub fn set_mask(&self, module: impl Into<String>, mask: Mask) -> ResolveResult<()> {
        let module = module.into();
        debug!(module = %module, mask = %mask, "setting presenter mapping");
        self.remap(|table| table.insert(module, mask))
    }

    /// Apply `update` and drop cached classes under one mapping write lock
    fn remap(&self, update: impl FnOnce(&mut Mapping)) -> ResolveResult<()> {
        let mut mapping = self
            .mapping
            .write()
            .map_err(|_| ResolveError::registry("Failed to acquire write lock on mapping"))?;
        update(&mut *mapping);
        self.cache
            .write()
            .map_err(|_| ResolveError::registry("Failed to acquire write lock on cache"))?
            .clear();
        Ok(())
    }

    fn read_mapping(&self) -> ResolveResult<RwLockReadGuard<'_, Mapping>> {
        self.mapping
            .read()
            .map_err(|_| ResolveError::registry("Failed to acquire read lock on mapping"))
    }

    /// Class name a presenter name maps to, without validation
    pub fn format_presenter_class(&self, name: &str) -> ResolveResult<String> {
        Ok(self.read_mapping()?.format_presenter_class(name))
    }

    /// Resolve and validate the class of presenter `name`. Successful
    /// resolutions are cached.
    pub fn presenter_class(&self, name: &str) -> ResolveResult<String> {
        if let Some(class) = self.cached(name)? {
            trace!(presenter = name, class = %class, "presenter class cached");
            return Ok(class);
        }

        if !is_valid_presenter_name(name) {
            return Err(ResolveError::InvalidName { name: name.to_string() });
        }

        // held until the class is cached so a remap cannot slip in between
        let mapping = self.read_mapping()?;
        let class = mapping.format_presenter_class(name);
        let info = self.registry.get(&class)?.ok_or_else(|| ResolveError::HandlerNotFound {
            name: name.to_string(),
            class: class.clone(),
        })?;
        let class = info.name().to_string();

        if !info.implements_handler() {
            return Err(ResolveError::NotAHandler { name: name.to_string(), class });
        }
        if info.is_abstract() {
            return Err(ResolveError::AbstractHandler { name: name.to_string(), class });
        }

        debug!(presenter = name, class = %class, "resolved presenter class");
        self.cache
            .write()
            .map_err(|_| ResolveError::registry("Failed to acquire write lock on cache"))?
            .insert(name.to_string(), class.clone());
        drop(mapping);
        Ok(class)
    }

    fn cached(&self, name: &str) -> ResolveResult<Option<String>> {
        let cache = self
            .cache
            .read()
            .map_err(|_| ResolveError::registry("Failed to acquire read lock on cache"))?;
        Ok(cache.get(name).cloned())
    }

    /// Resolve `name` and build the presenter through the container. A sole
    /// service of the class is preferred over a fresh instance; injections
    /// run unless the service is tagged `inject`.
    pub fn create_presenter(&self, name: &str) -> Result<Box<dyn RequestHandler>> {
        let class = self.presenter_class(name)?;

        let services = self.container.find_by_type(&class);
        let mut handler = match services.as_slice() {
            [service] => {
                let mut handler = self.container.create_service(service)?;
                if !self.container.find_by_tag(INJECT_TAG).contains(service) {
                    self.container.call_injects(handler.as_mut())?;
                }
                handler
            }
            _ => {
                let mut handler = self.container.create_instance(&class)?;
                self.container.call_injects(handler.as_mut())?;
                handler
            }
        };

        if let Some(presenter) = handler.as_any_mut().downcast_mut::<Presenter>() {
            if presenter.invalid_link_mode().is_none() {
                let mode = self
                    .link_mode
                    .unwrap_or_else(|| InvalidLinkMode::for_debug_mode(self.container.debug_mode()));
                presenter.set_invalid_link_mode(mode);
            }
        }

        debug!(presenter = name, class = %class, "created presenter");
        Ok(handler)
    }
}
