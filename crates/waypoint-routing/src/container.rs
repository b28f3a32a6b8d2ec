// Handler container
// Service definitions and injection hooks used to build presenters

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

use tracing::debug;
use waypoint_core::{ApplicationConfig, RequestHandler};
use waypoint_error::{ResolveError, Result};

use crate::registry::{ClassRegistry, HandlerConstructor};

/// Tag marking services whose injections the container already performs
pub const INJECT_TAG: &str = "inject";

/// Post-construction hook run on every handler built outside a tagged service
pub type Injector = Arc<dyn Fn(&mut dyn RequestHandler) -> Result<()> + Send + Sync>;

/// Dependency container the presenter factory builds handlers through
pub trait HandlerContainer: Send + Sync {
    /// Names of services whose type is `class`
    fn find_by_type(&self, class: &str) -> Vec<String>;

    /// Names of services carrying `tag`
    fn find_by_tag(&self, tag: &str) -> BTreeSet<String>;

    /// Build the service `name`
    fn create_service(&self, name: &str) -> Result<Box<dyn RequestHandler>>;

    /// Build a fresh instance of `class`
    fn create_instance(&self, class: &str) -> Result<Box<dyn RequestHandler>>;

    /// Run injection hooks on `handler`
    fn call_injects(&self, handler: &mut dyn RequestHandler) -> Result<()>;

    /// Whether the application runs in debug mode
    fn debug_mode(&self) -> bool;
}

/// A named service producing handlers of one class
#[derive(Clone)]
pub struct ServiceDefinition {
    class: String,
    tags: BTreeSet<String>,
    factory: HandlerConstructor,
}

impl ServiceDefinition {
    pub fn new<F>(class: impl Into<String>, factory: F) -> Self
    where
        F: Fn() -> Box<dyn RequestHandler> + Send + Sync + 'static,
    {
        ServiceDefinition {
            class: class.into(),
            tags: BTreeSet::new(),
            factory: Arc::new(factory),
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn class(&self) -> &str {
        &self.class
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }
}

impl fmt::Debug for ServiceDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceDefinition")
            .field("class", &self.class)
            .field("tags", &self.tags)
            .finish()
    }
}

/// Container backed by registered service factories and the class registry
pub struct ServiceContainer {
    registry: Arc<ClassRegistry>,
    services: BTreeMap<String, ServiceDefinition>,
    injectors: Vec<Injector>,
    debug_mode: bool,
}

impl ServiceContainer {
    pub fn new(registry: Arc<ClassRegistry>) -> Self {
        ServiceContainer {
            registry,
            services: BTreeMap::new(),
            injectors: Vec::new(),
            debug_mode: false,
        }
    }

    /// Container for `config`'s application section
    pub fn from_config(config: &ApplicationConfig, registry: Arc<ClassRegistry>) -> Self {
        Self::new(registry).with_debug_mode(config.debug_mode)
    }

    pub fn with_debug_mode(mut self, debug_mode: bool) -> Self {
        self.debug_mode = debug_mode;
        self
    }

    /// Register the service `name`
    pub fn with_service(mut self, name: impl Into<String>, service: ServiceDefinition) -> Self {
        self.services.insert(name.into(), service);
        self
    }

    /// Register a hook run by [`call_injects`](HandlerContainer::call_injects)
    pub fn with_injector<F>(mut self, injector: F) -> Self
    where
        F: Fn(&mut dyn RequestHandler) -> Result<()> + Send + Sync + 'static,
    {
        self.injectors.push(Arc::new(injector));
        self
    }

    pub fn registry(&self) -> &Arc<ClassRegistry> {
        &self.registry
    }
}

impl HandlerContainer for ServiceContainer {
    fn find_by_type(&self, class: &str) -> Vec<String> {
        self.services
            .iter()
            .filter(|(_, service)| service.class.eq_ignore_ascii_case(class))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn find_by_tag(&self, tag: &str) -> BTreeSet<String> {
        self.services
            .iter()
            .filter(|(_, service)| service.has_tag(tag))
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn create_service(&self, name: &str) -> Result<Box<dyn RequestHandler>> {
        let service = self.services.get(name).ok_or_else(|| ResolveError::Instantiation {
            class: name.to_string(),
            reason: "service is not registered".to_string(),
        })?;
        debug!(service = name, class = %service.class, "creating service");
        Ok((service.factory)())
    }

    fn create_instance(&self, class: &str) -> Result<Box<dyn RequestHandler>> {
        let info = self.registry.get(class)?.ok_or_else(|| ResolveError::Instantiation {
            class: class.to_string(),
            reason: "class is not registered".to_string(),
        })?;
        debug!(class = info.name(), "creating instance");
        info.instantiate().ok_or_else(|| {
            ResolveError::Instantiation {
                class: info.name().to_string(),
                reason: "class cannot be instantiated".to_string(),
            }
            .into()
        })
    }

    fn call_injects(&self, handler: &mut dyn RequestHandler) -> Result<()> {
        for injector in &self.injectors {
            injector(&mut *handler)?;
        }
        Ok(())
    }

    fn debug_mode(&self) -> bool {
        self.debug_mode
    }
}
