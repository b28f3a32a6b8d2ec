// Class registry
// Known presenter classes with the facts name resolution checks: existence,
// canonical spelling, handler capability and instantiability

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use tracing::debug;
use waypoint_core::RequestHandler;
use waypoint_error::{ResolveError, ResolveResult};

/// Builds a fresh handler instance
pub type HandlerConstructor = Arc<dyn Fn() -> Box<dyn RequestHandler> + Send + Sync>;

/// What the registry knows about one class
#[derive(Clone)]
pub struct ClassInfo {
    /// Canonical class name
    name: String,
    is_abstract: bool,
    /// Present for classes implementing the request handler capability
    constructor: Option<HandlerConstructor>,
    /// Present for abstract handlers, which cannot be constructed
    abstract_handler: bool,
}

impl ClassInfo {
    /// A concrete request handler class
    pub fn handler<F>(name: impl Into<String>, constructor: F) -> Self
    where
        F: Fn() -> Box<dyn RequestHandler> + Send + Sync + 'static,
    {
        ClassInfo {
            name: name.into(),
            is_abstract: false,
            constructor: Some(Arc::new(constructor)),
            abstract_handler: false,
        }
    }

    /// An abstract request handler class
    pub fn abstract_handler(name: impl Into<String>) -> Self {
        ClassInfo {
            name: name.into(),
            is_abstract: true,
            constructor: None,
            abstract_handler: true,
        }
    }

    /// A class that is not a request handler
    pub fn plain(name: impl Into<String>) -> Self {
        ClassInfo {
            name: name.into(),
            is_abstract: false,
            constructor: None,
            abstract_handler: false,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_abstract(&self) -> bool {
        self.is_abstract
    }

    /// Whether the class implements the request handler capability
    pub fn implements_handler(&self) -> bool {
        self.constructor.is_some() || self.abstract_handler
    }

    /// Build an instance; `None` for abstract or non-handler classes
    pub fn instantiate(&self) -> Option<Box<dyn RequestHandler>> {
        self.constructor.as_ref().map(|constructor| constructor())
    }
}

impl fmt::Debug for ClassInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassInfo")
            .field("name", &self.name)
            .field("is_abstract", &self.is_abstract)
            .field("implements_handler", &self.implements_handler())
            .finish()
    }
}

/// Registry of classes, looked up by name ignoring ASCII case
#[derive(Debug, Default)]
pub struct ClassRegistry {
    classes: RwLock<HashMap<String, ClassInfo>>,
}

impl ClassRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a class; names differing only in case collide
    pub fn register(&self, info: ClassInfo) -> ResolveResult<()> {
        let key = info.name.to_ascii_lowercase();
        let mut classes = self
            .classes
            .write()
            .map_err(|_| ResolveError::registry("Failed to acquire write lock on classes"))?;

        if let Some(existing) = classes.get(&key) {
            return Err(ResolveError::registry(format!(
                "Class '{}' already registered as '{}'",
                info.name, existing.name
            )));
        }
        debug!(class = %info.name, "registering class");
        classes.insert(key, info);
        Ok(())
    }

    /// Register a class, builder style
    pub fn with_class(self, info: ClassInfo) -> ResolveResult<Self> {
        self.register(info)?;
        Ok(self)
    }

    /// Look a class up by name, ignoring case
    pub fn get(&self, name: &str) -> ResolveResult<Option<ClassInfo>> {
        let classes = self
            .classes
            .read()
            .map_err(|_| ResolveError::registry("Failed to acquire read lock on classes"))?;
        Ok(classes.get(&name.to_ascii_lowercase()).cloned())
    }

    /// Whether the class is known
    pub fn contains(&self, name: &str) -> ResolveResult<bool> {
        Ok(self.get(name)?.is_some())
    }

    /// Number of registered classes
    pub fn len(&self) -> ResolveResult<usize> {
        let classes = self
            .classes
            .read()
            .map_err(|_| ResolveError::registry("Failed to acquire read lock on classes"))?;
        Ok(classes.len())
    }

    pub fn is_empty(&self) -> ResolveResult<bool> {
        Ok(self.len()? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use waypoint_component::{ComponentClass, GenericComponent, Presenter};

    fn article() -> ClassInfo {
        ClassInfo::handler("App\\ArticlePresenter", || {
            let class = ComponentClass::builder("ArticlePresenter").build();
            Box::new(Presenter::new(Box::new(GenericComponent::new(class))))
        })
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry = ClassRegistry::new().with_class(article()).unwrap();

        let info = registry.get("app\\articlepresenter").unwrap().unwrap();
        assert_eq!(info.name(), "App\\ArticlePresenter");
        assert!(info.implements_handler());
        assert!(!info.is_abstract());
        assert!(registry.get("App\\Missing").unwrap().is_none());
        assert_eq!(registry.len().unwrap(), 1);
        assert!(!registry.is_empty().unwrap());
    }

    #[test]
    fn test_poisoned_lock_is_reported() {
        let registry = std::sync::Arc::new(ClassRegistry::new().with_class(article()).unwrap());
        let poisoner = registry.clone();
        let _ = std::thread::spawn(move || {
            let _guard = poisoner.classes.write().unwrap();
            panic!("poison the class table");
        })
        .join();

        assert!(matches!(registry.len(), Err(ResolveError::Registry(_))));
        assert!(registry.is_empty().is_err());
        assert!(registry.get("App\\ArticlePresenter").is_err());
    }

    #[test]
    fn test_duplicate_registration_fails() {
        let registry = ClassRegistry::new().with_class(article()).unwrap();
        let err = registry.register(ClassInfo::plain("APP\\ARTICLEPRESENTER")).unwrap_err();
        assert!(matches!(err, ResolveError::Registry(_)));
    }

    #[test]
    fn test_class_kinds() {
        let base = ClassInfo::abstract_handler("App\\BasePresenter");
        assert!(base.implements_handler());
        assert!(base.is_abstract());
        assert!(base.instantiate().is_none());

        let helper = ClassInfo::plain("App\\Helper");
        assert!(!helper.implements_handler());
        assert!(helper.instantiate().is_none());

        let handler = article().instantiate().unwrap();
        assert_eq!(handler.class_name(), "ArticlePresenter");
    }
}
