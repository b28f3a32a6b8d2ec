// Component class descriptors
// Static tables describing persistent parameters, signal handlers and child
// component factories of a component class

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use waypoint_core::{ParamType, ParamValue};
use waypoint_error::Result;

use crate::component::Component;
use crate::signal::SignalContext;

/// Prefix of signal handler method names
pub const SIGNAL_METHOD_PREFIX: &str = "handle";

/// Function invoked for a signal, with arguments bound in declaration order
pub type SignalHandler = Arc<dyn Fn(&mut SignalContext<'_>, &[ParamValue]) -> Result<()> + Send + Sync>;

/// Function creating a child component on first access
pub type ComponentFactory = Arc<dyn Fn(&str) -> Box<dyn Component> + Send + Sync>;

/// A field of a component that round-trips through generated URLs
#[derive(Debug, Clone, PartialEq)]
pub struct PersistentParam {
    /// Field and URL key name
    pub name: String,
    /// Coercion target; `None` keeps values as they come
    pub param_type: Option<ParamType>,
    /// Declared default, omitted from URLs
    pub default: ParamValue,
    /// Class that declared the field
    pub since: Option<String>,
}

impl PersistentParam {
    /// Declare a persistent field whose type follows its default
    pub fn new(name: impl Into<String>, default: impl Into<ParamValue>) -> Self {
        let default = default.into();
        PersistentParam {
            name: name.into(),
            param_type: default.implied_type(),
            default,
            since: None,
        }
    }

    /// Declare a persistent field without type or default
    pub fn untyped(name: impl Into<String>) -> Self {
        PersistentParam {
            name: name.into(),
            param_type: None,
            default: ParamValue::Null,
            since: None,
        }
    }

    /// Override the coercion target
    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = Some(param_type);
        self
    }

    /// Restrict the field to instances of `class` and its descendants
    pub fn since(mut self, class: impl Into<String>) -> Self {
        self.since = Some(class.into());
        self
    }
}

/// A declared parameter of a signal handler
#[derive(Debug, Clone, PartialEq)]
pub struct MethodParam {
    pub name: String,
    pub param_type: Option<ParamType>,
    /// `None` marks a required parameter
    pub default: Option<ParamValue>,
}

impl MethodParam {
    /// Required parameter without type
    pub fn required(name: impl Into<String>) -> Self {
        MethodParam { name: name.into(), param_type: None, default: None }
    }

    /// Optional parameter; a non-null default also fixes the type
    pub fn optional(name: impl Into<String>, default: impl Into<ParamValue>) -> Self {
        let default = default.into();
        MethodParam {
            name: name.into(),
            param_type: default.implied_type(),
            default: Some(default),
        }
    }

    pub fn with_type(mut self, param_type: ParamType) -> Self {
        self.param_type = Some(param_type);
        self
    }
}

/// A registered signal handler method
#[derive(Clone)]
pub struct SignalMethod {
    /// Method name, e.g. `handleVote`
    pub name: String,
    pub params: Vec<MethodParam>,
    /// Whether the method may be invoked from a request
    pub callable: bool,
    pub handler: SignalHandler,
}

impl SignalMethod {
    /// Register `handler` for `signal`; the method name is derived from it
    pub fn new<F>(signal: &str, handler: F) -> Self
    where
        F: Fn(&mut SignalContext<'_>, &[ParamValue]) -> Result<()> + Send + Sync + 'static,
    {
        SignalMethod {
            name: format!("{}{}", SIGNAL_METHOD_PREFIX, signal),
            params: Vec::new(),
            callable: true,
            handler: Arc::new(handler),
        }
    }

    /// Append a declared parameter
    pub fn param(mut self, param: MethodParam) -> Self {
        self.params.push(param);
        self
    }

    /// Mark the method as declared but not publicly callable
    pub fn hidden(mut self) -> Self {
        self.callable = false;
        self
    }
}

impl fmt::Debug for SignalMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalMethod")
            .field("name", &self.name)
            .field("params", &self.params)
            .field("callable", &self.callable)
            .finish()
    }
}

/// Descriptor of a component class
pub struct ComponentClass {
    name: String,
    parent: Option<Arc<ComponentClass>>,
    /// Own and inherited persistent params, inherited first
    persistent: Vec<PersistentParam>,
    /// Own signal methods keyed by lowercased method name
    methods: BTreeMap<String, SignalMethod>,
    factories: BTreeMap<String, ComponentFactory>,
    signal_receiver: bool,
}

impl ComponentClass {
    /// Start describing a class
    pub fn builder(name: impl Into<String>) -> ComponentClassBuilder {
        ComponentClassBuilder {
            name: name.into(),
            parent: None,
            persistent: Vec::new(),
            methods: Vec::new(),
            factories: BTreeMap::new(),
            signal_receiver: true,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent(&self) -> Option<&Arc<ComponentClass>> {
        self.parent.as_ref()
    }

    /// Whether this class is `class` or one of its descendants
    pub fn is_subclass_of(&self, class: &str) -> bool {
        let mut current = Some(self);
        while let Some(c) = current {
            if c.name == class {
                return true;
            }
            current = c.parent.as_deref();
        }
        false
    }

    /// All persistent params, inherited ones first
    pub fn persistent_params(&self) -> &[PersistentParam] {
        &self.persistent
    }

    pub fn persistent_param(&self, name: &str) -> Option<&PersistentParam> {
        self.persistent.iter().find(|p| p.name == name)
    }

    pub fn has_persistent(&self, name: &str) -> bool {
        self.persistent_param(name).is_some()
    }

    /// Looks a method up by name, ignoring case, own methods first
    pub fn method(&self, name: &str) -> Option<&SignalMethod> {
        let key = name.to_ascii_lowercase();
        let mut current = Some(self);
        while let Some(c) = current {
            if let Some(method) = c.methods.get(&key) {
                return Some(method);
            }
            current = c.parent.as_deref();
        }
        None
    }

    /// Whether the method is both declared and publicly callable
    pub fn is_method_callable(&self, name: &str) -> bool {
        self.method(name).map_or(false, |m| m.callable)
    }

    /// Factory for a lazily created child, own factories first
    pub fn factory(&self, name: &str) -> Option<&ComponentFactory> {
        let mut current = Some(self);
        while let Some(c) = current {
            if let Some(factory) = c.factories.get(name) {
                return Some(factory);
            }
            current = c.parent.as_deref();
        }
        None
    }

    /// Whether instances accept signals
    pub fn is_signal_receiver(&self) -> bool {
        self.signal_receiver
    }
}

impl fmt::Debug for ComponentClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentClass")
            .field("name", &self.name)
            .field("parent", &self.parent.as_ref().map(|p| p.name()))
            .field("persistent", &self.persistent)
            .field("methods", &self.methods.values().map(|m| &m.name).collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`ComponentClass`]
pub struct ComponentClassBuilder {
    name: String,
    parent: Option<Arc<ComponentClass>>,
    persistent: Vec<PersistentParam>,
    methods: Vec<SignalMethod>,
    factories: BTreeMap<String, ComponentFactory>,
    signal_receiver: bool,
}

impl ComponentClassBuilder {
    /// Inherit persistent params, signals and factories from `parent`
    pub fn extends(mut self, parent: Arc<ComponentClass>) -> Self {
        self.parent = Some(parent);
        self
    }

    /// Declare a persistent param
    pub fn persistent(mut self, param: PersistentParam) -> Self {
        self.persistent.push(param);
        self
    }

    /// Register a signal handler
    pub fn signal(mut self, method: SignalMethod) -> Self {
        self.methods.push(method);
        self
    }

    /// Register a factory creating the child `name` on first access
    pub fn component<F>(mut self, name: impl Into<String>, factory: F) -> Self
    where
        F: Fn(&str) -> Box<dyn Component> + Send + Sync + 'static,
    {
        self.factories.insert(name.into(), Arc::new(factory));
        self
    }

    /// Instances ignore signals
    pub fn not_signal_receiver(mut self) -> Self {
        self.signal_receiver = false;
        self
    }

    pub fn build(self) -> Arc<ComponentClass> {
        // inherited declarations win over redeclared ones
        let mut persistent: Vec<PersistentParam> = self
            .parent
            .as_ref()
            .map(|p| p.persistent_params().to_vec())
            .unwrap_or_default();
        for mut param in self.persistent {
            if persistent.iter().any(|p| p.name == param.name) {
                continue;
            }
            if param.since.is_none() {
                param.since = Some(self.name.clone());
            }
            persistent.push(param);
        }

        let methods = self
            .methods
            .into_iter()
            .map(|m| (m.name.to_ascii_lowercase(), m))
            .collect();

        Arc::new(ComponentClass {
            name: self.name,
            parent: self.parent,
            persistent,
            methods,
            factories: self.factories,
            signal_receiver: self.signal_receiver,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn base() -> Arc<ComponentClass> {
        ComponentClass::builder("BaseControl")
            .persistent(PersistentParam::new("page", 1))
            .signal(SignalMethod::new("refresh", |_, _| Ok(())))
            .build()
    }

    #[test]
    fn test_inherited_params_keep_declaring_class() {
        let class = ComponentClass::builder("PollControl")
            .extends(base())
            .persistent(PersistentParam::new("page", 5))
            .persistent(PersistentParam::new("sort", "name"))
            .build();

        let params = class.persistent_params();
        assert_eq!(params.len(), 2);
        assert_eq!(params[0].name, "page");
        assert_eq!(params[0].default, ParamValue::Int(1));
        assert_eq!(params[0].since.as_deref(), Some("BaseControl"));
        assert_eq!(params[1].since.as_deref(), Some("PollControl"));
        assert_eq!(params[1].param_type, Some(ParamType::String));
    }

    #[test]
    fn test_method_lookup_ignores_case_and_walks_parents() {
        let class = ComponentClass::builder("PollControl")
            .extends(base())
            .signal(SignalMethod::new("vote", |_, _| Ok(())))
            .signal(SignalMethod::new("secret", |_, _| Ok(())).hidden())
            .build();

        assert!(class.is_method_callable("handleVote"));
        assert!(class.is_method_callable("HANDLEVOTE"));
        assert!(class.is_method_callable("handleRefresh"));
        assert!(class.method("handleSecret").is_some());
        assert!(!class.is_method_callable("handleSecret"));
        assert!(!class.is_method_callable("handleMissing"));
    }

    #[test]
    fn test_subclass_check() {
        let class = ComponentClass::builder("PollControl").extends(base()).build();
        assert!(class.is_subclass_of("PollControl"));
        assert!(class.is_subclass_of("BaseControl"));
        assert!(!class.is_subclass_of("Presenter"));
    }
}
