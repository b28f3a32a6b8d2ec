// Component state
// Typed state of a tree node and the persistent field accessors the
// persistence protocol works through

use std::any::Any;
use std::sync::Arc;

use waypoint_core::{ParamMap, ParamValue};
use waypoint_error::StateResult;

use crate::class::ComponentClass;

/// State carried by one node of the component tree
pub trait Component: Any + Send {
    /// Class descriptor of this component
    fn class(&self) -> Arc<ComponentClass>;

    /// Live value of a persistent field, `None` when the field is unknown
    fn persistent_value(&self, _name: &str) -> Option<ParamValue> {
        None
    }

    /// Binds an already coerced value onto a persistent field
    fn bind_persistent(&mut self, _name: &str, _value: ParamValue) -> StateResult<()> {
        Ok(())
    }

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// A component whose persistent fields live in a map, seeded from the
/// declared defaults of its class
#[derive(Debug, Clone)]
pub struct GenericComponent {
    class: Arc<ComponentClass>,
    fields: ParamMap,
}

impl GenericComponent {
    pub fn new(class: Arc<ComponentClass>) -> Self {
        let fields = class
            .persistent_params()
            .iter()
            .map(|p| (p.name.clone(), p.default.clone()))
            .collect();
        GenericComponent { class, fields }
    }

    /// Current value of a field
    pub fn field(&self, name: &str) -> Option<&ParamValue> {
        self.fields.get(name)
    }

    /// Overwrites a field, declared or not
    pub fn set_field(&mut self, name: impl Into<String>, value: impl Into<ParamValue>) {
        self.fields.insert(name.into(), value.into());
    }
}

impl Component for GenericComponent {
    fn class(&self) -> Arc<ComponentClass> {
        self.class.clone()
    }

    fn persistent_value(&self, name: &str) -> Option<ParamValue> {
        self.fields.get(name).cloned()
    }

    fn bind_persistent(&mut self, name: &str, value: ParamValue) -> StateResult<()> {
        self.fields.insert(name.to_string(), value);
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
