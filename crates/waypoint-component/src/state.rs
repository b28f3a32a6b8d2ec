// Persistent state protocol
// Loading request parameters onto components and folding persistent
// fields back into outgoing parameters

use tracing::trace;
use waypoint_core::{ParamMap, ParamValue};
use waypoint_error::{StateError, StateResult};

use crate::class::ComponentClass;
use crate::tree::{ComponentTree, NodeId};

impl ComponentTree {
    /// Replace the node's parameters and bind every persistent field whose
    /// key is present and non-null. Absent keys leave fields untouched.
    pub fn load_state(&mut self, id: NodeId, params: ParamMap) -> StateResult<()> {
        let class = self.class(id);
        let node = self.node_mut(id);

        for param in class.persistent_params() {
            let value = match params.get(&param.name) {
                Some(value) if !value.is_null() => value,
                _ => continue,
            };
            let value = match param.param_type {
                Some(param_type) => value.coerce(param_type)?,
                None => value.clone(),
            };
            trace!(class = class.name(), field = %param.name, %value, "binding persistent field");
            node.component.bind_persistent(&param.name, value)?;
        }

        node.params = params;
        Ok(())
    }

    /// Fold the node's persistent fields into `params`.
    ///
    /// Per field declared on `for_class` (the node's own class by default):
    /// a non-null value already in `params` is kept, an explicit null skips
    /// the field, a field declared since a class the node does not descend
    /// from is skipped, otherwise the live value is read. Values equal to
    /// their typed default, or empty untyped values, are written as null.
    pub fn save_state(
        &self,
        id: NodeId,
        params: &mut ParamMap,
        for_class: Option<&ComponentClass>,
    ) -> StateResult<()> {
        let own_class = self.class(id);
        let class = for_class.unwrap_or(own_class.as_ref());
        let component = self.component(id);

        for param in class.persistent_params() {
            let value = match params.get(&param.name) {
                Some(value) if !value.is_null() => value.clone(),
                Some(_) => continue,
                None => {
                    let visible = param
                        .since
                        .as_deref()
                        .map_or(true, |since| own_class.is_subclass_of(since));
                    if !visible {
                        continue;
                    }
                    component.persistent_value(&param.name).unwrap_or_default()
                }
            };

            if value.is_object() {
                return Err(StateError::NonScalarPersistentValue {
                    class: own_class.name().to_string(),
                    name: param.name.clone(),
                    kind: value.kind().to_string(),
                });
            }

            let value = match param.param_type {
                None if value.is_empty_text() => ParamValue::Null,
                None => value,
                Some(param_type) => {
                    let value = value.coerce(param_type)?;
                    if value == param.default {
                        ParamValue::Null
                    } else {
                        value
                    }
                }
            };
            params.insert(param.name.clone(), value);
        }
        Ok(())
    }

    /// All parameters bound to the node
    pub fn params(&self, id: NodeId) -> &ParamMap {
        &self.node(id).params
    }

    /// A bound non-null parameter
    pub fn param(&self, id: NodeId, key: &str) -> Option<&ParamValue> {
        self.node(id).params.get(key).filter(|value| !value.is_null())
    }

    /// A bound non-null parameter or `default`
    pub fn param_or(&self, id: NodeId, key: &str, default: impl Into<ParamValue>) -> ParamValue {
        self.param(id, key).cloned().unwrap_or_else(|| default.into())
    }
}
