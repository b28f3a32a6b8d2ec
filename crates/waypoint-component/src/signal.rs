// Signal dispatch
// Routing inbound signals to registered handler methods and binding their
// arguments from request parameters

use tracing::debug;
use waypoint_core::{LinkArgs, ParamMap, ParamValue};
use waypoint_error::{LinkError, LinkResult, Result, SignalError, StateResult};

use crate::class::{SignalMethod, SIGNAL_METHOD_PREFIX};
use crate::component::Component;
use crate::link;
use crate::root::RequestRoot;
use crate::tree::{ComponentTree, NodeId};

/// What a signal handler sees while it runs
pub struct SignalContext<'a> {
    root: &'a mut dyn RequestRoot,
    node: NodeId,
}

impl<'a> SignalContext<'a> {
    pub fn new(root: &'a mut dyn RequestRoot, node: NodeId) -> Self {
        SignalContext { root, node }
    }

    /// The node receiving the signal
    pub fn node(&self) -> NodeId {
        self.node
    }

    pub fn tree(&self) -> &ComponentTree {
        self.root.tree()
    }

    pub fn tree_mut(&mut self) -> &mut ComponentTree {
        self.root.tree_mut()
    }

    /// The request root, for handlers that act on other components
    pub fn root(&mut self) -> &mut dyn RequestRoot {
        &mut *self.root
    }

    /// Typed state of the receiving component
    pub fn component<T: Component>(&self) -> Option<&T> {
        self.root.tree().downcast::<T>(self.node)
    }

    /// Typed mutable state of the receiving component
    pub fn component_mut<T: Component>(&mut self) -> Option<&mut T> {
        let node = self.node;
        self.root.tree_mut().downcast_mut::<T>(node)
    }

    /// A parameter bound to the receiving component
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.root.tree().param(self.node, key)
    }

    /// Build a link from the receiving component
    pub fn link(&mut self, destination: &str, args: LinkArgs) -> Result<String> {
        link::link(&mut *self.root, self.node, destination, args)
    }

    /// Redirect from the receiving component
    pub fn redirect(&mut self, destination: &str, args: LinkArgs) -> Result<()> {
        link::redirect(&mut *self.root, self.node, destination, args, None)
    }
}

/// Handler method name for a signal; an empty signal has no handler
pub fn format_signal_method(signal: &str) -> Option<String> {
    if signal.is_empty() {
        None
    } else {
        Some(format!("{}{}", SIGNAL_METHOD_PREFIX, signal))
    }
}

/// Call `method` on the node if it is declared and callable, binding its
/// arguments from `params`. Returns whether the method ran.
pub fn try_call(root: &mut dyn RequestRoot, node: NodeId, method: Option<&str>, params: &ParamMap) -> Result<bool> {
    root.tree().check(node)?;
    let method = match method {
        Some(method) => method,
        None => return Ok(false),
    };

    let class = root.tree().class(node);
    let signal_method = match class.method(method) {
        Some(m) if m.callable => m.clone(),
        _ => return Ok(false),
    };

    let args = params_to_args(&signal_method, params)?;
    debug!(class = class.name(), method = %signal_method.name, "calling signal handler");
    let mut context = SignalContext::new(root, node);
    (signal_method.handler)(&mut context, &args)?;
    Ok(true)
}

/// Dispatch `signal` to the node's `handle<signal>` method using the node's
/// bound parameters as arguments
pub fn signal_received(root: &mut dyn RequestRoot, node: NodeId, signal: &str) -> Result<()> {
    root.tree().check(node)?;
    let params = root.tree().params(node).clone();
    let method = format_signal_method(signal);
    if !try_call(root, node, method.as_deref(), &params)? {
        return Err(SignalError::UnhandledSignal {
            signal: signal.to_string(),
            class: root.tree().class(node).name().to_string(),
        }
        .into());
    }
    Ok(())
}

/// Bind handler arguments by name: present values are coerced to the
/// declared type, missing ones take the default or null
pub fn params_to_args(method: &SignalMethod, params: &ParamMap) -> StateResult<Vec<ParamValue>> {
    method
        .params
        .iter()
        .map(|param| match params.get(&param.name) {
            Some(value) if !value.is_null() => match param.param_type {
                Some(param_type) => value.coerce(param_type),
                None => Ok(value.clone()),
            },
            _ => Ok(param.default.clone().unwrap_or_default()),
        })
        .collect()
}

/// Convert positional link arguments into named ones following the
/// handler's parameter order. Typed values equal to their default and empty
/// untyped values become null; a positional argument left over is an error.
pub fn args_to_params(class: &str, method: &SignalMethod, args: &mut LinkArgs) -> LinkResult<()> {
    let mut positional = std::mem::take(&mut args.positional).into_iter();
    let mut consumed = 0;

    for param in &method.params {
        if let Some(value) = positional.next() {
            args.named.insert(param.name.clone(), value);
            consumed += 1;
        } else if !args.named.contains_key(&param.name) {
            continue;
        }

        let value = args.named.get(&param.name).cloned().unwrap_or_default();
        let normalized = match (&param.param_type, &param.default) {
            (Some(param_type), Some(default)) if !default.is_null() => {
                let value = value
                    .coerce(*param_type)
                    .map_err(|e| LinkError::invalid(e.to_string()))?;
                if &value == default {
                    ParamValue::Null
                } else {
                    value
                }
            }
            _ if value.is_empty_text() => ParamValue::Null,
            _ => value,
        };
        args.named.insert(param.name.clone(), normalized);
    }

    if positional.next().is_some() {
        debug!(class, method = %method.name, consumed, "extra positional link argument");
        return Err(LinkError::ExtraParameter {
            class: class.to_string(),
            signal: method
                .name
                .get(SIGNAL_METHOD_PREFIX.len()..)
                .unwrap_or_default()
                .to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::MethodParam;
    use pretty_assertions::assert_eq;

    fn vote_method() -> SignalMethod {
        SignalMethod::new("vote", |_, _| Ok(()))
            .param(MethodParam::required("id"))
            .param(MethodParam::optional("weight", 1))
    }

    #[test]
    fn test_format_signal_method() {
        assert_eq!(format_signal_method("vote").as_deref(), Some("handlevote"));
        assert_eq!(format_signal_method(""), None);
    }

    #[test]
    fn test_params_to_args() {
        let mut params = ParamMap::new();
        params.insert("weight".to_string(), ParamValue::from("3"));
        let args = params_to_args(&vote_method(), &params).unwrap();
        assert_eq!(args, vec![ParamValue::Null, ParamValue::Int(3)]);

        params.insert("id".to_string(), ParamValue::from("abc"));
        params.remove("weight");
        let args = params_to_args(&vote_method(), &params).unwrap();
        assert_eq!(args, vec![ParamValue::from("abc"), ParamValue::Int(1)]);
    }

    #[test]
    fn test_args_to_params_names_positionals() {
        let mut args = LinkArgs::positional([ParamValue::from(7), ParamValue::from("1")]);
        args_to_params("Poll", &vote_method(), &mut args).unwrap();

        assert!(args.positional.is_empty());
        assert_eq!(args.named.get("id"), Some(&ParamValue::Int(7)));
        // equal to the default after coercion
        assert_eq!(args.named.get("weight"), Some(&ParamValue::Null));
    }

    #[test]
    fn test_args_to_params_keeps_named_and_blanks_empty() {
        let mut args = LinkArgs::new().with("id", "").with("weight", "5");
        args_to_params("Poll", &vote_method(), &mut args).unwrap();
        assert_eq!(args.named.get("id"), Some(&ParamValue::Null));
        assert_eq!(args.named.get("weight"), Some(&ParamValue::Int(5)));
    }

    #[test]
    fn test_args_to_params_rejects_extra_positional() {
        let mut args = LinkArgs::positional([1, 2, 3]);
        let err = args_to_params("Poll", &vote_method(), &mut args).unwrap_err();
        assert_eq!(
            err,
            LinkError::ExtraParameter { class: "Poll".to_string(), signal: "vote".to_string() }
        );
    }
}
