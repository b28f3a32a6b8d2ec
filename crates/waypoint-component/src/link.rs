// Link construction
// Turning a destination and arguments into a URL through the request root

use tracing::debug;
use waypoint_core::{http_codes, parse_query, LinkArgs, ParamValue};
use waypoint_error::{ensure, Error, LinkError, Result};

use crate::root::RequestRoot;
use crate::signal::{args_to_params, format_signal_method};
use crate::tree::NodeId;

/// Destination meaning "same view, no signal"
pub const THIS_DESTINATION: &str = "this";

/// Build a URL to a signal of `node` (or to `this`).
///
/// Link errors are handed to the request root's invalid link policy; any
/// other error propagates.
pub fn link(root: &mut dyn RequestRoot, node: NodeId, destination: &str, args: LinkArgs) -> Result<String> {
    root.tree().check(node)?;
    root.tree().need_presenter(node)?;

    let (destination, args) = split_destination(destination, args);
    match build_link(root, node, destination, args) {
        Ok(url) => Ok(url),
        Err(Error::Link(error)) => {
            debug!(%error, "invalid link");
            Ok(root.handle_invalid_link(error)?)
        }
        Err(other) => Err(other),
    }
}

/// Strip the query suffix (merged into named args) and signal markers
fn split_destination(destination: &str, mut args: LinkArgs) -> (&str, LinkArgs) {
    let destination = match destination.find('?') {
        Some(pos) => {
            args.named.extend(parse_query(&destination[pos + 1..]));
            &destination[..pos]
        }
        None => destination,
    };
    (destination.trim_end_matches('!'), args)
}

fn build_link(root: &dyn RequestRoot, node: NodeId, destination: &str, mut args: LinkArgs) -> Result<String> {
    let tree = root.tree();
    let class = tree.class(node);

    ensure!(!destination.is_empty(), LinkError::invalid("Signal must be non-empty string."));

    let signal = if destination == THIS_DESTINATION {
        ensure!(
            !args.has_index(0),
            LinkError::ExtraParameter {
                class: class.name().to_string(),
                signal: THIS_DESTINATION.to_string(),
            }
        );
        ""
    } else {
        let method = format_signal_method(destination).unwrap_or_default();
        let signal_method = match class.method(&method) {
            Some(m) if m.callable => m,
            _ => {
                return Err(LinkError::UnknownSignal {
                    class: class.name().to_string(),
                    signal: destination.to_string(),
                }
                .into());
            }
        };
        if !args.is_empty() {
            args_to_params(class.name(), signal_method, &mut args)?;
        }
        destination
    };

    let mut named = args.named;
    if named.keys().any(|key| class.has_persistent(key)) {
        tree.save_state(node, &mut named, None)?;
    }

    let origin = tree.unique_id(node)?;
    let request = root.create_request(&origin, THIS_DESTINATION, named, signal)?;
    Ok(root.construct_url(&request)?)
}

/// Build the link and send the client there
pub fn redirect(
    root: &mut dyn RequestRoot,
    node: NodeId,
    destination: &str,
    args: LinkArgs,
    code: Option<u16>,
) -> Result<()> {
    let url = link(root, node, destination, args)?;
    root.redirect_uri(&url, code.unwrap_or(http_codes::S303_POST_GET));
    Ok(())
}

/// Build the link and wrap it with the root's AJAX driver. A missing
/// destination stays missing.
pub fn ajax_link(
    root: &mut dyn RequestRoot,
    node: NodeId,
    destination: Option<&str>,
    args: LinkArgs,
) -> Result<Option<String>> {
    let url = match destination {
        Some(destination) => Some(link(root, node, destination, args)?),
        None => None,
    };
    let driver = root
        .ajax_driver()
        .ok_or_else(|| Error::internal("AJAX driver is not available."))?;
    Ok(driver.link(url.as_deref()))
}

/// A link built on demand
#[derive(Debug, Clone, PartialEq)]
pub struct Link {
    node: NodeId,
    destination: String,
    args: LinkArgs,
}

impl Link {
    pub fn new(node: NodeId, destination: impl Into<String>, args: LinkArgs) -> Self {
        Link { node, destination: destination.into(), args }
    }

    /// Component the link is built from
    pub fn component(&self) -> NodeId {
        self.node
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    /// Set a named parameter
    pub fn set_param(&mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> &mut Self {
        self.args.named.insert(key.into(), value.into());
        self
    }

    /// A named parameter
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.args.named.get(key)
    }

    /// Build the URL now
    pub fn resolve(&self, root: &mut dyn RequestRoot) -> Result<String> {
        link(root, self.node, &self.destination, self.args.clone())
    }
}

/// Defer building a link until it is rendered
pub fn lazy_link(node: NodeId, destination: &str, args: LinkArgs) -> Link {
    Link::new(node, destination, args)
}
