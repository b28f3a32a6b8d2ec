// Presenter
// Root of a component tree: owns the tree, serves one request, partitions
// its parameters among components and materializes links

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use tracing::{debug, warn};
use waypoint_core::params::partition_global_params;
use waypoint_core::{
    AppRequest, InvalidLinkMode, LinkArgs, ParamMap, ParamValue, RequestHandler, Response,
    DEFAULT_VIEW, NAME_SEPARATOR, SIGNAL_KEY, VIEW_KEY,
};
use waypoint_error::{bail, ensure, LinkError, LinkResult, Result, SignalError};

use crate::ajax::AjaxDriver;
use crate::component::Component;
use crate::link::{self, Link, THIS_DESTINATION};
use crate::root::RequestRoot;
use crate::router::{QueryRouter, Router};
use crate::signal;
use crate::tree::{self, ComponentTree, NodeId};

/// Placeholder substituted for invalid links
pub const INVALID_LINK_PLACEHOLDER: &str = "#";

/// A redirect requested while serving the request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRedirect {
    pub url: String,
    pub code: u16,
}

/// Root of a component tree and handler of one request
pub struct Presenter {
    tree: ComponentTree,
    root: NodeId,
    name: String,
    view: String,
    request: Option<AppRequest>,
    global_params: BTreeMap<String, ParamMap>,
    /// Signal of the current request as `(receiver id, signal)`
    signal: Option<(String, String)>,
    invalid_link_mode: Option<InvalidLinkMode>,
    router: Arc<dyn Router>,
    base_url: String,
    ajax_driver: Option<Box<dyn AjaxDriver>>,
    redirect: Option<PendingRedirect>,
}

impl Presenter {
    /// Create a presenter whose own state is `component`
    pub fn new(component: Box<dyn Component>) -> Self {
        let class_name = component.class().name().to_string();
        let (tree, root) = ComponentTree::with_request_root(class_name.clone(), component);
        Presenter {
            tree,
            root,
            name: class_name,
            view: DEFAULT_VIEW.to_string(),
            request: None,
            global_params: BTreeMap::new(),
            signal: None,
            invalid_link_mode: None,
            router: Arc::new(QueryRouter::new()),
            base_url: "/".to_string(),
            ajax_driver: None,
            redirect: None,
        }
    }

    /// Use `router` to construct URLs
    pub fn with_router(mut self, router: Arc<dyn Router>) -> Self {
        self.router = router;
        self
    }

    /// Base URL links are relative to
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_ajax_driver(mut self, driver: Box<dyn AjaxDriver>) -> Self {
        self.ajax_driver = Some(driver);
        self
    }

    pub fn with_invalid_link_mode(mut self, mode: InvalidLinkMode) -> Self {
        self.invalid_link_mode = Some(mode);
        self
    }

    /// Node holding the presenter's own state
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Symbolic name of the presenter, e.g. `Front:Article`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn view(&self) -> &str {
        &self.view
    }

    pub fn request(&self) -> Option<&AppRequest> {
        self.request.as_ref()
    }

    /// Signal of the current request as `(receiver id, signal)`
    pub fn signal(&self) -> Option<(&str, &str)> {
        self.signal.as_ref().map(|(id, signal)| (id.as_str(), signal.as_str()))
    }

    pub fn invalid_link_mode(&self) -> Option<InvalidLinkMode> {
        self.invalid_link_mode
    }

    pub fn set_invalid_link_mode(&mut self, mode: InvalidLinkMode) {
        self.invalid_link_mode = Some(mode);
    }

    pub fn redirect_target(&self) -> Option<&PendingRedirect> {
        self.redirect.as_ref()
    }

    /// Add a component beneath `parent`, loading its state if the request
    /// already delivered parameters for it
    pub fn add_component(&mut self, parent: NodeId, name: &str, component: Box<dyn Component>) -> Result<NodeId> {
        tree::add_component(self, parent, name, component)
    }

    /// Resolve a `-` separated component path, creating components lazily
    pub fn component(&mut self, path: &str, need: bool) -> Result<Option<NodeId>> {
        let root = self.root;
        tree::get_component(self, root, path, need)
    }

    pub fn link(&mut self, node: NodeId, destination: &str, args: LinkArgs) -> Result<String> {
        link::link(self, node, destination, args)
    }

    pub fn lazy_link(&self, node: NodeId, destination: &str, args: LinkArgs) -> Link {
        link::lazy_link(node, destination, args)
    }

    pub fn ajax_link(&mut self, node: NodeId, destination: Option<&str>, args: LinkArgs) -> Result<Option<String>> {
        link::ajax_link(self, node, destination, args)
    }

    pub fn redirect(&mut self, node: NodeId, destination: &str, args: LinkArgs, code: Option<u16>) -> Result<()> {
        link::redirect(self, node, destination, args, code)
    }

    pub fn signal_received(&mut self, node: NodeId, signal: &str) -> Result<()> {
        signal::signal_received(self, node, signal)
    }

    /// Split the request parameters into per-component slices and pull out
    /// the view and the signal
    fn init_global_params(&mut self, request: &AppRequest) {
        self.global_params = partition_global_params(&request.params);
        let own = self.global_params.entry(String::new()).or_default();

        self.view = own
            .remove(VIEW_KEY)
            .and_then(|view| view.as_text())
            .filter(|view| !view.is_empty())
            .unwrap_or_else(|| DEFAULT_VIEW.to_string());

        // `do` only ever belongs to the presenter; `a-b-do` is not a signal.
        // An empty signal name means no signal at all.
        self.signal = own
            .remove(SIGNAL_KEY)
            .and_then(|signal| signal.as_text())
            .map(|signal| match signal.rfind(NAME_SEPARATOR) {
                Some(pos) => (signal[..pos].to_string(), signal[pos + 1..].to_string()),
                None => (String::new(), signal),
            })
            .filter(|(_, signal)| !signal.is_empty());
    }

    /// Load state of every component already attached, parents first
    fn load_attached_state(&mut self) -> Result<()> {
        for node in self.tree.descendants(self.root) {
            let unique_id = self.tree.unique_id(node)?;
            let params = self.pop_global_params(&unique_id);
            self.tree.load_state(node, params)?;
        }
        Ok(())
    }

    fn process_signal(&mut self) -> Result<()> {
        let (receiver, signal) = match self.signal.clone() {
            Some(signal) => signal,
            None => return Ok(()),
        };

        let node = match self.component(&receiver, false)? {
            Some(node) => node,
            None => {
                bail!(SignalError::BadSignal(format!(
                    "The signal receiver component '{}' is not found.",
                    receiver
                )));
            }
        };
        ensure!(
            self.tree.class(node).is_signal_receiver(),
            SignalError::BadSignal(format!(
                "The signal receiver component '{}' does not accept signals.",
                receiver
            ))
        );

        debug!(receiver = %receiver, signal = %signal, "processing signal");
        self.signal_received(node, &signal)
    }

    fn prefixed(id: &str, key: &str) -> String {
        if id.is_empty() {
            key.to_string()
        } else {
            format!("{}{}{}", id, NAME_SEPARATOR, key)
        }
    }
}

impl RequestRoot for Presenter {
    fn tree(&self) -> &ComponentTree {
        &self.tree
    }

    fn tree_mut(&mut self) -> &mut ComponentTree {
        &mut self.tree
    }

    fn pop_global_params(&mut self, unique_id: &str) -> ParamMap {
        self.global_params.remove(unique_id).unwrap_or_default()
    }

    fn create_request(&self, origin: &str, target: &str, args: ParamMap, signal: &str) -> Result<AppRequest> {
        let same_presenter = target == THIS_DESTINATION;
        let presenter_name = if same_presenter {
            self.name.clone()
        } else {
            target.trim_start_matches(':').to_string()
        };

        let mut params = ParamMap::new();
        let origin_node = self.tree.find(self.root, origin);

        if same_presenter {
            // persistent state of every attached component travels along
            for node in self.tree.descendants(self.root) {
                if Some(node) == origin_node {
                    continue;
                }
                let mut state = ParamMap::new();
                self.tree.save_state(node, &mut state, None)?;
                let id = self.tree.unique_id(node)?;
                for (key, value) in state.into_iter().filter(|(_, v)| !v.is_null()) {
                    params.insert(Self::prefixed(&id, &key), value);
                }
            }
            if self.view != DEFAULT_VIEW {
                params.insert(VIEW_KEY.to_string(), ParamValue::from(self.view.as_str()));
            }
        }

        let mut args = args;
        if let (true, Some(node)) = (same_presenter, origin_node) {
            self.tree.save_state(node, &mut args, None)?;
        }
        for (key, value) in args.into_iter().filter(|(_, v)| !v.is_null()) {
            params.insert(Self::prefixed(origin, &key), value);
        }

        if !signal.is_empty() {
            params.insert(SIGNAL_KEY.to_string(), ParamValue::from(Self::prefixed(origin, signal)));
        }

        Ok(AppRequest::new(presenter_name).with_params(params))
    }

    fn construct_url(&self, request: &AppRequest) -> LinkResult<String> {
        self.router
            .construct_url(request, &self.base_url)
            .ok_or_else(|| LinkError::invalid(format!("No route for {}.", request.presenter_name)))
    }

    fn redirect_uri(&mut self, url: &str, code: u16) {
        debug!(url, code, "redirecting");
        self.redirect = Some(PendingRedirect { url: url.to_string(), code });
    }

    fn handle_invalid_link(&self, error: LinkError) -> LinkResult<String> {
        match self.invalid_link_mode {
            Some(InvalidLinkMode::Silent) => Ok(INVALID_LINK_PLACEHOLDER.to_string()),
            Some(InvalidLinkMode::Warning) => {
                let message = format!("Invalid link: {}", error);
                warn!(presenter = %self.name, "{}", message);
                Ok(format!("{}error: {}", INVALID_LINK_PLACEHOLDER, message))
            }
            Some(InvalidLinkMode::Exception) | None => Err(error),
        }
    }

    fn ajax_driver(&self) -> Option<&dyn AjaxDriver> {
        self.ajax_driver.as_deref()
    }
}

impl RequestHandler for Presenter {
    fn class_name(&self) -> &str {
        self.tree.name(self.root)
    }

    fn run(&mut self, request: AppRequest) -> Result<Response> {
        debug!(presenter = %request.presenter_name, method = %request.method, "running presenter");
        self.name = request.presenter_name.clone();
        self.redirect = None;
        self.init_global_params(&request);
        self.request = Some(request);

        self.load_attached_state()?;
        self.process_signal()?;

        Ok(match &self.redirect {
            Some(redirect) => Response::Redirect { url: redirect.url.clone(), code: redirect.code },
            None => Response::Rendered { presenter: self.name.clone(), view: self.view.clone() },
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}
