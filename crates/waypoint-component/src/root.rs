// Request root capability
// The narrow interface components use to reach the presenter that owns
// their tree

use waypoint_core::{AppRequest, ParamMap};
use waypoint_error::{LinkError, LinkResult, Result};

use crate::ajax::AjaxDriver;
use crate::tree::ComponentTree;

/// Capability of the object owning a component tree and serving its request
pub trait RequestRoot {
    /// The component tree
    fn tree(&self) -> &ComponentTree;

    /// The component tree, mutably
    fn tree_mut(&mut self) -> &mut ComponentTree;

    /// Remove and return the global parameters addressed to `unique_id`
    fn pop_global_params(&mut self, unique_id: &str) -> ParamMap;

    /// Build the request a link points to
    fn create_request(&self, origin: &str, target: &str, args: ParamMap, signal: &str) -> Result<AppRequest>;

    /// Materialize a request into a URL
    fn construct_url(&self, request: &AppRequest) -> LinkResult<String>;

    /// Ask the client to continue at `url`
    fn redirect_uri(&mut self, url: &str, code: u16);

    /// Turn a failed link into a fallback value, or hand the error back
    fn handle_invalid_link(&self, error: LinkError) -> LinkResult<String>;

    /// Transport used to wrap links for partial page updates
    fn ajax_driver(&self) -> Option<&dyn AjaxDriver>;
}
