// Waypoint component model
// Hierarchical components with persistent state, signal dispatch and link
// construction, rooted in a presenter

pub mod ajax;
pub mod class;
pub mod component;
pub mod link;
pub mod presenter;
pub mod root;
pub mod router;
pub mod signal;
pub mod state;
pub mod tree;

pub use ajax::{AjaxDriver, ScriptAjaxDriver};
pub use class::{
    ComponentClass, ComponentClassBuilder, ComponentFactory, MethodParam, PersistentParam, SignalHandler,
    SignalMethod, SIGNAL_METHOD_PREFIX,
};
pub use component::{Component, GenericComponent};
pub use link::{lazy_link, Link, THIS_DESTINATION};
pub use presenter::{PendingRedirect, Presenter, INVALID_LINK_PLACEHOLDER};
pub use root::RequestRoot;
pub use router::{QueryRouter, Router, PRESENTER_KEY};
pub use signal::SignalContext;
pub use tree::{ComponentTree, NodeId};
