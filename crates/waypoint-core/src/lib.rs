// Waypoint core
// Shared vocabulary of the presenter core: parameter values, request
// descriptors, configuration and tracing setup

pub mod config;
pub mod params;
pub mod request;
pub mod tracing;
pub mod value;

pub use config::{ApplicationConfig, InvalidLinkMode, WaypointConfig};
pub use params::{encode_query, parse_query, LinkArgs, ParamMap};
pub use request::{http_codes, AppRequest, RequestHandler, Response};
pub use value::{ParamType, ParamValue};

/// Separator of component names inside unique ids and global parameter keys
pub const NAME_SEPARATOR: char = '-';

/// Request parameter carrying the `<component path>-<signal>` to dispatch
pub const SIGNAL_KEY: &str = "do";

/// Request parameter carrying the presenter view
pub const VIEW_KEY: &str = "view";

/// View rendered when the request names none
pub const DEFAULT_VIEW: &str = "default";
