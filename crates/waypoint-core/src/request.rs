// Application request and response descriptors
// The request-handler capability every presenter class must implement

use std::any::Any;

use serde::{Deserialize, Serialize};
use waypoint_error::Result;

use crate::params::ParamMap;
use crate::value::ParamValue;

/// HTTP status codes used by redirects
pub mod http_codes {
    pub const S301_MOVED_PERMANENTLY: u16 = 301;
    pub const S302_FOUND: u16 = 302;
    pub const S303_POST_GET: u16 = 303;
    pub const S307_TEMPORARY_REDIRECT: u16 = 307;
}

/// A request addressed to one presenter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppRequest {
    /// Symbolic presenter name, e.g. `Front:Article`
    pub presenter_name: String,
    /// HTTP method the request arrived with
    pub method: String,
    /// Flat request parameters
    pub params: ParamMap,
}

impl AppRequest {
    /// Create a new GET request for the given presenter
    pub fn new(presenter_name: impl Into<String>) -> Self {
        AppRequest {
            presenter_name: presenter_name.into(),
            method: "GET".to_string(),
            params: ParamMap::new(),
        }
    }

    /// Set the request method
    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Add a request parameter
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<ParamValue>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Replace all request parameters
    pub fn with_params(mut self, params: ParamMap) -> Self {
        self.params = params;
        self
    }

    /// Returns a non-null parameter
    pub fn param(&self, key: &str) -> Option<&ParamValue> {
        self.params.get(key).filter(|value| !value.is_null())
    }
}

/// Outcome of running a request handler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Response {
    /// The handler asked the client to go elsewhere
    Redirect { url: String, code: u16 },
    /// The handler finished; rendering the view is up to the caller
    Rendered { presenter: String, view: String },
}

/// Capability of a class that can serve a request as its root handler
pub trait RequestHandler: Any + Send {
    /// Class name of the handler
    fn class_name(&self) -> &str;

    /// Serve one request
    fn run(&mut self, request: AppRequest) -> Result<Response>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_params_skip_nulls() {
        let request = AppRequest::new("Front:Article")
            .with_method("POST")
            .with_param("id", 5)
            .with_param("tag", ParamValue::Null);

        assert_eq!(request.method, "POST");
        assert_eq!(request.param("id"), Some(&ParamValue::Int(5)));
        assert_eq!(request.param("tag"), None);
        assert_eq!(request.param("missing"), None);
    }
}
