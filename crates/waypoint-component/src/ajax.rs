// AJAX transport
// Wraps already built links for partial page updates

/// Wraps links so the client fetches them asynchronously
pub trait AjaxDriver: Send + Sync {
    /// Wrap a built link; `None` stays `None`
    fn link(&self, url: Option<&str>) -> Option<String>;
}

/// Driver producing an inline script handler, e.g.
/// `return !waypoint.action("/?do=vote", this)`
#[derive(Debug, Clone)]
pub struct ScriptAjaxDriver {
    namespace: String,
}

impl ScriptAjaxDriver {
    pub fn new(namespace: impl Into<String>) -> Self {
        ScriptAjaxDriver { namespace: namespace.into() }
    }
}

impl Default for ScriptAjaxDriver {
    fn default() -> Self {
        Self::new("waypoint")
    }
}

impl AjaxDriver for ScriptAjaxDriver {
    fn link(&self, url: Option<&str>) -> Option<String> {
        // JSON string escaping is valid JavaScript string escaping
        let url = url?;
        let quoted = serde_json::Value::String(url.to_string()).to_string();
        Some(format!("return !{}.action({}, this)", self.namespace, quoted))
    }
}
