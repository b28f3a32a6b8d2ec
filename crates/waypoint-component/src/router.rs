// URL construction
// Routers turn request descriptors into URLs for the presenter

use std::collections::BTreeSet;

use waypoint_core::{encode_query, AppRequest};

/// Builds URLs for application requests
pub trait Router: Send + Sync {
    /// URL of `request` relative to `base_url`, or `None` when no route fits
    fn construct_url(&self, request: &AppRequest, base_url: &str) -> Option<String>;
}

/// Router that keeps the presenter name and every parameter in the query
/// string: `base?presenter=Front:Article&id=5`
#[derive(Debug, Clone, Default)]
pub struct QueryRouter {
    /// Presenters this router accepts; empty accepts all
    presenters: BTreeSet<String>,
}

/// Query key carrying the presenter name
pub const PRESENTER_KEY: &str = "presenter";

impl QueryRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict the router to the given presenters
    pub fn only<I, S>(presenters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        QueryRouter {
            presenters: presenters.into_iter().map(Into::into).collect(),
        }
    }
}

impl Router for QueryRouter {
    fn construct_url(&self, request: &AppRequest, base_url: &str) -> Option<String> {
        if !self.presenters.is_empty() && !self.presenters.contains(&request.presenter_name) {
            return None;
        }

        let mut params = request.params.clone();
        params.insert(PRESENTER_KEY.to_string(), request.presenter_name.clone().into());
        let query = encode_query(&params);

        let separator = if base_url.contains('?') { '&' } else { '?' };
        Some(format!("{}{}{}", base_url, separator, query))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_query_router() {
        let request = AppRequest::new("Front:Article").with_param("id", 5);
        let router = QueryRouter::new();
        assert_eq!(
            router.construct_url(&request, "/").as_deref(),
            Some("/?id=5&presenter=Front%3AArticle")
        );
        assert_eq!(
            router.construct_url(&request, "/index.php?lang=en").as_deref(),
            Some("/index.php?lang=en&id=5&presenter=Front%3AArticle")
        );
    }

    #[test]
    fn test_restricted_router() {
        let router = QueryRouter::only(["Front:Home"]);
        assert!(router.construct_url(&AppRequest::new("Front:Article"), "/").is_none());
        assert!(router.construct_url(&AppRequest::new("Front:Home"), "/").is_some());
    }
}
