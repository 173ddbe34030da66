use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::routing::matcher::RouteMatcher;
use crate::routing::segment::{Score, NO_MATCH};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// The action bound to a route.
pub type Handler = Arc<dyn Fn(&Request, &Route) -> Response + Send + Sync>;

/// One fully compiled endpoint: method, segment patterns, accumulated
/// middleware and handler. Immutable after construction and safe to share
/// across threads.
pub struct Route {
    method: String,
    name: String,
    groups: Vec<String>,
    matcher: RouteMatcher,
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Handler,
}

impl Route {
    pub fn new(
        method: &str,
        name: impl Into<String>,
        groups: Vec<String>,
        matcher: RouteMatcher,
        middleware: Vec<Arc<dyn Middleware>>,
        handler: Handler,
    ) -> Self {
        Self {
            method: method.to_ascii_uppercase(),
            name: name.into(),
            groups,
            matcher,
            middleware,
            handler,
        }
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn groups(&self) -> &[String] {
        &self.groups
    }

    pub fn matcher(&self) -> &RouteMatcher {
        &self.matcher
    }

    pub fn middleware(&self) -> &[Arc<dyn Middleware>] {
        &self.middleware
    }

    /// True when the route belongs to every named group.
    pub fn in_group(&self, groups: &[&str]) -> bool {
        groups.iter().all(|g| self.groups.iter().any(|own| own == g))
    }

    /// Score `request` against this route.
    ///
    /// Returns `NO_MATCH` on a method mismatch or a structural path
    /// mismatch; middleware only sees routes that matched structurally and
    /// may rewrite the score in registration order.
    pub fn estimate(&self, request: &Request) -> Score {
        if request.method() != self.method {
            return NO_MATCH;
        }
        let rate = self.matcher.estimate(request.segments());
        if rate < 0 {
            return NO_MATCH;
        }
        self.middleware
            .iter()
            .fold(rate, |rate, m| m.on_estimated(rate, request, self))
    }

    /// Reverse-generate this route's path; `None` when a value is missing
    /// or fails its segment's match rule.
    pub fn url<K, V>(&self, params: &HashMap<K, V>) -> Option<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
    {
        self.matcher.build_url(params)
    }

    /// Run the handler through the middleware pipeline.
    ///
    /// `on_resolving` wraps the handler in registration order, so the last
    /// registered middleware ends up outermost. `on_resolved` observes the
    /// finished response in registration order.
    pub fn resolve(&self, request: &Request) -> Response {
        let handler = self
            .middleware
            .iter()
            .fold(self.handler.clone(), |handler, m| m.on_resolving(handler, request, self));
        let response = handler(request, self).finish();
        for m in &self.middleware {
            m.on_resolved(request, &response, self);
        }
        response
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("method", &self.method)
            .field("name", &self.name)
            .field("groups", &self.groups)
            .field("pattern", &self.matcher.to_string())
            .field("middleware", &self.middleware.len())
            .finish()
    }
}
