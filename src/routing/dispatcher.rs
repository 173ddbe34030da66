use crate::metrics::{DISPATCH_TOTAL, FALLBACK_TOTAL};
use crate::request::Request;
use crate::response::Response;
use crate::routing::route::Route;
use crate::routing::segment::{Score, NO_MATCH};
use crate::routing::tree::Group;
use http::{HeaderMap, StatusCode};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// Handler invoked when no route scores `>= 0`.
pub type FallbackHandler = Arc<dyn Fn(&Request) -> Response + Send + Sync>;

/// The flat route list plus the best-match policy.
///
/// Every dispatch scores all routes in registration order and keeps the
/// first route with the strictly highest score, so ties go to the route
/// registered first. The route list is immutable once built; concurrent
/// dispatches need no coordination.
pub struct Dispatcher {
    routes: Vec<Route>,
    fallback: FallbackHandler,
}

impl Dispatcher {
    pub fn new(routes: Vec<Route>) -> Self {
        Self {
            routes,
            fallback: Arc::new(|_: &Request| Response::new().status(StatusCode::NOT_FOUND)),
        }
    }

    /// Flatten a route tree into a dispatcher.
    pub fn build(root: &Group) -> Self {
        let routes = root.routes();
        tracing::info!("routing: built route table, count={}", routes.len());
        for route in &routes {
            tracing::debug!(
                "routing: compiled route entry, method={}, pattern={}, name={}, groups={:?}",
                route.method(),
                route.matcher(),
                route.name(),
                route.groups(),
            );
        }
        Self::new(routes)
    }

    pub fn fallback<F>(mut self, fallback: F) -> Self
    where
        F: Fn(&Request) -> Response + Send + Sync + 'static,
    {
        self.fallback = Arc::new(fallback);
        self
    }

    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// First route registered under `name`.
    pub fn route(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.name() == name)
    }

    /// Reverse-generate the URL of the route registered under `name`.
    pub fn url_for<K, V>(&self, name: &str, params: &HashMap<K, V>) -> Option<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
    {
        self.route(name)?.url(params)
    }

    /// Pick the best route for `request`, with its score.
    pub fn select(&self, request: &Request) -> Option<(&Route, Score)> {
        let mut best_rate = NO_MATCH;
        let mut best: Option<&Route> = None;

        for route in &self.routes {
            let rate = route.estimate(request);
            tracing::trace!(
                "routing: candidate, method={}, pattern={}, name={}, rate={}",
                route.method(),
                route.matcher(),
                route.name(),
                rate,
            );
            if rate > best_rate {
                best_rate = rate;
                best = Some(route);
            }
        }

        best.map(|route| (route, best_rate))
    }

    /// Build a request and resolve it through the best route or the fallback.
    pub fn dispatch(&self, method: &str, url: &str, headers: HeaderMap) -> Response {
        let request = Request::new(method, url).with_headers(headers);
        self.dispatch_request(&request)
    }

    pub fn dispatch_request(&self, request: &Request) -> Response {
        self.resolve(request).0
    }

    /// Like `dispatch_request`, also reporting which route answered and
    /// its score. `None` means the fallback answered. Routes are scored
    /// once per call.
    pub fn resolve(&self, request: &Request) -> (Response, Option<(&Route, Score)>) {
        match self.select(request) {
            Some((route, rate)) => {
                tracing::debug!(
                    "routing: matched, method={}, path=/{}, route={}, rate={}",
                    request.method(),
                    request.path(),
                    route.name(),
                    rate,
                );
                metrics::counter!(DISPATCH_TOTAL, "route" => route.name().to_string()).increment(1);
                (route.resolve(request), Some((route, rate)))
            }
            None => {
                tracing::debug!(
                    "routing: no route matched, method={}, path=/{}",
                    request.method(),
                    request.path(),
                );
                metrics::counter!(FALLBACK_TOTAL).increment(1);
                ((self.fallback)(request).finish(), None)
            }
        }
    }
}
