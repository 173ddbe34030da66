pub mod access_log;
pub mod header_gate;

pub use access_log::AccessLog;
pub use header_gate::HeaderGate;

use crate::request::Request;
use crate::response::Response;
use crate::routing::{Handler, Route, Score, NO_MATCH};

/// Cross-cutting hooks attached to routes through groups or endpoints.
///
/// Every hook defaults to a no-op, so implementations override only what
/// they need. Hooks run in registration order, outer groups first.
pub trait Middleware: Send + Sync {
    /// Rewrite the running score of a route that structurally matched.
    fn on_estimated(&self, rate: Score, _request: &Request, _route: &Route) -> Score {
        rate
    }

    /// Wrap or replace the handler before it is invoked.
    fn on_resolving(&self, handler: Handler, _request: &Request, _route: &Route) -> Handler {
        handler
    }

    /// Observe the finished response.
    fn on_resolved(&self, _request: &Request, _response: &Response, _route: &Route) {}
}

/// Shifts a matching route's score by a fixed weight.
///
/// Rejected routes stay rejected, and a boosted score never drops below
/// `NO_MATCH`.
#[derive(Debug, Clone, Copy)]
pub struct Priority(pub i32);

impl Middleware for Priority {
    fn on_estimated(&self, rate: Score, _request: &Request, _route: &Route) -> Score {
        if rate < 0 {
            return rate;
        }
        rate.saturating_add(self.0).max(NO_MATCH)
    }
}
