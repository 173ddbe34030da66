use super::Middleware;
use crate::metrics::RESOLVED_TOTAL;
use crate::request::Request;
use crate::response::Response;
use crate::routing::{Handler, Route};
use std::sync::Arc;
use std::time::Instant;

/// Logs every resolved request and counts it per route and status.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl Middleware for AccessLog {
    fn on_resolving(&self, handler: Handler, _request: &Request, _route: &Route) -> Handler {
        Arc::new(move |request: &Request, route: &Route| {
            let start = Instant::now();
            let response = handler(request, route);
            tracing::debug!(
                route = %route.name(),
                elapsed_us = start.elapsed().as_micros() as u64,
                "access: handler finished"
            );
            response
        })
    }

    fn on_resolved(&self, request: &Request, response: &Response, route: &Route) {
        let status = response.status_code();
        tracing::info!(
            method = %request.method(),
            path = %request.path(),
            route = %route.name(),
            status = status.as_u16(),
            "access"
        );
        metrics::counter!(
            RESOLVED_TOTAL,
            "route" => route.name().to_string(),
            "status" => status.as_str().to_string(),
        )
        .increment(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routing::RouteMatcher;
    use http::StatusCode;

    #[test]
    fn test_wrapped_handler_preserves_response() {
        let handler: Handler =
            Arc::new(|_: &Request, _: &Route| Response::new().status(StatusCode::CREATED).body("ok"));
        let route = Route::new(
            "POST",
            "create",
            vec![],
            RouteMatcher::default(),
            vec![],
            handler.clone(),
        );
        let request = Request::new("POST", "/");

        let wrapped = AccessLog.on_resolving(handler.clone(), &request, &route);
        assert!(!Arc::ptr_eq(&handler, &wrapped));

        let response = wrapped(&request, &route);
        assert_eq!(response.status_code(), StatusCode::CREATED);
        assert_eq!(response.text(), Some("ok"));
        AccessLog.on_resolved(&request, &response, &route);
    }
}
