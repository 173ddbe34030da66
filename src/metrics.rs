use metrics::{describe_counter, Unit};

pub const DISPATCH_TOTAL: &str = "router_dispatch_total";
pub const FALLBACK_TOTAL: &str = "router_fallback_total";
pub const RESOLVED_TOTAL: &str = "router_requests_resolved_total";

/// Register metric descriptions with whichever recorder is installed.
///
/// Without a recorder the `metrics` macros are no-ops, so the library can
/// emit unconditionally.
pub fn describe() {
    describe_counter!(
        DISPATCH_TOTAL,
        Unit::Count,
        "Requests dispatched to a matched route"
    );
    describe_counter!(
        FALLBACK_TOTAL,
        Unit::Count,
        "Requests that matched no route and reached the fallback handler"
    );
    describe_counter!(
        RESOLVED_TOTAL,
        Unit::Count,
        "Requests resolved through the access log middleware"
    );
}
