mod dispatcher;
mod matcher;
mod route;
mod segment;
mod tree;

pub use dispatcher::{Dispatcher, FallbackHandler};
pub use matcher::RouteMatcher;
pub use route::{Handler, Route};
pub use segment::{Score, SegmentKind, SegmentPattern, NO_MATCH};
pub use tree::{Endpoint, Group};
