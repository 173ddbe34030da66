//! Score-based request router.
//!
//! Routes are declared as a tree of groups and endpoints whose paths are
//! built from literal, typed, regex-constrained and optional segments. The
//! tree is flattened once into an immutable [`routing::Dispatcher`], which
//! scores every route against each request and resolves the most specific
//! match through its middleware pipeline.
//!
//! ```
//! use subway_router::routing::{Dispatcher, Group};
//! use subway_router::Response;
//!
//! let mut root = Group::root();
//! root.route("GET", "users/{id:i}/{tab}?", |req, _route| {
//!     Response::new().body(format!("user {}", req.segment(2)))
//! })
//! .unwrap()
//! .name("user");
//!
//! let dispatcher = Dispatcher::build(&root);
//! let resp = dispatcher.dispatch("GET", "/users/42", http::HeaderMap::new());
//! assert_eq!(resp.body_string(), "user 42");
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod request;
pub mod response;
pub mod routing;

pub use error::RouterError;
pub use request::Request;
pub use response::Response;
