use crate::error::RouterError;
use crate::middleware::Middleware;
use crate::request::Request;
use crate::response::Response;
use crate::routing::matcher::{split_template, RouteMatcher};
use crate::routing::route::{Handler, Route};
use crate::routing::segment::SegmentPattern;
use std::sync::Arc;

/// A node of the declared route tree. Groups contribute their name, path
/// segments and middleware to every member below them.
pub struct Group {
    name: String,
    segments: Vec<SegmentPattern>,
    middleware: Vec<Arc<dyn Middleware>>,
    members: Vec<Member>,
}

/// A leaf of the route tree that becomes exactly one `Route`.
pub struct Endpoint {
    method: String,
    name: String,
    segments: Vec<SegmentPattern>,
    middleware: Vec<Arc<dyn Middleware>>,
    handler: Handler,
}

enum Member {
    Group(Group),
    Endpoint(Endpoint),
}

/// Properties accumulated while walking down the tree.
#[derive(Default, Clone)]
struct Inherited {
    groups: Vec<String>,
    segments: Vec<SegmentPattern>,
    middleware: Vec<Arc<dyn Middleware>>,
}

impl Group {
    /// The unnamed, pathless top of a route tree.
    pub fn root() -> Self {
        Self {
            name: String::new(),
            segments: Vec::new(),
            middleware: Vec::new(),
            members: Vec::new(),
        }
    }

    pub fn new(path: &str) -> Result<Self, RouterError> {
        Ok(Self {
            segments: compile_path(path)?,
            ..Self::root()
        })
    }

    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    /// Add a nested group populated by `build`, returning it for further
    /// configuration.
    pub fn group<F>(&mut self, path: &str, build: F) -> Result<&mut Group, RouterError>
    where
        F: FnOnce(&mut Group) -> Result<(), RouterError>,
    {
        let mut group = Group::new(path)?;
        build(&mut group)?;
        self.members.push(Member::Group(group));
        match self.members.last_mut() {
            Some(Member::Group(group)) => Ok(group),
            _ => unreachable!("group was just pushed"),
        }
    }

    /// Add an endpoint for `method` at `path`.
    pub fn route<H>(&mut self, method: &str, path: &str, handler: H) -> Result<&mut Endpoint, RouterError>
    where
        H: Fn(&Request, &Route) -> Response + Send + Sync + 'static,
    {
        self.route_handler(method, path, Arc::new(handler))
    }

    /// Like `route`, for handlers that are already shared.
    pub fn route_handler(
        &mut self,
        method: &str,
        path: &str,
        handler: Handler,
    ) -> Result<&mut Endpoint, RouterError> {
        let method = validate_method(method)?;
        let endpoint = Endpoint {
            method,
            name: String::new(),
            segments: compile_path(path)?,
            middleware: Vec::new(),
            handler,
        };
        self.members.push(Member::Endpoint(endpoint));
        match self.members.last_mut() {
            Some(Member::Endpoint(endpoint)) => Ok(endpoint),
            _ => unreachable!("endpoint was just pushed"),
        }
    }

    /// Flatten the tree into routes, depth-first in declaration order.
    pub fn routes(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        self.collect(&Inherited::default(), &mut routes);
        routes
    }

    fn collect(&self, parent: &Inherited, routes: &mut Vec<Route>) {
        let props = self.join(parent);
        for member in &self.members {
            match member {
                Member::Group(group) => group.collect(&props, routes),
                Member::Endpoint(endpoint) => routes.push(endpoint.to_route(&props)),
            }
        }
    }

    fn join(&self, parent: &Inherited) -> Inherited {
        let mut props = parent.clone();
        if !self.name.is_empty() {
            props.groups.push(self.name.clone());
        }
        props.segments.extend(self.segments.iter().cloned());
        props.middleware.extend(self.middleware.iter().cloned());
        props
    }
}

impl Endpoint {
    pub fn name(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = name.into();
        self
    }

    pub fn middleware<M: Middleware + 'static>(&mut self, middleware: M) -> &mut Self {
        self.middleware.push(Arc::new(middleware));
        self
    }

    fn to_route(&self, parent: &Inherited) -> Route {
        let segments = parent
            .segments
            .iter()
            .chain(&self.segments)
            .cloned()
            .collect();
        let middleware = parent
            .middleware
            .iter()
            .chain(&self.middleware)
            .cloned()
            .collect();
        Route::new(
            &self.method,
            self.name.clone(),
            parent.groups.clone(),
            RouteMatcher::new(segments),
            middleware,
            self.handler.clone(),
        )
    }
}

fn compile_path(path: &str) -> Result<Vec<SegmentPattern>, RouterError> {
    split_template(path).map(SegmentPattern::compile).collect()
}

fn validate_method(method: &str) -> Result<String, RouterError> {
    let upper = method.trim().to_ascii_uppercase();
    if upper.is_empty() || http::Method::from_bytes(upper.as_bytes()).is_err() {
        return Err(RouterError::InvalidMethod(method.to_string()));
    }
    Ok(upper)
}
