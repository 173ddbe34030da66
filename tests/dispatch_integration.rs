//! End-to-end tests through the public API: build a route tree (in code or
//! from a config file), dispatch requests, and check the chosen handler.
//!
//! Run with: `cargo test --test dispatch_integration`

use http::{HeaderMap, HeaderValue, StatusCode};
use std::collections::HashMap;
use std::sync::Arc;
use subway_router::config::RouterConfig;
use subway_router::middleware::{Middleware, Priority};
use subway_router::routing::{Dispatcher, Group, Route, Score, NO_MATCH};
use subway_router::{Request, Response, RouterError};

fn named(tag: &'static str) -> impl Fn(&Request, &Route) -> Response + Send + Sync + 'static {
    move |_: &Request, route: &Route| Response::new().body(format!("{}:{}", tag, route.name()))
}

fn get(dispatcher: &Dispatcher, url: &str) -> String {
    dispatcher.dispatch("GET", url, HeaderMap::new()).body_string()
}

/// A small blog-like site exercising every segment kind.
fn site() -> Dispatcher {
    let mut root = Group::root();
    root.route("GET", "", named("page")).unwrap().name("home");
    root.group("posts", |posts| {
        posts.name("posts");
        posts.route("GET", "", named("list"))?.name("post-list");
        posts.route("GET", "{id:i}", named("show"))?.name("post");
        posts.route("GET", "{slug:a}", named("show"))?.name("post-by-slug");
        posts
            .route("GET", "{year:[0-9]{4}}/{month:[0-9]{2}}?", named("archive"))?
            .name("archive");
        posts.route("POST", "", named("create"))?.name("post-create");
        Ok(())
    })
    .unwrap();
    root.route("GET", "files/{path}/{rest}?/{more}?", named("files"))
        .unwrap()
        .name("files");
    Dispatcher::build(&root)
}

#[test]
fn test_most_specific_route_wins() {
    let d = site();
    assert_eq!(get(&d, "/"), "page:home");
    assert_eq!(get(&d, "/posts"), "list:post-list");
    assert_eq!(get(&d, "/posts/42"), "show:post");
    assert_eq!(get(&d, "/posts/hello"), "show:post-by-slug");
    // "2024" also satisfies {id:i}; integer and pattern score alike, so the
    // earlier registration wins.
    assert_eq!(get(&d, "/posts/2024"), "show:post");
    assert_eq!(get(&d, "/posts/2024/05"), "archive:archive");
    assert_eq!(get(&d, "/files/a/b/c"), "files:files");
    assert_eq!(
        d.dispatch("POST", "/posts", HeaderMap::new()).body_string(),
        "create:post-create"
    );
}

#[test]
fn test_query_string_does_not_affect_matching() {
    let d = site();
    assert_eq!(get(&d, "/posts/42?draft=1#top"), "show:post");
}

#[test]
fn test_unmatched_request_falls_back() {
    let d = site();
    let resp = d.dispatch("PUT", "/posts/1", HeaderMap::new());
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(resp.body_string(), "");
}

#[test]
fn test_handler_sees_request_details() {
    let mut root = Group::root();
    root.route("POST", "orders/{id:i}", |req: &Request, route: &Route| {
        Response::new().json(serde_json::json!({
            "route": route.name(),
            "id": req.segment(2),
            "page": req.key("page"),
            "token": req.header("x-token"),
            "session": req.cookie("sid"),
            "qty": req.json()["qty"],
            "note": req.param("note"),
        }))
    })
    .unwrap()
    .name("order");
    let d = Dispatcher::build(&root);

    let mut headers = HeaderMap::new();
    headers.insert("x-token", HeaderValue::from_static("abc"));
    headers.insert("cookie", HeaderValue::from_static("theme=dark; sid=s1"));
    let request = Request::new("POST", "http://shop.test/orders/9?page=2")
        .with_headers(headers)
        .with_body(r#"{"qty": 3}"#)
        .with_params([("note", "gift wrap")]);

    let resp = d.dispatch_request(&request);
    let body = resp.json_body().unwrap();
    assert_eq!(body["route"], "order");
    assert_eq!(body["id"], "9");
    assert_eq!(body["page"], "2");
    assert_eq!(body["token"], "abc");
    assert_eq!(body["session"], "s1");
    assert_eq!(body["qty"], 3);
    assert_eq!(body["note"], "gift wrap");
    assert_eq!(resp.headers()["content-type"], "application/json");
}

#[test]
fn test_custom_middleware_gates_routes() {
    /// Only admits requests carrying an `x-admin` header.
    struct AdminOnly;
    impl Middleware for AdminOnly {
        fn on_estimated(&self, rate: Score, request: &Request, _: &Route) -> Score {
            if request.header("x-admin").is_empty() {
                NO_MATCH
            } else {
                rate
            }
        }
    }

    let mut root = Group::root();
    root.group("dash", |dash| {
        dash.middleware(AdminOnly).middleware(Priority(1));
        dash.route("GET", "{section}", named("admin"))?.name("admin");
        Ok(())
    })
    .unwrap();
    root.route("GET", "dash/{section}", named("public"))
        .unwrap()
        .name("public");
    let d = Dispatcher::build(&root);

    assert_eq!(get(&d, "/dash/stats"), "public:public");

    let mut headers = HeaderMap::new();
    headers.insert("x-admin", HeaderValue::from_static("1"));
    assert_eq!(
        d.dispatch("GET", "/dash/stats", headers).body_string(),
        "admin:admin"
    );
}

#[test]
fn test_reverse_urls() {
    let d = site();
    let empty: HashMap<&str, &str> = HashMap::new();
    assert_eq!(d.url_for("home", &empty).as_deref(), Some("/"));
    assert_eq!(d.url_for("post-list", &empty).as_deref(), Some("/posts"));

    let params: HashMap<&str, &str> = [("id", "7")].into_iter().collect();
    assert_eq!(d.url_for("post", &params).as_deref(), Some("/posts/7"));

    let params: HashMap<&str, &str> = [("id", "seven")].into_iter().collect();
    assert_eq!(d.url_for("post", &params), None);

    let params: HashMap<&str, &str> = [("year", "2024")].into_iter().collect();
    assert_eq!(d.url_for("archive", &params).as_deref(), Some("/posts/2024"));
    let params: HashMap<&str, &str> = [("year", "2024"), ("month", "5")].into_iter().collect();
    assert_eq!(d.url_for("archive", &params), None);
}

#[test]
fn test_registration_errors() {
    let mut root = Group::root();
    assert!(matches!(
        root.route("GET", "a/{x:[}", named("bad")),
        Err(RouterError::InvalidPattern { .. })
    ));
    assert!(matches!(
        root.route("GET", "a/{}", named("bad")),
        Err(RouterError::InvalidSegment(_))
    ));
    assert!(matches!(
        root.route("NOT A METHOD", "a", named("bad")),
        Err(RouterError::InvalidMethod(_))
    ));
}

#[test]
fn test_concurrent_dispatch() {
    let d = Arc::new(site());
    std::thread::scope(|s| {
        for i in 0..8 {
            let d = d.clone();
            s.spawn(move || {
                for _ in 0..100 {
                    assert_eq!(get(&d, &format!("/posts/{}", i)), "show:post");
                    assert_eq!(get(&d, "/posts/hello"), "show:post-by-slug");
                }
            });
        }
    });
}

#[test]
fn test_dispatcher_from_config_file() {
    let toml = r#"
[fallback]
status = 404
json = { error = "not found" }

[[routes]]
type = "group"
name = "v2"
path = "/v2/"

  [[routes.headers]]
  name = "x-env"
  value = "canary"

  [[routes.members]]
  type = "endpoint"
  method = "GET"
  path = "ping"
  name = "ping-v2"
  response = { body = "pong v2" }

[[routes]]
type = "endpoint"
method = "GET"
path = "v2/ping"
name = "ping"
response = { body = "pong", headers = { "x-served-by" = "stable" } }
"#;
    let path = std::env::temp_dir().join(format!("subway_integration_{}.toml", std::process::id()));
    std::fs::write(&path, toml).unwrap();
    let config = RouterConfig::load(&path).unwrap();
    std::fs::remove_file(&path).ok();

    let d = config.build_dispatcher().unwrap();

    let resp = d.dispatch("GET", "/v2/ping", HeaderMap::new());
    assert_eq!(resp.body_string(), "pong");
    assert_eq!(resp.headers()["x-served-by"], "stable");

    // Both routes score the same; the header-gated group is registered first.
    let mut headers = HeaderMap::new();
    headers.insert("x-env", HeaderValue::from_static("canary"));
    assert_eq!(d.dispatch("GET", "/v2/ping", headers).body_string(), "pong v2");

    let resp = d.dispatch("GET", "/v3/ping", HeaderMap::new());
    assert_eq!(resp.status_code(), StatusCode::NOT_FOUND);
    assert_eq!(resp.json_body().unwrap()["error"], "not found");
}
