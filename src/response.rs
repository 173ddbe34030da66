use http::header::{CONTENT_TYPE, LOCATION};
use http::{HeaderMap, HeaderName, HeaderValue, StatusCode};

/// Response produced by a route handler or the fallback handler.
#[derive(Debug, Clone, Default)]
pub struct Response {
    status: StatusCode,
    headers: HeaderMap,
    body: Option<String>,
    json: Option<serde_json::Value>,
}

impl Response {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set a header, replacing any previous value. Invalid names or values
    /// are skipped with a warning.
    pub fn header(mut self, name: &str, value: &str) -> Self {
        let name = match HeaderName::from_bytes(name.as_bytes()) {
            Ok(n) => n,
            Err(e) => {
                tracing::warn!(header = %name, "response: invalid header name, skipping: {e}");
                return self;
            }
        };
        match HeaderValue::from_str(value) {
            Ok(v) => {
                self.headers.insert(name, v);
            }
            Err(e) => {
                tracing::warn!(header = %name, "response: invalid header value, skipping: {e}");
            }
        }
        self
    }

    /// Text body. Clears any JSON body.
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.json = None;
        self
    }

    /// JSON body. Clears any text body.
    pub fn json(mut self, json: serde_json::Value) -> Self {
        self.json = Some(json);
        self.body = None;
        self
    }

    pub fn redirect(self, url: &str, status: StatusCode) -> Self {
        self.status(status).header(LOCATION.as_str(), url)
    }

    /// Add `content-type: application/json` for JSON bodies that lack one.
    pub fn finish(mut self) -> Self {
        if self.json.is_some() && !self.headers.contains_key(CONTENT_TYPE) {
            self.headers
                .insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn text(&self) -> Option<&str> {
        self.body.as_deref()
    }

    pub fn json_body(&self) -> Option<&serde_json::Value> {
        self.json.as_ref()
    }

    /// Rendered body: the text body, else the serialized JSON, else `""`.
    pub fn body_string(&self) -> String {
        match (&self.body, &self.json) {
            (Some(body), _) => body.clone(),
            (None, Some(json)) => json.to_string(),
            (None, None) => String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let resp = Response::new();
        assert_eq!(resp.status_code(), StatusCode::OK);
        assert!(resp.headers().is_empty());
        assert_eq!(resp.body_string(), "");
    }

    #[test]
    fn test_body_and_json_are_exclusive() {
        let resp = Response::new().json(json!({"a": 1})).body("text");
        assert_eq!(resp.text(), Some("text"));
        assert!(resp.json_body().is_none());

        let resp = Response::new().body("text").json(json!({"a": 1}));
        assert!(resp.text().is_none());
        assert_eq!(resp.body_string(), r#"{"a":1}"#);
    }

    #[test]
    fn test_finish_sets_json_content_type() {
        let resp = Response::new().json(json!([1, 2])).finish();
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/json");

        let resp = Response::new()
            .header("content-type", "application/problem+json")
            .json(json!({}))
            .finish();
        assert_eq!(resp.headers()[CONTENT_TYPE], "application/problem+json");

        let resp = Response::new().body("plain").finish();
        assert!(resp.headers().get(CONTENT_TYPE).is_none());
    }

    #[test]
    fn test_redirect() {
        let resp = Response::new().redirect("/login", StatusCode::FOUND);
        assert_eq!(resp.status_code(), StatusCode::FOUND);
        assert_eq!(resp.headers()[LOCATION], "/login");
    }

    #[test]
    fn test_invalid_header_is_skipped() {
        let resp = Response::new()
            .header("bad header", "x")
            .header("x-ok", "bad\nvalue")
            .header("x-good", "1");
        assert_eq!(resp.headers().len(), 1);
        assert_eq!(resp.headers()["x-good"], "1");
    }
}
