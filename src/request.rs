use http::header::COOKIE;
use http::HeaderMap;

/// Read-only view of an incoming request.
///
/// Construction is total: any method/url pair produces a request. The
/// router never mutates a request after it is built.
#[derive(Debug, Clone, Default)]
pub struct Request {
    method: String,
    origin: String,
    segments: Vec<String>,
    keys: Vec<(String, String)>,
    params: Vec<(String, String)>,
    headers: HeaderMap,
    body: String,
}

impl Request {
    /// Build a request from a method and a relative or absolute URL.
    ///
    /// `http://host/a//b/?x=1#top` yields origin `http://host`, segments
    /// `["a", "b"]` and keys `x=1`. The fragment is dropped.
    pub fn new(method: &str, url: &str) -> Self {
        let url = url.split('#').next().unwrap_or_default();
        let (origin, rest) = split_origin(url);
        let (path, query) = match rest.split_once('?') {
            Some((path, query)) => (path, query),
            None => (rest, ""),
        };
        Self {
            method: method.trim().to_ascii_uppercase(),
            origin: origin.to_string(),
            segments: parse_path(path),
            keys: parse_query(query),
            params: Vec::new(),
            headers: HeaderMap::new(),
            body: String::new(),
        }
    }

    /// Attach decoded form parameters. A repeated name keeps its last value.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (name, value) in params {
            let (name, value) = (name.into(), value.into());
            match self.params.iter_mut().find(|(k, _)| *k == name) {
                Some(slot) => slot.1 = value,
                None => self.params.push((name, value)),
            }
        }
        self
    }

    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers = headers;
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    /// Scheme and authority of an absolute URL, empty for relative ones.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// 1-based path segment, `""` when absent. `0` is treated as `1`.
    pub fn segment(&self, num: usize) -> &str {
        let index = num.saturating_sub(1);
        self.segments.get(index).map_or("", String::as_str)
    }

    pub fn path(&self) -> String {
        self.segments.join("/")
    }

    pub fn query(&self) -> String {
        self.keys
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&")
    }

    pub fn url(&self) -> String {
        let query = self.query();
        if query.is_empty() {
            format!("{}/{}", self.origin, self.path())
        } else {
            format!("{}/{}?{}", self.origin, self.path(), query)
        }
    }

    /// Query parameter value, `""` when absent.
    pub fn key(&self, name: &str) -> &str {
        self.keys
            .iter()
            .find(|(k, _)| k == name)
            .map_or("", |(_, v)| v.as_str())
    }

    pub fn keys(&self) -> &[(String, String)] {
        &self.keys
    }

    /// Form parameter value, `""` when absent.
    pub fn param(&self, name: &str) -> &str {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map_or("", |(_, v)| v.as_str())
    }

    pub fn params(&self) -> &[(String, String)] {
        &self.params
    }

    /// Header value, `""` when absent or not valid UTF-8.
    pub fn header(&self, name: &str) -> &str {
        self.headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// Cookie value from the `Cookie` header(s), `""` when absent.
    pub fn cookie(&self, name: &str) -> &str {
        self.headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .flat_map(|v| v.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(k, _)| *k == name)
            .map_or("", |(_, v)| v)
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// Body parsed as JSON; `Value::Null` when empty or malformed.
    pub fn json(&self) -> serde_json::Value {
        if self.body.is_empty() {
            return serde_json::Value::Null;
        }
        serde_json::from_str(&self.body).unwrap_or_else(|e| {
            tracing::debug!("request: body is not valid json: {}", e);
            serde_json::Value::Null
        })
    }
}

fn split_origin(url: &str) -> (&str, &str) {
    let url = url.trim();
    let scheme_len = if url.starts_with("http://") {
        "http://".len()
    } else if url.starts_with("https://") {
        "https://".len()
    } else {
        return ("", url);
    };
    let end = url[scheme_len..]
        .find(|c: char| c == '/' || c == '?')
        .map_or(url.len(), |i| scheme_len + i);
    url.split_at(end)
}

fn parse_path(path: &str) -> Vec<String> {
    path.trim()
        .split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_query(query: &str) -> Vec<(String, String)> {
    let mut keys: Vec<(String, String)> = Vec::new();
    let normalized = query.trim().trim_matches(|c: char| c == '?' || c == '&');
    for pair in normalized.split('&').filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        match keys.iter_mut().find(|(k, _)| k == name) {
            Some(slot) => slot.1 = value.to_string(),
            None => keys.push((name.to_string(), value.to_string())),
        }
    }
    keys
}
