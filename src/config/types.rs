use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Treat an explicit `null` the same as a missing field.
fn deserialize_null_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Top-level router configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RouterConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Response served when no route matches.
    #[serde(default = "default_fallback")]
    pub fallback: ResponseConfig,

    /// Top-level members of the route tree, in registration order.
    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub routes: Vec<MemberConfig>,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            fallback: default_fallback(),
            routes: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directive. `RUST_LOG` takes precedence when set.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// "text" (default) or "json".
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Attach the access log middleware to every route.
    #[serde(default)]
    pub access_log: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            access_log: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "text".to_string()
}

fn default_fallback() -> ResponseConfig {
    ResponseConfig {
        status: Some(404),
        ..ResponseConfig::default()
    }
}

/// A node of the declared route tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MemberConfig {
    Group(GroupConfig),
    Endpoint(EndpointConfig),
}

/// Groups prefix their path, name and matchers onto every member below.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupConfig {
    /// Group name, recorded in each member route's group list. Empty groups
    /// are anonymous.
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub path: String,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub headers: Vec<HeaderMatcher>,

    /// Added to the score of every matching member route.
    #[serde(default)]
    pub priority: i32,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub members: Vec<MemberConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EndpointConfig {
    pub method: String,

    /// Segment template, e.g. `users/{id:i}/{tab}?`.
    #[serde(default)]
    pub path: String,

    /// Route name used for reverse URL generation.
    #[serde(default)]
    pub name: String,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub headers: Vec<HeaderMatcher>,

    #[serde(default)]
    pub priority: i32,

    #[serde(default)]
    pub response: ResponseConfig,
}

/// Header condition attached to a group or endpoint.
///
/// Supports exact (default), prefix, regex, and presence-only match.
/// Multiple matchers use AND semantics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeaderMatcher {
    pub name: String,

    /// Ignored when `match_type` is "present".
    #[serde(default)]
    pub value: String,

    /// "exact" (default), "prefix", "regex", "present".
    #[serde(default = "default_header_match_type")]
    pub match_type: String,

    #[serde(default)]
    pub invert: bool,
}

fn default_header_match_type() -> String {
    "exact".to_string()
}

/// Static response served by a configured endpoint or the fallback.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResponseConfig {
    /// Defaults to 200, or 302 when `redirect` is set.
    #[serde(default)]
    pub status: Option<u16>,

    #[serde(default, deserialize_with = "deserialize_null_default")]
    pub headers: BTreeMap<String, String>,

    #[serde(default)]
    pub body: Option<String>,

    /// JSON body; ignored when `body` is set.
    #[serde(default)]
    pub json: Option<serde_json::Value>,

    /// Redirect target, emitted as a `Location` header.
    #[serde(default)]
    pub redirect: Option<String>,
}

impl ResponseConfig {
    pub fn status_code(&self) -> u16 {
        match (self.status, &self.redirect) {
            (Some(status), _) => status,
            (None, Some(_)) => 302,
            (None, None) => 200,
        }
    }
}
