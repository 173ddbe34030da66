pub mod types;


pub use types::*;

use crate::error::RouterError;
use crate::middleware::{AccessLog, HeaderGate, Priority};
use crate::request::Request;
use crate::response::Response;
use crate::routing::{Dispatcher, Group, Route, RouteMatcher};
use anyhow::Result;
use http::StatusCode;
use std::collections::HashSet;
use std::path::Path;

impl RouterConfig {
    /// Load configuration from a file (if it exists) and apply environment
    /// variable overrides for the logging settings. A missing file yields the
    /// built-in defaults: no routes and a 404 fallback.
    pub fn load(path: &Path) -> Result<Self> {
        let config = Self::read(path)?;
        config.validate_loaded(path)?;
        Ok(config)
    }

    /// First half of `load`: parse and apply environment overrides without
    /// validating or logging. Lets the caller install a subscriber from the
    /// `logging` section before `validate_loaded` emits anything.
    pub fn read(path: &Path) -> Result<Self> {
        let mut config: RouterConfig = if path.exists() {
            let content = std::fs::read_to_string(path)?;
            match path.extension().and_then(|e| e.to_str()) {
                Some("toml") => toml::from_str(&content)?,
                Some("json") => serde_json::from_str(&content)?,
                Some(ext) => anyhow::bail!("unsupported config format: .{ext}, use .toml or .json"),
                None => anyhow::bail!("config file has no extension, use .toml or .json"),
            }
        } else {
            RouterConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Second half of `load`: validate what `read` returned and log it.
    pub fn validate_loaded(&self, path: &Path) -> Result<()> {
        if !path.exists() {
            tracing::info!("config file not found at {}, using defaults", path.display());
        }
        self.validate()?;
        tracing::info!(
            members = self.routes.len(),
            endpoints = self.endpoint_count(),
            "loaded router configuration"
        );
        Ok(())
    }

    /// Only logging settings can be overridden from the environment. The
    /// route tree lives in the config file.
    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("SUBWAY_LOG_LEVEL") {
            self.logging.level = v;
        }
        if let Ok(v) = std::env::var("SUBWAY_LOG_FORMAT") {
            self.logging.format = v;
        }
        if let Ok(v) = std::env::var("SUBWAY_ACCESS_LOG") {
            self.logging.access_log = v == "true" || v == "1";
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.logging.format != "text" && self.logging.format != "json" {
            anyhow::bail!(
                "logging format '{}' is not supported, use 'text' or 'json'",
                self.logging.format
            );
        }
        validate_response("fallback", &self.fallback)?;

        let mut names = HashSet::new();
        for member in &self.routes {
            validate_member(member, &mut names)?;
        }
        Ok(())
    }

    /// Number of endpoints in the whole tree.
    pub fn endpoint_count(&self) -> usize {
        fn count(members: &[MemberConfig]) -> usize {
            members
                .iter()
                .map(|m| match m {
                    MemberConfig::Group(g) => count(&g.members),
                    MemberConfig::Endpoint(_) => 1,
                })
                .sum()
        }
        count(&self.routes)
    }

    /// Compile the declared tree into a dispatcher. Every endpoint serves its
    /// configured static response; unmatched requests get the fallback.
    pub fn build_dispatcher(&self) -> Result<Dispatcher, RouterError> {
        let mut root = Group::root();
        if self.logging.access_log {
            root.middleware(AccessLog);
        }
        for member in &self.routes {
            add_member(&mut root, member)?;
        }

        let fallback = build_response("fallback", &self.fallback)?;
        Ok(Dispatcher::build(&root).fallback(move |_: &Request| fallback.clone()))
    }
}

fn validate_member<'a>(member: &'a MemberConfig, names: &mut HashSet<&'a str>) -> Result<()> {
    match member {
        MemberConfig::Group(group) => {
            RouteMatcher::parse(&group.path)
                .map_err(|e| anyhow::anyhow!("group '{}': {}", group.name, e))?;
            validate_headers(&group.name, &group.headers)?;
            for member in &group.members {
                validate_member(member, names)?;
            }
        }
        MemberConfig::Endpoint(endpoint) => {
            let label = endpoint_label(endpoint);
            let method = endpoint.method.trim().to_ascii_uppercase();
            if method.is_empty() || http::Method::from_bytes(method.as_bytes()).is_err() {
                anyhow::bail!("route '{}' has invalid method '{}'", label, endpoint.method);
            }
            RouteMatcher::parse(&endpoint.path)
                .map_err(|e| anyhow::anyhow!("route '{}': {}", label, e))?;
            validate_headers(&label, &endpoint.headers)?;
            validate_response(&label, &endpoint.response)?;
            if !endpoint.name.is_empty() && !names.insert(endpoint.name.as_str()) {
                tracing::warn!(
                    "route name '{}' is declared more than once, reverse lookup uses the first",
                    endpoint.name
                );
            }
        }
    }
    Ok(())
}

fn validate_headers(owner: &str, headers: &[HeaderMatcher]) -> Result<()> {
    for h in headers {
        if h.name.is_empty() {
            anyhow::bail!("'{}' has a header matcher with an empty name", owner);
        }
    }
    HeaderGate::compile(headers).map_err(|e| anyhow::anyhow!("'{}': {}", owner, e))?;
    Ok(())
}

fn validate_response(owner: &str, response: &ResponseConfig) -> Result<()> {
    let status = StatusCode::from_u16(response.status_code())
        .map_err(|_| anyhow::anyhow!("'{}' has invalid status {}", owner, response.status_code()))?;
    if response.redirect.is_some() && !status.is_redirection() {
        anyhow::bail!(
            "'{}' sets a redirect but status {} is not a 3xx code",
            owner,
            status.as_u16()
        );
    }
    Ok(())
}

fn endpoint_label(endpoint: &EndpointConfig) -> String {
    if endpoint.name.is_empty() {
        format!("{} /{}", endpoint.method, endpoint.path.trim_matches('/'))
    } else {
        endpoint.name.clone()
    }
}

fn add_member(parent: &mut Group, member: &MemberConfig) -> Result<(), RouterError> {
    match member {
        MemberConfig::Group(cfg) => {
            let group = parent.group(&cfg.path, |group| {
                for member in &cfg.members {
                    add_member(group, member)?;
                }
                Ok(())
            })?;
            group.name(cfg.name.clone());
            if !cfg.headers.is_empty() {
                group.middleware(HeaderGate::compile(&cfg.headers)?);
            }
            if cfg.priority != 0 {
                group.middleware(Priority(cfg.priority));
            }
        }
        MemberConfig::Endpoint(cfg) => {
            let response = build_response(&endpoint_label(cfg), &cfg.response)?;
            let endpoint = parent.route(&cfg.method, &cfg.path, move |_: &Request, _: &Route| {
                response.clone()
            })?;
            endpoint.name(cfg.name.clone());
            if !cfg.headers.is_empty() {
                endpoint.middleware(HeaderGate::compile(&cfg.headers)?);
            }
            if cfg.priority != 0 {
                endpoint.middleware(Priority(cfg.priority));
            }
        }
    }
    Ok(())
}

fn build_response(owner: &str, cfg: &ResponseConfig) -> Result<Response, RouterError> {
    let status = StatusCode::from_u16(cfg.status_code()).map_err(|_| {
        RouterError::Config(format!("'{}' has invalid status {}", owner, cfg.status_code()))
    })?;

    let mut response = Response::new().status(status);
    for (name, value) in &cfg.headers {
        response = response.header(name, value);
    }
    if let Some(url) = &cfg.redirect {
        response = response.redirect(url, status);
    }
    if let Some(body) = &cfg.body {
        response = response.body(body.clone());
    } else if let Some(json) = &cfg.json {
        response = response.json(json.clone());
    }
    Ok(response.finish())
}
