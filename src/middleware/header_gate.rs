use super::Middleware;
use crate::config::HeaderMatcher;
use crate::error::RouterError;
use crate::request::Request;
use crate::routing::{Route, Score, NO_MATCH};
use http::HeaderName;
use regex::Regex;

/// Rejects a route during estimation unless every header rule passes.
/// The score is left untouched otherwise.
#[derive(Debug)]
pub struct HeaderGate {
    rules: Vec<HeaderRule>,
}

#[derive(Debug)]
struct HeaderRule {
    name: HeaderName,
    test: ValueTest,
    invert: bool,
}

/// What a header value must satisfy. A missing header fails every test.
#[derive(Debug)]
enum ValueTest {
    Exact(String),
    Prefix(String),
    Regex(Regex),
    Present,
}

impl ValueTest {
    fn compile(rule: &HeaderMatcher) -> Result<Self, RouterError> {
        let test = match rule.match_type.as_str() {
            "exact" => ValueTest::Exact(rule.value.clone()),
            "prefix" => ValueTest::Prefix(rule.value.clone()),
            "present" => ValueTest::Present,
            "regex" => ValueTest::Regex(Regex::new(&rule.value).map_err(|e| {
                RouterError::InvalidHeaderMatcher(format!(
                    "header '{}' has invalid regex '{}': {}",
                    rule.name, rule.value, e
                ))
            })?),
            other => {
                return Err(RouterError::InvalidHeaderMatcher(format!(
                    "header '{}' has unknown match_type '{}'",
                    rule.name, other
                )))
            }
        };
        Ok(test)
    }

    fn passes(&self, value: Option<&str>) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            ValueTest::Exact(expected) => value == expected,
            ValueTest::Prefix(prefix) => value.starts_with(prefix.as_str()),
            ValueTest::Regex(re) => re.is_match(value),
            ValueTest::Present => true,
        }
    }
}

impl HeaderGate {
    pub fn compile(rules: &[HeaderMatcher]) -> Result<Self, RouterError> {
        let rules = rules
            .iter()
            .map(|rule| {
                let name = HeaderName::from_bytes(rule.name.as_bytes()).map_err(|_| {
                    RouterError::InvalidHeaderMatcher(format!("invalid header name '{}'", rule.name))
                })?;
                Ok(HeaderRule {
                    name,
                    test: ValueTest::compile(rule)?,
                    invert: rule.invert,
                })
            })
            .collect::<Result<Vec<_>, RouterError>>()?;
        Ok(Self { rules })
    }

    /// Number of compiled rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn admits(&self, request: &Request) -> bool {
        self.rules.iter().all(|rule| {
            let value = request.headers().get(&rule.name).and_then(|v| v.to_str().ok());
            rule.test.passes(value) != rule.invert
        })
    }
}

impl Middleware for HeaderGate {
    fn on_estimated(&self, rate: Score, request: &Request, route: &Route) -> Score {
        if rate < 0 || self.admits(request) {
            return rate;
        }
        tracing::trace!(route = %route.name(), "header gate: rejected by header matchers");
        NO_MATCH
    }
}
