use std::fmt;

/// Errors raised while declaring routes. Matching itself never fails:
/// rejection is expressed as a score of `NO_MATCH`.
#[derive(Debug)]
pub enum RouterError {
    InvalidPattern {
        template: String,
        source: regex::Error,
    },
    InvalidSegment(String),
    InvalidMethod(String),
    InvalidHeaderMatcher(String),
    Config(String),
}

impl fmt::Display for RouterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouterError::InvalidPattern { template, source } => {
                write!(f, "invalid pattern in segment '{}': {}", template, source)
            }
            RouterError::InvalidSegment(token) => write!(f, "invalid segment: '{}'", token),
            RouterError::InvalidMethod(method) => write!(f, "invalid method: '{}'", method),
            RouterError::InvalidHeaderMatcher(msg) => write!(f, "invalid header matcher: {}", msg),
            RouterError::Config(msg) => write!(f, "config error: {}", msg),
        }
    }
}

impl std::error::Error for RouterError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RouterError::InvalidPattern { source, .. } => Some(source),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn display_invalid_segment() {
        assert_eq!(
            RouterError::InvalidSegment("{}".to_string()).to_string(),
            "invalid segment: '{}'"
        );
    }

    #[test]
    fn display_invalid_method() {
        assert_eq!(
            RouterError::InvalidMethod("G ET".to_string()).to_string(),
            "invalid method: 'G ET'"
        );
    }

    #[test]
    fn display_invalid_header_matcher() {
        assert_eq!(
            RouterError::InvalidHeaderMatcher("unknown match_type 'fuzzy'".to_string()).to_string(),
            "invalid header matcher: unknown match_type 'fuzzy'"
        );
    }

    #[test]
    fn display_config() {
        assert_eq!(
            RouterError::Config("bad toml".to_string()).to_string(),
            "config error: bad toml"
        );
    }

    #[test]
    fn invalid_pattern_exposes_source() {
        let source = regex::Regex::new("(").unwrap_err();
        let err = RouterError::InvalidPattern {
            template: "{id:(}".to_string(),
            source,
        };
        assert!(err.to_string().starts_with("invalid pattern in segment '{id:(}'"));
        assert!(err.source().is_some());
    }
}
