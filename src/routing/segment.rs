use crate::error::RouterError;
use regex::bytes::{Regex, RegexBuilder};
use std::fmt;

/// Match weight of a segment, or of a whole route once summed.
///
/// `NO_MATCH` is structural rejection; `0` and up rank candidates, higher
/// being more specific. Magnitudes only matter within one dispatch.
pub type Score = i32;

pub const NO_MATCH: Score = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// `foo`: exact text.
    Literal,
    /// `{name}`: any non-empty value.
    Wildcard,
    /// `{name:a}`: letters, `-` and `_`.
    Alpha,
    /// `{name:i}`: ASCII digits.
    Integer,
    /// `{name:<regex>}`: case-insensitive, anchored regex. Classes such as
    /// `\d` and `\w` are ASCII-only and `.` matches a single byte.
    Pattern,
}

impl SegmentKind {
    fn weight(self) -> Score {
        match self {
            SegmentKind::Literal => 3,
            SegmentKind::Alpha | SegmentKind::Integer | SegmentKind::Pattern => 2,
            SegmentKind::Wildcard => 1,
        }
    }
}

/// One compiled path-template token.
///
/// Immutable once compiled. `pattern` is set exactly when the kind is
/// `SegmentKind::Pattern`.
#[derive(Debug, Clone)]
pub struct SegmentPattern {
    template: String,
    kind: SegmentKind,
    name: String,
    pattern: Option<Regex>,
    optional: bool,
}

impl SegmentPattern {
    /// Compile a single template token such as `users`, `{id:i}` or `{slug}?`.
    pub fn compile(template: &str) -> Result<Self, RouterError> {
        let (body, optional) = match template.strip_suffix('?') {
            Some(body) => (body, true),
            None => (template, false),
        };
        if body.is_empty() {
            return Err(RouterError::InvalidSegment(template.to_string()));
        }

        let inner = match body.strip_prefix('{').and_then(|b| b.strip_suffix('}')) {
            Some(inner) => inner,
            None => {
                return Ok(Self {
                    template: template.to_string(),
                    kind: SegmentKind::Literal,
                    name: body.to_string(),
                    pattern: None,
                    optional,
                })
            }
        };

        let (name, constraint) = match inner.split_once(':') {
            Some((name, constraint)) => (name, Some(constraint)),
            None => (inner, None),
        };
        if name.is_empty() || constraint == Some("") {
            return Err(RouterError::InvalidSegment(template.to_string()));
        }

        let (kind, pattern) = match constraint {
            None => (SegmentKind::Wildcard, None),
            Some("a") => (SegmentKind::Alpha, None),
            Some("i") => (SegmentKind::Integer, None),
            Some(expr) => {
                let regex = RegexBuilder::new(&format!("^(?:{})$", expr))
                    .case_insensitive(true)
                    .unicode(false)
                    .build()
                    .map_err(|source| RouterError::InvalidPattern {
                        template: template.to_string(),
                        source,
                    })?;
                (SegmentKind::Pattern, Some(regex))
            }
        };

        Ok(Self {
            template: template.to_string(),
            kind,
            name: name.to_string(),
            pattern,
            optional,
        })
    }

    pub fn kind(&self) -> SegmentKind {
        self.kind
    }

    /// Parameter name, or the literal text for `SegmentKind::Literal`.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> Option<&Regex> {
        self.pattern.as_ref()
    }

    pub fn is_optional(&self) -> bool {
        self.optional
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    /// Whether `value` satisfies this segment's match rule, ignoring optionality.
    pub fn accepts(&self, value: &str) -> bool {
        match self.kind {
            SegmentKind::Literal => value == self.name,
            SegmentKind::Wildcard => !value.is_empty(),
            SegmentKind::Alpha => is_alpha(value),
            SegmentKind::Integer => is_integer(value),
            SegmentKind::Pattern => self
                .pattern
                .as_ref()
                .map_or(false, |re| re.is_match(value.as_bytes())),
        }
    }

    /// Score one path token against this segment.
    ///
    /// An optional segment that does not match scores `0` rather than
    /// `NO_MATCH`; the route matcher relies on that difference to decide
    /// when to give tokens back.
    pub fn score(&self, value: &str) -> Score {
        if self.accepts(value) {
            self.kind.weight()
        } else if self.optional {
            0
        } else {
            NO_MATCH
        }
    }
}

impl fmt::Display for SegmentPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.template)
    }
}

fn is_alpha(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_alphabetic() || b == b'-' || b == b'_')
}

fn is_integer(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}
