use crate::error::RouterError;
use crate::routing::segment::{Score, SegmentKind, SegmentPattern, NO_MATCH};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;

/// Ordered segment patterns of one route, scored against request paths.
#[derive(Debug, Clone, Default)]
pub struct RouteMatcher {
    segments: Vec<SegmentPattern>,
}

impl RouteMatcher {
    pub fn new(segments: Vec<SegmentPattern>) -> Self {
        Self { segments }
    }

    /// Compile a `/`-separated template such as `users/{id:i}/{tab}?`.
    ///
    /// Surrounding whitespace and slashes are ignored and empty tokens
    /// between repeated slashes are skipped.
    pub fn parse(path: &str) -> Result<Self, RouterError> {
        let segments = split_template(path)
            .map(SegmentPattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[SegmentPattern] {
        &self.segments
    }

    /// Score a request path against the segment list.
    ///
    /// Tokens are consumed one per segment. When a segment fails to match
    /// cleanly while earlier optional segments have consumed tokens, those
    /// tokens are given back one at a time and the segment is retried
    /// against the earlier token. A successful retry zeroes the scores of the
    /// optional segments that gave their token away. A required segment that
    /// still fails once nothing is left to give back rejects the route.
    ///
    /// Only `segments.len()` tokens are ever examined; trailing tokens do not
    /// cause rejection.
    pub fn estimate<S: AsRef<str>>(&self, paths: &[S]) -> Score {
        let mut rates: Vec<Score> = vec![0; self.segments.len()];
        let mut path_index: isize = 0;
        // Consecutive optional segments right before `i` that still own a token.
        let mut optionals: usize = 0;
        // Tokens currently given back and pending re-evaluation.
        let mut backwards: usize = 0;

        for (i, segment) in self.segments.iter().enumerate() {
            let rate = loop {
                let rate = segment.score(token_at(paths, path_index));

                if rate <= 0 && optionals > 0 {
                    optionals -= 1;
                    backwards += 1;
                    path_index -= 1;
                    continue;
                }

                if rate <= 0 && backwards > 0 {
                    if rate < 0 {
                        return NO_MATCH;
                    }
                    // Give-back did not help an optional segment: undo it and skip.
                    path_index += backwards as isize;
                    optionals += backwards;
                    backwards = 0;
                } else if rate > 0 && backwards > 0 {
                    for slot in &mut rates[i - backwards..i] {
                        *slot = 0;
                    }
                    backwards = 0;
                }

                if rate < 0 {
                    return NO_MATCH;
                }

                if segment.is_optional() {
                    optionals += 1;
                } else {
                    optionals = 0;
                }
                break rate;
            };
            rates[i] = rate;
            path_index += 1;
        }

        rates.iter().sum()
    }

    /// Reverse-generate a path from parameter values.
    ///
    /// Literals are always emitted. Optional parameters absent from `params`
    /// are skipped. Any other value must satisfy its segment's match rule,
    /// otherwise no URL is produced.
    pub fn build_url<K, V>(&self, params: &HashMap<K, V>) -> Option<String>
    where
        K: Borrow<str> + Hash + Eq,
        V: AsRef<str>,
    {
        let mut paths: Vec<&str> = Vec::with_capacity(self.segments.len());
        for segment in &self.segments {
            if segment.kind() == SegmentKind::Literal {
                paths.push(segment.name());
                continue;
            }
            let value = match params.get(segment.name()) {
                Some(v) => v.as_ref(),
                None if segment.is_optional() => continue,
                None => "",
            };
            if !segment.accepts(value) {
                return None;
            }
            paths.push(value);
        }
        Some(format!("/{}", paths.join("/")))
    }
}

impl fmt::Display for RouteMatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("/")?;
        for (i, segment) in self.segments.iter().enumerate() {
            if i > 0 {
                f.write_str("/")?;
            }
            write!(f, "{}", segment)?;
        }
        Ok(())
    }
}

/// Split a route template into non-empty tokens.
pub(crate) fn split_template(path: &str) -> impl Iterator<Item = &str> {
    path.trim()
        .trim_matches('/')
        .split('/')
        .filter(|token| !token.is_empty())
}

fn token_at<S: AsRef<str>>(paths: &[S], index: isize) -> &str {
    usize::try_from(index)
        .ok()
        .and_then(|i| paths.get(i))
        .map_or("", |p| p.as_ref())
}
