//! Route patterns and segment-wise matching.
//!
//! A pattern is a `/`-separated list of segments. A segment written as
//! `{name}` (at least one character between the braces) binds whatever the
//! request has in that position; every other segment must match byte for
//! byte. Empty segments are dropped on both sides, so `/users/`, `/users`
//! and `//users` are the same path. Anything after `?` is ignored.

use std::collections::HashMap;
use std::fmt;

use crate::method::Method;

/// A method plus a path pattern, e.g. `GET /files/{filename}`.
///
/// Two routes are equal when both the method and the raw pattern text are.
#[derive(Clone, Debug, Eq, Hash, PartialEq)]
pub struct Route {
    method: Method,
    pattern: String,
}

impl Route {
    pub fn new(method: Method, pattern: impl Into<String>) -> Self {
        Self { method, pattern: pattern.into() }
    }

    pub fn method(&self) -> Method { self.method }
    pub fn pattern(&self) -> &str { &self.pattern }

    /// Whether a request for `method` + `target` lands on this route.
    pub fn matches(&self, method: Method, target: &str) -> bool {
        if self.method != method {
            return false;
        }

        let wanted: Vec<&str> = segments(&self.pattern).collect();
        let incoming: Vec<&str> = segments(strip_query(target)).collect();

        wanted.len() == incoming.len()
            && wanted.iter().zip(&incoming).all(|(w, i)| is_dynamic(w) || w == i)
    }

    /// Number of `{name}` segments in the pattern.
    pub fn param_count(&self) -> usize {
        segments(&self.pattern).filter(|s| is_dynamic(s)).count()
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.pattern)
    }
}

/// Returns the first route in `routes` matching `method` + `target`.
///
/// Order is the caller's registration order; absence is `None`, never an error.
pub fn find<'a, I>(routes: I, method: Method, target: &str) -> Option<&'a Route>
where
    I: IntoIterator<Item = &'a Route>,
{
    routes.into_iter().find(|route| route.matches(method, target))
}

/// Pairs every `{name}` segment of `route` with the request's value at the
/// same position.
///
/// Values are trimmed. Returns an empty map when `route` is `None`, when the
/// segment counts differ, or when a literal segment does not match.
pub fn extract_args(target: &str, route: Option<&Route>) -> HashMap<String, String> {
    let Some(route) = route else {
        return HashMap::new();
    };

    let wanted: Vec<&str> = segments(&route.pattern).collect();
    let incoming: Vec<&str> = segments(strip_query(target)).collect();

    if wanted.len() != incoming.len() {
        return HashMap::new();
    }

    let mut args = HashMap::new();
    for (w, i) in wanted.into_iter().zip(incoming) {
        if is_dynamic(w) {
            args.insert(w[1..w.len() - 1].to_owned(), i.to_owned());
        } else if w != i {
            return HashMap::new();
        }
    }
    args
}

/// `{name}` with a non-empty name. A bare `{}` is a literal segment.
pub fn is_dynamic(segment: &str) -> bool {
    segment.len() > 2 && segment.starts_with('{') && segment.ends_with('}')
}

fn strip_query(target: &str) -> &str {
    target.split_once('?').map_or(target, |(path, _)| path)
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty())
}
