//! HTTP method as a typed enum.
//!
//! kettle serves a fixed route table, so the enum only covers the methods
//! that table can ever mention. Anything else on the wire is an
//! [`InvalidMethod`] and never becomes a new variant.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A supported HTTP method.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Method {
    Delete,
    Get,
    Patch,
    Post,
    Put,
}

impl Method {
    /// Returns the uppercase wire representation (e.g. `"GET"`).
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Delete => "DELETE",
            Self::Get    => "GET",
            Self::Patch  => "PATCH",
            Self::Post   => "POST",
            Self::Put    => "PUT",
        }
    }
}

/// The method token on the request line did not name a [`Method`].
#[derive(Debug, Error, PartialEq, Eq)]
#[error("invalid HTTP method `{0}`")]
pub struct InvalidMethod(pub String);

/// Parses a method token case-insensitively: `get`, `Get` and `GET` are all
/// [`Method::Get`].
impl FromStr for Method {
    type Err = InvalidMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "DELETE" => Ok(Self::Delete),
            "GET"    => Ok(Self::Get),
            "PATCH"  => Ok(Self::Patch),
            "POST"   => Ok(Self::Post),
            "PUT"    => Ok(Self::Put),
            _        => Err(InvalidMethod(s.to_owned())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
