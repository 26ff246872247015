//! HTTP status codes as a closed enum.
//!
//! Each variant carries its code and reason phrase as one unit. New statuses
//! are added as variants, never built from arbitrary integers.
//!
//! ```rust
//! use kettle::{Response, Status};
//!
//! assert_eq!(Status::Created.as_str(), "201 Created");
//!
//! // status-only, no body
//! Response::status(Status::NotFound);
//! ```

use std::fmt;

/// Every status the server and its handlers can send.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Status {
    Ok,                  // 200
    Created,             // 201
    BadRequest,          // 400
    NotFound,            // 404
    InternalServerError, // 500
}

impl Status {
    pub fn code(self) -> u16 {
        self.into()
    }

    pub fn reason(self) -> &'static str {
        match self {
            Self::Ok                  => "OK",
            Self::Created             => "Created",
            Self::BadRequest          => "Bad Request",
            Self::NotFound            => "Not Found",
            Self::InternalServerError => "Internal Server Error",
        }
    }

    /// Code and reason phrase as written on the status line, e.g. `"200 OK"`.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ok                  => "200 OK",
            Self::Created             => "201 Created",
            Self::BadRequest          => "400 Bad Request",
            Self::NotFound            => "404 Not Found",
            Self::InternalServerError => "500 Internal Server Error",
        }
    }
}

impl From<Status> for u16 {
    fn from(s: Status) -> u16 {
        match s {
            Status::Ok                  => 200,
            Status::Created             => 201,
            Status::BadRequest          => 400,
            Status::NotFound            => 404,
            Status::InternalServerError => 500,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
