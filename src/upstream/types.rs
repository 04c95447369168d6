//! Upstream resource and error types.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// A resource exposed by the move catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Resource {
    /// `GET /move`
    Moves,
    /// `GET /move/{id}`
    Move(u32),
}

impl Resource {
    /// Path relative to the upstream base URL.
    pub fn path(&self) -> String {
        match self {
            Resource::Moves => "move".to_string(),
            Resource::Move(id) => format!("move/{}", id),
        }
    }
}

impl fmt::Display for Resource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.path())
    }
}

/// Error returned when a configured resource string is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown resource '{0}', expected \"move\" or \"move/{{id}}\"")]
pub struct ResourceParseError(pub String);

impl FromStr for Resource {
    type Err = ResourceParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim().trim_matches('/');
        match trimmed.split_once('/') {
            None if trimmed == "move" => Ok(Resource::Moves),
            Some(("move", id)) => id
                .parse()
                .map(Resource::Move)
                .map_err(|_| ResourceParseError(s.to_string())),
            _ => Err(ResourceParseError(s.to_string())),
        }
    }
}

/// Failure of a single upstream round trip.
///
/// The variants exist for logging; callers above the client treat them all
/// as one opaque transport failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("malformed response: {0}")]
    Body(String),

    #[error("invalid upstream request: {0}")]
    Request(String),
}
