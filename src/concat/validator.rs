//! Deny-list validation for concat parameters.
//!
//! Tokens are rejected when blank or when they contain characters and
//! sequences commonly used in injection payloads.

use thiserror::Error;

/// Characters that may not appear anywhere in a token.
pub const DENIED_CHARS: &[char] = &[
    ';', '\'', '"', '%', '#', '=', '|', '&', '$', '<', '>', '(', ')', '{', '}', '*',
];

/// Sequences that may not appear anywhere in a token.
pub const DENIED_SEQUENCES: &[&str] = &["--", "/*", "*/"];

/// Why a single token was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejected {
    #[error("parameter is empty or blank")]
    Blank,

    #[error("parameter contains disallowed character '{0}'")]
    Character(char),

    #[error("parameter contains disallowed sequence '{0}'")]
    Sequence(&'static str),
}

impl Rejected {
    /// Message returned to HTTP clients; never echoes the input.
    pub fn client_message(&self) -> &'static str {
        match self {
            Rejected::Blank => "Invalid parameter: parameters must not be null, empty or blank.",
            Rejected::Character(_) | Rejected::Sequence(_) => {
                "Invalid parameter detected (disallowed characters or patterns)."
            }
        }
    }
}

/// First rejected token in a group, with its 1-based position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("p{position}: {reason}")]
pub struct ParamRejected {
    pub position: usize,
    pub reason: Rejected,
}

/// Validate one token.
pub fn validate(token: &str) -> Result<&str, Rejected> {
    if token.trim().is_empty() {
        return Err(Rejected::Blank);
    }
    if let Some(seq) = DENIED_SEQUENCES.iter().find(|seq| token.contains(**seq)) {
        return Err(Rejected::Sequence(*seq));
    }
    if let Some(c) = token.chars().find(|c| DENIED_CHARS.contains(c)) {
        return Err(Rejected::Character(c));
    }
    Ok(token)
}

/// Validate every token, stopping at the first rejection.
pub fn validate_all<S: AsRef<str>>(tokens: &[S]) -> Result<(), ParamRejected> {
    for (i, token) in tokens.iter().enumerate() {
        validate(token.as_ref()).map_err(|reason| ParamRejected {
            position: i + 1,
            reason,
        })?;
    }
    Ok(())
}
