//! Validated string concatenation.
//!
//! # Data Flow
//! ```text
//! five path tokens
//!     → validator.rs (blank check, deny-list check, first failure wins)
//!     → concat() joins with single spaces
//!     → handler publishes a StringsConcatenated event
//! ```

pub mod validator;

pub use validator::{validate, validate_all, ParamRejected, Rejected};

/// Join tokens with a single space.
pub fn concat<S: AsRef<str>>(params: &[S]) -> String {
    params
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ")
}
