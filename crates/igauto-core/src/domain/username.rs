//! Username validation.
//!
//! An account identifier is accepted when it:
//!
//! - is non-empty and at most [`MAX_USERNAME_LEN`] characters long,
//! - contains only ASCII letters, digits, `.` and `_`,
//! - is not made up entirely of digits,
//! - is not made up entirely of periods.
//!
//! The check is pure and total: it never panics and touches no external state.

use thiserror::Error;

/// Maximum number of characters in an account identifier.
pub const MAX_USERNAME_LEN: usize = 30;

/// Why a candidate username was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UsernameError {
    #[error("username is empty")]
    Empty,

    #[error("username is {0} characters long (maximum {MAX_USERNAME_LEN})")]
    TooLong(usize),

    #[error("username contains invalid character {0:?}")]
    InvalidCharacter(char),

    #[error("username cannot consist only of digits")]
    AllDigits,

    #[error("username cannot consist only of periods")]
    OnlyPeriods,
}

/// Checks `candidate` against every username rule and reports the first one
/// that fails.
///
/// # Errors
///
/// Returns the [`UsernameError`] describing the failed rule.
///
/// # Examples
///
/// ```rust
/// use igauto_core::{validate_username, UsernameError};
///
/// assert!(validate_username("john_doe").is_ok());
/// assert_eq!(validate_username("12345"), Err(UsernameError::AllDigits));
/// ```
pub fn validate_username(candidate: &str) -> Result<(), UsernameError> {
    if candidate.is_empty() {
        return Err(UsernameError::Empty);
    }

    if let Some(bad) = candidate
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '.' || *c == '_'))
    {
        return Err(UsernameError::InvalidCharacter(bad));
    }

    // Only ASCII remains at this point, so byte length equals char count.
    if candidate.len() > MAX_USERNAME_LEN {
        return Err(UsernameError::TooLong(candidate.len()));
    }

    if candidate.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UsernameError::AllDigits);
    }

    if candidate.bytes().all(|b| b == b'.') {
        return Err(UsernameError::OnlyPeriods);
    }

    Ok(())
}

/// Returns `true` when `candidate` is an acceptable account identifier.
pub fn is_valid_username(candidate: &str) -> bool {
    validate_username(candidate).is_ok()
}
