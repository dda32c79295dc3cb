//! Object key validation.
//!
//! Valid keys are one or more alphanumeric segments separated by single
//! dots: `bob`, `users.jdoe`, `inventory.item.42`. Empty segments and
//! leading or trailing dots are rejected.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::TypeError;

static KEY_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9]+(\.[a-zA-Z0-9]+)*$").expect("key regex compiles"));

/// Returns `true` if `key` is a well-formed object key.
pub fn is_valid_key(key: &str) -> bool {
    KEY_REGEX.is_match(key)
}

/// Validate an object key, returning `Ok(())` if valid.
///
/// # Examples
///
/// ```
/// use scds_types::validate_key;
///
/// assert!(validate_key("users.jdoe").is_ok());
/// assert!(validate_key("users..jdoe").is_err());
/// assert!(validate_key("").is_err());
/// ```
pub fn validate_key(key: &str) -> Result<(), TypeError> {
    if is_valid_key(key) {
        Ok(())
    } else {
        Err(TypeError::InvalidKey(key.to_string()))
    }
}
