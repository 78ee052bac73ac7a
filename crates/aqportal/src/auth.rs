//! Admin credential checks.
//!
//! The admin password is never stored in clear text: configuration holds the
//! BLAKE3 digest and login compares digests.

use crate::config::AdminConfig;

/// Compute the lowercase hex BLAKE3 digest of a password.
#[must_use]
pub fn digest(password: &str) -> String {
    blake3::hash(password.as_bytes()).to_hex().to_string()
}

/// Check an entered username/password pair against the configured admin.
#[must_use]
pub fn verify_admin(admin: &AdminConfig, username: &str, password: &str) -> bool {
    username == admin.username && digest(password).eq_ignore_ascii_case(&admin.password_blake3)
}
