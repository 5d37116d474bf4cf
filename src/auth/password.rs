//! Password hashing with bcrypt.
//!
//! Cost is fixed at 12 and inputs are capped at bcrypt's 72-byte limit
//! rather than silently truncated. Hashing takes tens of milliseconds at
//! this cost, so callers on the request path run it on a blocking thread.

use crate::errors::{Error, Result};

/// bcrypt only consumes the first 72 bytes of input. Longer passwords are
/// rejected outright so no two distinct passwords ever verify equal.
pub const MAX_PASSWORD_BYTES: usize = 72;

const HASH_COST: u32 = 12;

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String> {
    if password.is_empty() {
        return Err(Error::BadRequest {
            message: "password must not be empty".to_string(),
        });
    }
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(Error::BadRequest {
            message: format!(
                "password is too long, received {} bytes but maximum allowed is {MAX_PASSWORD_BYTES} bytes",
                password.len()
            ),
        });
    }

    bcrypt::hash(password, HASH_COST).map_err(|e| Error::Internal {
        operation: format!("hash password: {e}"),
    })
}

/// Check a plaintext password against a stored hash.
///
/// Malformed hashes and mismatches both come back as an unauthenticated
/// error; the caller decides what message the client sees.
pub fn verify_password(password: &str, hash: &str) -> Result<()> {
    match bcrypt::verify(password, hash) {
        Ok(true) => Ok(()),
        _ => Err(Error::Unauthenticated { message: None }),
    }
}
