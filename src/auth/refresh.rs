//! Opaque refresh tokens.
//!
//! A refresh token is 32 bytes from the OS CSPRNG, hex-encoded. Unlike the
//! access token it carries no claims; everything about it lives in the
//! store, keyed by the token string itself.

use rand::Rng;

pub const REFRESH_TOKEN_BYTES: usize = 32;

/// Generate a fresh opaque token: 64 lowercase hex characters.
pub fn generate_refresh_token() -> String {
    let mut buf = [0u8; REFRESH_TOKEN_BYTES];
    rand::rng().fill_bytes(&mut buf);
    hex::encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_is_64_lowercase_hex_chars() {
        let token = generate_refresh_token();
        assert_eq!(token.len(), REFRESH_TOKEN_BYTES * 2);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_tokens_are_unique() {
        assert_ne!(generate_refresh_token(), generate_refresh_token());
    }
}
