//! Opaque token generation.
//!
//! Used for order download tokens and bearer session tokens. Tokens are
//! 32 bytes of OS randomness, base64 url-safe without padding, so they are
//! safe to embed in URLs and email links as-is.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use rand::rngs::OsRng;
use rand::RngCore;

/// Token entropy in bytes
const TOKEN_BYTES: usize = 32;

/// Generate a fresh opaque token.
pub fn generate_token() -> String {
    let mut buf = [0u8; TOKEN_BYTES];
    OsRng.fill_bytes(&mut buf);
    URL_SAFE_NO_PAD.encode(buf)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_url_safe() {
        let token = generate_token();
        // 32 bytes -> 43 base64 chars, no padding
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn tokens_are_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_ne!(a, b);
    }
}
