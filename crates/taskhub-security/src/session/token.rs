//! Session token generation.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::RngCore;

/// Raw entropy per token: 256 bits.
const TOKEN_BYTES: usize = 32;

/// Generate an opaque, URL-safe session token.
///
/// 32 random bytes from the thread-local CSPRNG, base64url-encoded without
/// padding (43 characters).
pub fn generate_session_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::rng().fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_shape() {
        let token = generate_session_token();
        // 32 bytes -> ceil(32 * 4 / 3) = 43 chars unpadded.
        assert_eq!(token.len(), 43);
        assert!(token
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_'));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..256).map(|_| generate_session_token()).collect();
        assert_eq!(tokens.len(), 256);
    }
}
