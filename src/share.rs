// Copyright 2025 Cowboy AI, LLC.

//! Share token generation
//!
//! Share tokens grant read-only access to a trip without the owner's
//! authentication context, so they must be unguessable. Uniqueness among
//! active tokens is enforced by the service against the repository; this
//! module only supplies entropy.

use rand::rngs::OsRng;
use rand::RngCore;

/// Generates unguessable share tokens
pub trait ShareTokenIssuer: Send + Sync {
    /// Produce a fresh candidate token
    fn issue(&self) -> String;
}

/// Token issuer backed by the operating system's CSPRNG
///
/// Tokens carry 128 bits of entropy, hex-encoded to 32 characters.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTokenIssuer;

impl ShareTokenIssuer for RandomTokenIssuer {
    fn issue(&self) -> String {
        let mut bytes = [0u8; 16];
        OsRng.fill_bytes(&mut bytes);
        bytes.iter().map(|b| format!("{b:02x}")).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_token_shape() {
        let token = RandomTokenIssuer.issue();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_tokens_do_not_repeat() {
        let issuer = RandomTokenIssuer;
        let tokens: HashSet<String> = (0..1000).map(|_| issuer.issue()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
