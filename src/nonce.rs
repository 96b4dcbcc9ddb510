// SPDX-License-Identifier: MIT

//! Cryptographically random identifiers for OAuth state, session IDs and
//! store-assigned record IDs.

use crate::error::AppError;
use ring::rand::{SecureRandom, SystemRandom};

/// Generate `num_bytes` of randomness, hex-encoded.
pub fn random_hex(num_bytes: usize) -> Result<String, AppError> {
    let rng = SystemRandom::new();
    let mut bytes = vec![0u8; num_bytes];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("System RNG failure")))?;
    Ok(hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_random_hex_length() {
        let token = random_hex(16).unwrap();
        assert_eq!(token.len(), 32);
        assert!(token.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_random_hex_unique() {
        let a = random_hex(16).unwrap();
        let b = random_hex(16).unwrap();
        assert_ne!(a, b);
    }
}
