//! Single-use tokens for email verification and password reset.
//!
//! The plaintext (20 random bytes, hex encoded) is handed to the user once;
//! only its SHA-256 hex digest is persisted and looked up.

use rand_core::{OsRng, RngCore};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

/// Random bytes per token.
pub const TOKEN_BYTES: usize = 20;

/// A freshly minted token and the digest to store.
#[derive(Debug, Clone)]
pub struct SingleUseToken {
    /// Value delivered to the account holder.
    pub plaintext: String,
    /// SHA-256 hex of `plaintext`.
    pub hash: String,
}

impl SingleUseToken {
    /// Mint a token from the OS random source.
    pub fn generate() -> Self {
        let mut bytes = [0u8; TOKEN_BYTES];
        OsRng.fill_bytes(&mut bytes);
        let plaintext = to_hex(&bytes);
        let hash = hash_token(&plaintext);
        Self { plaintext, hash }
    }
}

/// SHA-256 hex digest of a token as presented by the user.
pub fn hash_token(plaintext: &str) -> String {
    format!("{:x}", Sha256::digest(plaintext.as_bytes()))
}

/// Constant-time check of a presented token against a stored digest.
pub fn token_matches(plaintext: &str, stored_hash: &str) -> bool {
    hash_token(plaintext)
        .as_bytes()
        .ct_eq(stored_hash.as_bytes())
        .into()
}

fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
