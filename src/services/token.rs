//! Session token codec
//!
//! Generates the opaque bearer secret transmitted in the cookie and
//! derives the verifier stored as the session's primary key. Only the
//! verifier is persisted, so a leaked session table never yields a
//! usable credential; only the one-way transform ties the two together.

use anyhow::Result;
use data_encoding::{BASE32_NOPAD, HEXLOWER};
use sha2::{Digest, Sha256};

/// Random bytes per token: 144 bits of entropy
const TOKEN_BYTES: usize = 18;

/// Generate a new bearer token from OS randomness.
///
/// The token is base32-encoded so it is cookie-safe without escaping.
pub fn generate_session_token() -> Result<String> {
    let mut bytes = [0u8; TOKEN_BYTES];
    getrandom::getrandom(&mut bytes)
        .map_err(|e| anyhow::anyhow!("Failed to read OS randomness: {}", e))?;
    Ok(BASE32_NOPAD.encode(&bytes).to_lowercase())
}

/// Derive the stored session id (verifier) from a bearer token.
///
/// Deterministic one-way transform: SHA-256, lowercase hex.
pub fn session_id_from_token(token: &str) -> String {
    HEXLOWER.encode(&Sha256::digest(token.as_bytes()))
}
