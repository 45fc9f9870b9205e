//! envelope/encode.rs
//!
//! Design notes:
//! - The length prefix is one unsigned byte, so nonces are capped at 255 bytes.
//! - The body must at least hold a tag; an empty plaintext still seals to 16 bytes.

use crate::constants::{MAX_NONCE_LEN, TAG_LEN};
use crate::crypto::types::CryptoError;

/// Frame `nonce` and `ciphertext || tag` into one byte sequence.
#[inline]
pub fn encode_envelope(nonce: &[u8], sealed: &[u8]) -> Result<Vec<u8>, CryptoError> {
    if nonce.len() > MAX_NONCE_LEN {
        return Err(CryptoError::malformed(format!(
            "nonce length {} exceeds {}",
            nonce.len(),
            MAX_NONCE_LEN
        )));
    }
    if sealed.len() < TAG_LEN {
        return Err(CryptoError::malformed(format!(
            "sealed body of {} bytes is shorter than the {}-byte tag",
            sealed.len(),
            TAG_LEN
        )));
    }

    let mut out = Vec::with_capacity(1 + nonce.len() + sealed.len());
    out.push(nonce.len() as u8);   // 0      nonce length L
    out.extend_from_slice(nonce);  // 1..1+L nonce
    out.extend_from_slice(sealed); // 1+L..  ciphertext || tag

    debug_assert_eq!(out.len(), 1 + nonce.len() + sealed.len());
    Ok(out)
}
