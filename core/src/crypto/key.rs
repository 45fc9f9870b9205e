//! crypto/key.rs
//! Key validation and post-use scrubbing.
//!
//! Keys are caller-owned buffers borrowed for one call. Validation happens
//! before any random draw or cipher work, so a rejected key leaves no trace.
//! Scrubbing zeroises the buffer and then refills it from the random source,
//! which marks the key as consumed.

use tracing::warn;
use zeroize::Zeroize;

use crate::config::CipherSuite;
use crate::constants::MIN_KEY_LEN;
use crate::crypto::nonce::RandomSource;
use crate::crypto::types::CryptoError;

/// Check that `key` is long enough and has a length `suite` can use.
#[inline]
pub fn validate_key(suite: CipherSuite, key: &[u8]) -> Result<(), CryptoError> {
    if key.len() < MIN_KEY_LEN {
        return Err(CryptoError::invalid_key(key.len(), "shorter than 128 bits"));
    }
    if !suite.key_lengths().contains(&key.len()) {
        return Err(CryptoError::invalid_key(
            key.len(),
            format!("{} accepts key lengths {:?}", suite, suite.key_lengths()),
        ));
    }
    Ok(())
}

/// Overwrite `key` in place: zeroise, then fill with fresh random bytes.
///
/// If the random source fails the buffer stays zeroed, which still destroys
/// the key material.
pub fn scrub_key(key: &mut [u8], random: &dyn RandomSource) {
    key.zeroize();
    if let Err(e) = random.fill(key) {
        warn!(key_len = key.len(), error = %e, "random refill after key scrub failed; key left zeroed");
    }
}
