//! crypto/nonce.rs
//! Random nonce generation behind an injectable random source.
//!
//! Design:
//! - Every encryption draws a fresh 96-bit nonce. No counters, no derivation.
//! - The source is a trait object so engines can be built with the OS CSPRNG
//!   in production and a recording source in tests.
//!
//! Security notes:
//! - Random 96-bit nonces collide with probability ~2^-32 after 2^32 seals
//!   under one key. Rotate keys well before that volume.
//! - Nonce reuse is not detected at runtime.

use std::fmt;

use rand::rngs::OsRng;
use rand::RngCore;

use crate::constants::NONCE_LEN_12;
use crate::crypto::types::CryptoError;

/// Source of cryptographically secure random bytes.
///
/// Implementations must be safe to share across threads; engines hold them
/// behind an `Arc` and draw from them concurrently.
pub trait RandomSource: Send + Sync + fmt::Debug {
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error>;
}

/// Operating-system CSPRNG (`getrandom` via `rand::rngs::OsRng`).
///
/// May block briefly while the OS entropy pool initialises; steady-state
/// draws do not block.
#[derive(Debug, Clone, Copy, Default)]
pub struct OsRandom;

impl RandomSource for OsRandom {
    #[inline]
    fn fill(&self, dest: &mut [u8]) -> Result<(), rand::Error> {
        OsRng.try_fill_bytes(dest)
    }
}

/// Draw a fresh 12-byte nonce.
#[inline]
pub fn generate_nonce_12(random: &dyn RandomSource) -> Result<[u8; NONCE_LEN_12], CryptoError> {
    let mut nonce = [0u8; NONCE_LEN_12];
    random.fill(&mut nonce).map_err(CryptoError::EntropyUnavailable)?;
    Ok(nonce)
}
