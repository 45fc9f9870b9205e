//! aead-envelope
//!
//! Single-call authenticated encryption: a key, a plaintext and optional
//! associated data in; one self-describing byte string out.
//! Synchronous, in-memory, no I/O.

#![forbid(unsafe_code)]

// Shared and top level
pub mod config;
pub mod constants;

pub mod crypto;
pub mod envelope;

// -----------------------------------------------------------------------------
// Prelude (Rust users)
// -----------------------------------------------------------------------------
pub mod prelude {
    pub use crate::config::{CipherConfig, CipherSuite};
    pub use crate::crypto::{AadValue, AuthenticatedCipher, CryptoError, EnvelopeCipher, ErrorKind, OsRandom, RandomSource};
    pub use crate::envelope::{Envelope, EnvelopeView};
}

pub use config::{CipherConfig, CipherSuite, ConfigError};
pub use crypto::{AadValue, AuthenticatedCipher, CryptoError, EnvelopeCipher, ErrorKind};
