//! config.rs
//! Immutable engine configuration.
//!
//! Built once (usually at process start, optionally from JSON) and handed to
//! `EnvelopeCipher` by value. Engines never mutate it, so a built engine can
//! be shared freely between threads.

use std::fmt;

use num_enum::TryFromPrimitive;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::constants::suite_ids;

/// AEAD suite used by an engine.
///
/// The envelope does not record the suite; both sides must be configured alike.
#[repr(u16)]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, TryFromPrimitive, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CipherSuite {
    /// AES-GCM; the key length picks AES-128, AES-192 or AES-256.
    AesGcm           = suite_ids::AES_GCM,
    /// ChaCha20-Poly1305; 32-byte keys only.
    #[serde(rename = "chacha20_poly1305")]
    ChaCha20Poly1305 = suite_ids::CHACHA20_POLY1305,
}

impl Default for CipherSuite {
    fn default() -> Self {
        CipherSuite::AesGcm
    }
}

impl CipherSuite {
    /// Stable registry id.
    pub fn id(self) -> u16 {
        self as u16
    }

    pub fn from_id(raw: u16) -> Result<Self, ConfigError> {
        CipherSuite::try_from_primitive(raw).map_err(|_| ConfigError::UnknownSuite { raw })
    }

    /// Key lengths (bytes) this suite accepts.
    pub fn key_lengths(self) -> &'static [usize] {
        match self {
            CipherSuite::AesGcm           => &[16, 24, 32],
            CipherSuite::ChaCha20Poly1305 => &[32],
        }
    }
}

impl fmt::Display for CipherSuite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CipherSuite::AesGcm           => "AES-GCM",
            CipherSuite::ChaCha20Poly1305 => "ChaCha20-Poly1305",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown cipher suite id: 0x{raw:04x}")]
    UnknownSuite { raw: u16 },

    #[error("invalid cipher configuration: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Engine configuration.
///
/// `wipe_key` is the key-hygiene toggle: when set, the caller's key buffer is
/// overwritten with random bytes after every encrypt/decrypt that got past key
/// validation. Callers that reuse a key across calls must turn it off and keep
/// their own copies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CipherConfig {
    pub suite: CipherSuite,
    pub wipe_key: bool,
}

impl Default for CipherConfig {
    fn default() -> Self {
        Self {
            suite: CipherSuite::AesGcm,
            wipe_key: true,
        }
    }
}

impl CipherConfig {
    pub fn with_suite(mut self, suite: CipherSuite) -> Self {
        self.suite = suite;
        self
    }

    pub fn without_key_wipe(mut self) -> Self {
        self.wipe_key = false;
        self
    }

    /// Parse a JSON document such as `{"suite": "chacha20_poly1305", "wipe_key": false}`.
    /// Missing fields take their defaults; unknown fields are rejected.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}
