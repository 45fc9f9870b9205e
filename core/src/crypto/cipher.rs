//! crypto/cipher.rs
//! Authenticated cipher facade: one call in, one envelope out.
//!
//! Design notes:
//! - `AuthenticatedCipher` has two required byte-level operations; every
//!   convenience overload (structured AAD, timestamps) funnels into them.
//! - `EnvelopeCipher` is the reference engine. It holds only an immutable
//!   `CipherConfig` and a shared random source, so it is `Send + Sync` and
//!   one instance may serve many threads.
//! - Keys are borrowed mutably because key hygiene may overwrite them.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::config::CipherConfig;
use crate::crypto::aad::{encode_aad, timestamp_aad, AadValue};
use crate::crypto::aead::AeadImpl;
use crate::crypto::key::scrub_key;
use crate::crypto::nonce::{generate_nonce_12, OsRandom, RandomSource};
use crate::crypto::types::CryptoError;
use crate::envelope::{decode_envelope, encode_envelope};

/// Single-call authenticated encryption.
pub trait AuthenticatedCipher {
    /// Seal `plaintext` under `key`, binding `aad` (absent and empty are equivalent).
    fn encrypt(&self, key: &mut [u8], plaintext: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>, CryptoError>;

    /// Open an envelope produced by [`AuthenticatedCipher::encrypt`] with the same key and AAD.
    fn decrypt(&self, key: &mut [u8], envelope: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>, CryptoError>;

    /// Seal with an ordered sequence of structured values as AAD.
    /// A single value is a one-element slice.
    fn encrypt_with_values(
        &self,
        key: &mut [u8],
        plaintext: &[u8],
        aad: &[AadValue],
    ) -> Result<Vec<u8>, CryptoError> {
        let aad = encode_aad(aad)?;
        self.encrypt(key, plaintext, Some(&aad))
    }

    fn decrypt_with_values(
        &self,
        key: &mut [u8],
        envelope: &[u8],
        aad: &[AadValue],
    ) -> Result<Vec<u8>, CryptoError> {
        let aad = encode_aad(aad)?;
        self.decrypt(key, envelope, Some(&aad))
    }

    /// Seal binding the current wall-clock instant.
    ///
    /// The binding is one-way: decryption needs the exact same instant (see
    /// [`AuthenticatedCipher::decrypt_at`]). No freshness window is enforced.
    fn encrypt_with_timestamp(&self, key: &mut [u8], plaintext: &[u8]) -> Result<Vec<u8>, CryptoError> {
        self.encrypt_at(key, plaintext, Utc::now())
    }

    fn encrypt_at(&self, key: &mut [u8], plaintext: &[u8], at: DateTime<Utc>) -> Result<Vec<u8>, CryptoError> {
        let aad = timestamp_aad(at)?;
        self.encrypt(key, plaintext, Some(&aad))
    }

    fn decrypt_at(&self, key: &mut [u8], envelope: &[u8], at: DateTime<Utc>) -> Result<Vec<u8>, CryptoError> {
        let aad = timestamp_aad(at)?;
        self.decrypt(key, envelope, Some(&aad))
    }
}

/// Reference engine: AEAD per `CipherConfig::suite`, random 96-bit nonces,
/// `[L][nonce][ciphertext||tag]` envelopes.
#[derive(Debug, Clone)]
pub struct EnvelopeCipher {
    config: CipherConfig,
    random: Arc<dyn RandomSource>,
}

impl Default for EnvelopeCipher {
    fn default() -> Self {
        Self::new(CipherConfig::default())
    }
}

impl EnvelopeCipher {
    /// Engine drawing from the OS CSPRNG.
    pub fn new(config: CipherConfig) -> Self {
        Self::with_random(config, Arc::new(OsRandom))
    }

    pub fn with_random(config: CipherConfig, random: Arc<dyn RandomSource>) -> Self {
        Self { config, random }
    }

    pub fn config(&self) -> &CipherConfig {
        &self.config
    }

    /// Apply the hygiene policy, then hand back the outcome unchanged.
    fn finish<T>(&self, key: &mut [u8], outcome: Result<T, CryptoError>) -> Result<T, CryptoError> {
        if self.config.wipe_key {
            scrub_key(key, self.random.as_ref());
        }
        outcome
    }

    fn seal_envelope(
        &self,
        cipher: &AeadImpl,
        plaintext: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let nonce = generate_nonce_12(self.random.as_ref())?;
        let sealed = cipher.seal(&nonce, aad, plaintext)?;
        encode_envelope(&nonce, &sealed)
    }

    fn open_envelope(
        &self,
        cipher: &AeadImpl,
        envelope: &[u8],
        aad: Option<&[u8]>,
    ) -> Result<Vec<u8>, CryptoError> {
        let view = decode_envelope(envelope)?;
        cipher.open(view.nonce, aad, view.sealed)
    }
}

impl AuthenticatedCipher for EnvelopeCipher {
    fn encrypt(&self, key: &mut [u8], plaintext: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>, CryptoError> {
        let cipher = AeadImpl::new(self.config.suite, key)?;
        let name = cipher.name();
        let outcome = self.seal_envelope(&cipher, plaintext, aad);
        drop(cipher);

        match &outcome {
            Ok(envelope) => debug!(
                cipher = name,
                plaintext_len = plaintext.len(),
                aad_len = aad.map_or(0, <[u8]>::len),
                envelope_len = envelope.len(),
                "envelope sealed"
            ),
            Err(e) => debug!(kind = %e.kind(), "envelope sealing failed"),
        }
        self.finish(key, outcome)
    }

    fn decrypt(&self, key: &mut [u8], envelope: &[u8], aad: Option<&[u8]>) -> Result<Vec<u8>, CryptoError> {
        let cipher = AeadImpl::new(self.config.suite, key)?;
        let name = cipher.name();
        let outcome = self.open_envelope(&cipher, envelope, aad);
        drop(cipher);

        match &outcome {
            Ok(plaintext) => debug!(
                cipher = name,
                envelope_len = envelope.len(),
                plaintext_len = plaintext.len(),
                "envelope opened"
            ),
            Err(e) => debug!(kind = %e.kind(), envelope_len = envelope.len(), "envelope rejected"),
        }
        self.finish(key, outcome)
    }
}
