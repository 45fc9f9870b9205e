//! crypto/aead.rs
//! AEAD adapter over AES-GCM (128/192/256) and ChaCha20-Poly1305.
//!
//! Design notes:
//! - All variants use 12-byte nonces and 16-byte tags.
//! - Tag verification is constant-time and fails closed (no partial plaintext).
//! - Every `open` failure collapses to `CryptoError::AuthenticationFailure`.
//! - An `AeadImpl` is built per call from the caller's key; nothing keyed is
//!   shared between calls, so concurrent engines never race on a transform.

use aes_gcm::aead::consts::U12;
use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::aes::Aes192;
use aes_gcm::{Aes128Gcm, Aes256Gcm, AesGcm};
use chacha20poly1305::ChaCha20Poly1305;
use tracing::trace;

use crate::config::CipherSuite;
use crate::constants::{NONCE_LEN_12, TAG_LEN};
use crate::crypto::key::validate_key;
use crate::crypto::types::CryptoError;

type Aes192Gcm = AesGcm<Aes192, U12>;

/// Keyed AEAD transform selected by suite and key length.
#[derive(Clone)]
pub enum AeadImpl {
    Aes128Gcm(Aes128Gcm),
    Aes192Gcm(Aes192Gcm),
    Aes256Gcm(Aes256Gcm),
    ChaCha(ChaCha20Poly1305),
}

impl AeadImpl {
    /// Build the transform for `suite` from `key`.
    ///
    /// Fails with `InvalidKey` (and touches nothing else) when the key is
    /// shorter than 128 bits or has a length the suite cannot use.
    pub fn new(suite: CipherSuite, key: &[u8]) -> Result<Self, CryptoError> {
        validate_key(suite, key)?;

        let bad_key = |_| CryptoError::invalid_key(key.len(), format!("rejected by {}", suite));
        let cipher = match (suite, key.len()) {
            (CipherSuite::AesGcm, 16) => Self::Aes128Gcm(Aes128Gcm::new_from_slice(key).map_err(bad_key)?),
            (CipherSuite::AesGcm, 24) => Self::Aes192Gcm(Aes192Gcm::new_from_slice(key).map_err(bad_key)?),
            (CipherSuite::AesGcm, _)  => Self::Aes256Gcm(Aes256Gcm::new_from_slice(key).map_err(bad_key)?),
            (CipherSuite::ChaCha20Poly1305, _) => {
                Self::ChaCha(ChaCha20Poly1305::new_from_slice(key).map_err(bad_key)?)
            }
        };
        Ok(cipher)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AeadImpl::Aes128Gcm(_) => "AES-128-GCM",
            AeadImpl::Aes192Gcm(_) => "AES-192-GCM",
            AeadImpl::Aes256Gcm(_) => "AES-256-GCM",
            AeadImpl::ChaCha(_)    => "ChaCha20-Poly1305",
        }
    }

    /// AEAD seal: returns `ciphertext || tag`. Empty plaintext yields a bare tag.
    pub fn seal(
        &self,
        nonce_12: &[u8; NONCE_LEN_12],
        aad: Option<&[u8]>,
        plaintext: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        let payload = Payload { msg: plaintext, aad: aad.unwrap_or_default() };

        let sealed = match self {
            AeadImpl::Aes128Gcm(c) => seal_with(c, nonce_12, payload),
            AeadImpl::Aes192Gcm(c) => seal_with(c, nonce_12, payload),
            AeadImpl::Aes256Gcm(c) => seal_with(c, nonce_12, payload),
            AeadImpl::ChaCha(c)    => seal_with(c, nonce_12, payload),
        }
        // Only reachable past the per-message length limit (~64 GiB).
        .map_err(|_| CryptoError::malformed("plaintext exceeds the cipher's message limit"))?;

        debug_assert_eq!(sealed.len(), plaintext.len() + TAG_LEN);
        trace!(cipher = self.name(), sealed_len = sealed.len(), "sealed");
        Ok(sealed)
    }

    /// AEAD open: verifies the tag over nonce, AAD and ciphertext.
    ///
    /// A nonce of the wrong length or a body shorter than the tag is treated
    /// exactly like a bad tag.
    pub fn open(
        &self,
        nonce: &[u8],
        aad: Option<&[u8]>,
        ciphertext_and_tag: &[u8],
    ) -> Result<Vec<u8>, CryptoError> {
        if nonce.len() != NONCE_LEN_12 || ciphertext_and_tag.len() < TAG_LEN {
            return Err(CryptoError::AuthenticationFailure);
        }
        let payload = Payload { msg: ciphertext_and_tag, aad: aad.unwrap_or_default() };

        match self {
            AeadImpl::Aes128Gcm(c) => open_with(c, nonce, payload),
            AeadImpl::Aes192Gcm(c) => open_with(c, nonce, payload),
            AeadImpl::Aes256Gcm(c) => open_with(c, nonce, payload),
            AeadImpl::ChaCha(c)    => open_with(c, nonce, payload),
        }
        .map_err(|_| CryptoError::AuthenticationFailure)
    }
}

#[inline]
fn seal_with<A: Aead>(cipher: &A, nonce: &[u8], payload: Payload<'_, '_>) -> Result<Vec<u8>, aes_gcm::aead::Error> {
    cipher.encrypt(aes_gcm::aead::Nonce::<A>::from_slice(nonce), payload)
}

#[inline]
fn open_with<A: Aead>(cipher: &A, nonce: &[u8], payload: Payload<'_, '_>) -> Result<Vec<u8>, aes_gcm::aead::Error> {
    cipher.decrypt(aes_gcm::aead::Nonce::<A>::from_slice(nonce), payload)
}
