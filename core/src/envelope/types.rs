//! envelope/types.rs
//! Borrowed and owned envelope views.

use crate::constants::TAG_LEN;
use crate::envelope::decode::decode_envelope;
use crate::envelope::encode::encode_envelope;
use crate::crypto::types::CryptoError;

/// Zero-copy view into envelope bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnvelopeView<'a> {
    pub nonce: &'a [u8],
    /// `ciphertext || tag`
    pub sealed: &'a [u8],
}

impl<'a> EnvelopeView<'a> {
    pub fn ciphertext(&self) -> &'a [u8] {
        &self.sealed[..self.sealed.len() - TAG_LEN]
    }

    pub fn tag(&self) -> &'a [u8] {
        &self.sealed[self.sealed.len() - TAG_LEN..]
    }

    /// Total encoded length.
    pub fn encoded_len(&self) -> usize {
        1 + self.nonce.len() + self.sealed.len()
    }

    pub fn to_envelope(&self) -> Envelope {
        Envelope {
            nonce: self.nonce.to_vec(),
            sealed: self.sealed.to_vec(),
        }
    }
}

/// Owned envelope, for callers that keep nonce and body apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    nonce: Vec<u8>,
    sealed: Vec<u8>,
}

impl Envelope {
    /// Validate the framing constraints and take ownership of the parts.
    pub fn new(nonce: Vec<u8>, sealed: Vec<u8>) -> Result<Self, CryptoError> {
        // Same checks as encoding; the bytes themselves are discarded.
        encode_envelope(&nonce, &sealed)?;
        Ok(Self { nonce, sealed })
    }

    pub fn from_bytes(wire: &[u8]) -> Result<Self, CryptoError> {
        Ok(decode_envelope(wire)?.to_envelope())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.encoded_len());
        out.push(self.nonce.len() as u8);
        out.extend_from_slice(&self.nonce);
        out.extend_from_slice(&self.sealed);
        out
    }

    pub fn view(&self) -> EnvelopeView<'_> {
        EnvelopeView { nonce: &self.nonce, sealed: &self.sealed }
    }

    pub fn nonce(&self) -> &[u8] {
        &self.nonce
    }

    pub fn sealed(&self) -> &[u8] {
        &self.sealed
    }

    /// Total encoded length.
    pub fn encoded_len(&self) -> usize {
        1 + self.nonce.len() + self.sealed.len()
    }
}
