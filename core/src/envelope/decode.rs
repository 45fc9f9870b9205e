//! envelope/decode.rs
//!
//! Design notes:
//! - Structural checks only; authenticity is the AEAD's job.
//! - Minimum length is `1 + L + 16` for the declared nonce length `L`.

use crate::constants::TAG_LEN;
use crate::crypto::types::CryptoError;
use crate::envelope::types::EnvelopeView;

/// Split envelope bytes into nonce and `ciphertext || tag` without copying.
#[inline]
pub fn decode_envelope(wire: &[u8]) -> Result<EnvelopeView<'_>, CryptoError> {
    let (&nonce_len, rest) = wire
        .split_first()
        .ok_or_else(|| CryptoError::malformed("empty input"))?;
    let nonce_len = nonce_len as usize;

    if rest.len() < nonce_len {
        return Err(CryptoError::malformed(format!(
            "declared nonce length {} exceeds the {} remaining bytes",
            nonce_len,
            rest.len()
        )));
    }

    let need = 1 + nonce_len + TAG_LEN;
    if wire.len() < need {
        return Err(CryptoError::malformed(format!(
            "envelope of {} bytes is shorter than the {}-byte minimum",
            wire.len(),
            need
        )));
    }

    let (nonce, sealed) = rest.split_at(nonce_len);
    Ok(EnvelopeView { nonce, sealed })
}
