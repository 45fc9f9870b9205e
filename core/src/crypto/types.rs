//! crypto/types.rs
//! Error taxonomy shared by every layer of the envelope engine.
//!
//! Design notes:
//! - One error family, four contract kinds plus entropy failure.
//! - `AuthenticationFailure` carries nothing: wrong key, wrong AAD, a flipped
//!   tag bit and a truncated body must be indistinguishable to the caller.
//! - No variant ever carries partial plaintext.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

/// Boxed underlying cause attached to non-authentication errors.
pub type BoxedCause = Box<dyn StdError + Send + Sync + 'static>;

/// Coarse error classification for front ends (exit codes, user messages).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidKey,
    AuthenticationFailure,
    MalformedEnvelope,
    SerializationFailure,
    EntropyUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::InvalidKey            => "invalid_key",
            ErrorKind::AuthenticationFailure => "authentication_failure",
            ErrorKind::MalformedEnvelope     => "malformed_envelope",
            ErrorKind::SerializationFailure  => "serialization_failure",
            ErrorKind::EntropyUnavailable    => "entropy_unavailable",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CryptoError {
    /// Key rejected before any random draw or cipher invocation.
    #[error("invalid key ({actual} bytes): {reason}")]
    InvalidKey { actual: usize, reason: String },

    /// Integrity check failed. Deliberately opaque.
    #[error("authentication failed")]
    AuthenticationFailure,

    /// Envelope bytes do not follow the `[L][nonce][ciphertext||tag]` layout.
    #[error("malformed envelope: {0}")]
    MalformedEnvelope(String),

    /// Structured associated data could not be rendered to canonical bytes.
    #[error("cannot serialize associated data: {message}")]
    SerializationFailure {
        message: String,
        #[source]
        source: Option<BoxedCause>,
    },

    /// The random source could not produce bytes.
    #[error("random source unavailable: {0}")]
    EntropyUnavailable(#[source] rand::Error),
}

impl CryptoError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            CryptoError::InvalidKey { .. }           => ErrorKind::InvalidKey,
            CryptoError::AuthenticationFailure       => ErrorKind::AuthenticationFailure,
            CryptoError::MalformedEnvelope(_)        => ErrorKind::MalformedEnvelope,
            CryptoError::SerializationFailure { .. } => ErrorKind::SerializationFailure,
            CryptoError::EntropyUnavailable(_)       => ErrorKind::EntropyUnavailable,
        }
    }

    pub(crate) fn invalid_key(actual: usize, reason: impl Into<String>) -> Self {
        CryptoError::InvalidKey { actual, reason: reason.into() }
    }

    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        CryptoError::MalformedEnvelope(msg.into())
    }

    pub(crate) fn serialization(msg: impl Into<String>) -> Self {
        CryptoError::SerializationFailure { message: msg.into(), source: None }
    }

    pub(crate) fn serialization_caused_by<E>(msg: impl Into<String>, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        CryptoError::SerializationFailure {
            message: msg.into(),
            source: Some(Box::new(cause)),
        }
    }
}
