/// Minimum accepted key length (128 bits).
pub const MIN_KEY_LEN: usize = 16;

/// Standard 12-byte nonce length for AES-GCM and ChaCha20-Poly1305.
pub const NONCE_LEN_12: usize = 12;

/// Fixed AEAD tag length (bytes).
pub const TAG_LEN: usize = 16;

/// Largest nonce the one-byte length prefix can describe.
pub const MAX_NONCE_LEN: usize = u8::MAX as usize;

/// Smallest well-formed envelope for the standard nonce: prefix + nonce + tag.
pub const MIN_ENVELOPE_LEN: usize = 1 + NONCE_LEN_12 + TAG_LEN;

/// Cipher suite identifiers (stable, used in configuration).
pub mod suite_ids {
    pub const AES_GCM: u16           = 0x0001;
    pub const CHACHA20_POLY1305: u16 = 0x0002;
}

/// Associated-data encoding versions. Bump on any layout change: decrypting
/// with a different encoder version is indistinguishable from tampering.
pub mod aad_versions {
    pub const V1: u8 = 0x01;
}

/// Tags for the canonical associated-data encoding (v1).
pub mod aad_tags {
    pub const BYTES: u8      = 0x01;
    pub const TEXT: u8       = 0x02;
    pub const INT: u8        = 0x03;
    pub const UINT: u8       = 0x04;
    pub const BOOL: u8       = 0x05;
    pub const TIMESTAMP: u8  = 0x06;
    pub const STRUCTURED: u8 = 0x07;
}
