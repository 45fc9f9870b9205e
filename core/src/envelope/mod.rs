//! envelope/mod.rs
//! Byte framing for sealed messages.
//!
//! Wire layout:
//!
//! ```text
//! offset 0      1 byte   nonce length L (normally 12)
//! offset 1      L bytes  nonce
//! offset 1+L    rest     ciphertext || 16-byte tag
//! ```
//!
//! An envelope either parses completely or is rejected; there is no
//! partially valid state.

pub mod types;
pub mod encode;
pub mod decode;

pub use types::*;
pub use encode::*;
pub use decode::*;
