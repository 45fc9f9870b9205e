pub mod types;
pub mod aad;
pub mod aead;
pub mod cipher;
pub mod key;
pub mod nonce;

pub use types::*;
pub use aad::*;
pub use aead::*;
pub use cipher::*;
pub use key::*;
pub use nonce::*;
