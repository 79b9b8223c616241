//! Vault module — named TOTP seeds persisted through a codec.
//!
//! This module provides:
//! - `SecretRecord` and its `Padding` digit count (`record`)
//! - The in-memory `Vault` and its mutating operations (`store`)
//! - `VaultSession`, which loads and atomically stores the encrypted file (`session`)

pub mod record;
pub mod session;
pub mod store;

// Re-export the most commonly used items.
pub use record::{Padding, SecretRecord};
pub use session::VaultSession;
pub use store::Vault;
