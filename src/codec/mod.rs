//! Vault codec — the public-key encryption layer under the vault file.
//!
//! This module provides:
//! - The `VaultCodec` trait the vault session depends on
//! - `Identity`, a private key the codec can encrypt to and decrypt with
//! - `GpgCodec`, which drives the `gpg` executable (`gpg`)

pub mod gpg;

use std::fmt;

use zeroize::Zeroizing;

use crate::errors::Result;

pub use gpg::GpgCodec;

/// A private-key identity known to the codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    /// Primary key fingerprint, used as the encryption recipient.
    pub fingerprint: String,

    /// First user id on the key, if any.
    pub user_id: Option<String>,
}

impl Identity {
    pub fn new(fingerprint: impl Into<String>) -> Self {
        Self {
            fingerprint: fingerprint.into(),
            user_id: None,
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.user_id {
            Some(uid) => write!(f, "{} ({uid})", self.fingerprint),
            None => f.write_str(&self.fingerprint),
        }
    }
}

/// Encrypt/decrypt capability the vault is persisted through.
///
/// Implementations own any key-agent or passphrase interaction; callers
/// only see bytes in and bytes out.
pub trait VaultCodec {
    /// Encrypt `plaintext` so that `recipient` can decrypt it.
    fn encrypt(&self, plaintext: &[u8], recipient: &Identity) -> Result<Vec<u8>>;

    /// Decrypt `ciphertext` with whatever private key material is held.
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>>;

    /// List the identities whose private keys are available.
    fn private_identities(&self) -> Result<Vec<Identity>>;
}

impl<C: VaultCodec + ?Sized> VaultCodec for &C {
    fn encrypt(&self, plaintext: &[u8], recipient: &Identity) -> Result<Vec<u8>> {
        (**self).encrypt(plaintext, recipient)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        (**self).decrypt(ciphertext)
    }

    fn private_identities(&self) -> Result<Vec<Identity>> {
        (**self).private_identities()
    }
}
