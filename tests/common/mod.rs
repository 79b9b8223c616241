//! Shared helpers for integration tests: an in-memory codec and temp vaults.

#![allow(dead_code)]

use std::cell::Cell;
use std::path::PathBuf;

use tempfile::TempDir;
use twofactor::codec::{Identity, VaultCodec};
use twofactor::errors::{Result, TwoFactorError};
use twofactor::vault::VaultSession;
use zeroize::Zeroizing;

pub const ALICE: &str = "AAAA1111AAAA1111AAAA1111AAAA1111AAAA1111";
pub const BOB: &str = "BBBB2222BBBB2222BBBB2222BBBB2222BBBB2222";

const MAGIC: &[u8] = b"FAKEPGP\n";

/// Codec that "encrypts" by tagging the recipient and flipping bits.
///
/// Decryption only succeeds if the tagged recipient is one of the
/// identities this codec holds, mirroring a missing private key.
pub struct FakeCodec {
    identities: Vec<Identity>,
    fail_encrypt: bool,
    encrypt_calls: Cell<usize>,
}

impl FakeCodec {
    pub fn with_keys(fingerprints: &[&str]) -> Self {
        Self {
            identities: fingerprints.iter().map(|f| Identity::new(*f)).collect(),
            fail_encrypt: false,
            encrypt_calls: Cell::new(0),
        }
    }

    pub fn alice() -> Self {
        Self::with_keys(&[ALICE])
    }

    pub fn failing_encrypt(mut self) -> Self {
        self.fail_encrypt = true;
        self
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.get()
    }

    /// Produce ciphertext for arbitrary plaintext, as if written earlier.
    pub fn seal(plaintext: &[u8], fingerprint: &str) -> Vec<u8> {
        let mut out = MAGIC.to_vec();
        out.extend_from_slice(fingerprint.as_bytes());
        out.push(b'\n');
        out.extend(plaintext.iter().map(|b| b ^ 0x5a));
        out
    }
}

impl VaultCodec for FakeCodec {
    fn encrypt(&self, plaintext: &[u8], recipient: &Identity) -> Result<Vec<u8>> {
        self.encrypt_calls.set(self.encrypt_calls.get() + 1);
        if self.fail_encrypt {
            return Err(TwoFactorError::Codec("encryption refused".into()));
        }
        Ok(Self::seal(plaintext, &recipient.fingerprint))
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        let body = ciphertext
            .strip_prefix(MAGIC)
            .ok_or_else(|| TwoFactorError::Codec("no valid OpenPGP data found".into()))?;
        let newline = body
            .iter()
            .position(|b| *b == b'\n')
            .ok_or_else(|| TwoFactorError::Codec("truncated message".into()))?;
        let fingerprint = String::from_utf8_lossy(&body[..newline]);
        if !self.identities.iter().any(|id| id.fingerprint == fingerprint) {
            return Err(TwoFactorError::Codec("decryption failed: No secret key".into()));
        }
        Ok(Zeroizing::new(
            body[newline + 1..].iter().map(|b| b ^ 0x5a).collect(),
        ))
    }

    fn private_identities(&self) -> Result<Vec<Identity>> {
        Ok(self.identities.clone())
    }
}

/// A temp dir plus the vault path inside it.
pub fn vault_path() -> (TempDir, PathBuf) {
    let dir = TempDir::new().expect("create temp dir");
    let path = dir.path().join("vault.gpg");
    (dir, path)
}

/// A session on `path` with Alice's key and no explicit recipient.
pub fn alice_session(path: &std::path::Path) -> VaultSession<FakeCodec> {
    VaultSession::new(path, FakeCodec::alice(), None)
}
