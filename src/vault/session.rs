//! Loading and storing the vault file through a codec.
//!
//! A `VaultSession` ties together the vault path, the codec instance
//! for this invocation, and an optional explicit recipient. It is
//! created once per process and dropped at exit.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use crate::codec::{Identity, VaultCodec};
use crate::errors::{Result, TwoFactorError};

use super::record::SecretRecord;
use super::store::Vault;

/// One invocation's view of the vault file.
pub struct VaultSession<C: VaultCodec> {
    path: PathBuf,
    codec: C,
    recipient: Option<String>,
}

impl<C: VaultCodec> VaultSession<C> {
    /// Create a session for the vault at `path`.
    ///
    /// `recipient` is an explicit key fingerprint; pass `None` to use
    /// the single private key the codec knows about.
    pub fn new(path: impl Into<PathBuf>, codec: C, recipient: Option<String>) -> Self {
        Self {
            path: path.into(),
            codec,
            recipient,
        }
    }

    /// Load the vault, or an empty one if the file does not exist.
    pub fn load(&self) -> Result<Vault> {
        match fs::metadata(&self.path) {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no vault at {}, starting empty", self.path.display());
                return Ok(Vault::new());
            }
            Err(e) => return Err(self.unreadable(e)),
        }

        let ciphertext = fs::read(&self.path).map_err(|e| self.unreadable(e))?;
        let plaintext = self.codec.decrypt(&ciphertext).map_err(|e| self.unreadable(e))?;
        let vault = decode(&plaintext).map_err(|e| self.unreadable(e))?;

        log::debug!(
            "loaded {} record(s) from {}",
            vault.len(),
            self.path.display()
        );
        Ok(vault)
    }

    /// Encrypt and write the whole vault, replacing the file atomically.
    ///
    /// The recipient is resolved before anything is written, and the
    /// ciphertext lands in a temp file beside the target that is then
    /// renamed over it, so a failure at any step leaves the previous
    /// vault file as it was.
    pub fn store(&self, vault: &Vault) -> Result<()> {
        let recipient = self.resolve_recipient()?;

        let plaintext = encode(vault).map_err(|e| self.write_failed(e))?;
        let ciphertext = self
            .codec
            .encrypt(&plaintext, &recipient)
            .map_err(|e| self.write_failed(e))?;

        write_atomic(&self.path, &ciphertext).map_err(|e| self.write_failed(e))?;

        log::debug!(
            "stored {} record(s) to {} for {recipient}",
            vault.len(),
            self.path.display()
        );
        Ok(())
    }

    /// Pick the identity the vault is encrypted to.
    ///
    /// An explicit fingerprint wins. Otherwise the codec must hold
    /// exactly one private key.
    pub fn resolve_recipient(&self) -> Result<Identity> {
        if let Some(fpr) = &self.recipient {
            return Ok(Identity::new(fpr.clone()));
        }

        let mut identities = self.codec.private_identities()?;
        match identities.len() {
            0 => Err(TwoFactorError::NoRecipient),
            1 => {
                let id = identities.remove(0);
                log::debug!("using the only private key: {id}");
                Ok(id)
            }
            _ => Err(TwoFactorError::AmbiguousRecipient(
                identities.into_iter().map(|id| id.fingerprint).collect(),
            )),
        }
    }

    fn unreadable(&self, err: impl std::fmt::Display) -> TwoFactorError {
        TwoFactorError::VaultUnreadable {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }

    fn write_failed(&self, err: impl std::fmt::Display) -> TwoFactorError {
        TwoFactorError::VaultWriteFailed {
            path: self.path.clone(),
            reason: err.to_string(),
        }
    }
}

/// Serialize a vault to its canonical JSON plaintext.
pub fn encode(vault: &Vault) -> serde_json::Result<Zeroizing<Vec<u8>>> {
    serde_json::to_vec(vault.records()).map(Zeroizing::new)
}

/// Parse JSON plaintext back into a vault.
pub fn decode(plaintext: &[u8]) -> serde_json::Result<Vault> {
    let records: BTreeMap<String, SecretRecord> = serde_json::from_slice(plaintext)?;
    Ok(Vault::from_records(records))
}

/// Write `bytes` to `path` via a temp file in the same directory.
///
/// The rename is atomic on the same filesystem, so readers never see a
/// half-written vault. The temp file is created owner-only. If `path`
/// is a symlink, the file it points to is replaced and the link stays.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let target = resolve_target(path)?;
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    tmp.persist(&target).map_err(|e| e.error)?;

    Ok(())
}

/// The file a write to `path` should land on, following symlinks.
fn resolve_target(path: &Path) -> io::Result<PathBuf> {
    let meta = match fs::symlink_metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(path.to_path_buf()),
        Err(e) => return Err(e),
    };
    if !meta.file_type().is_symlink() {
        return Ok(path.to_path_buf());
    }

    match fs::canonicalize(path) {
        Ok(real) => Ok(real),
        // Dangling link: create the file it names.
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            let link = fs::read_link(path)?;
            Ok(match path.parent() {
                Some(dir) if link.is_relative() => dir.join(link),
                _ => link,
            })
        }
        Err(e) => Err(e),
    }
}
