//! `GpgCodec` — vault encryption through the `gpg` executable.
//!
//! Every operation spawns one `gpg --batch` process. Input is fed on
//! stdin from a scoped thread so large payloads cannot deadlock against
//! a full stdout pipe.
//!
//! With the agent enabled (the default), passphrases are gpg-agent's
//! business. With the agent disabled, the passphrase is read from
//! `TWOFACTOR_PASSPHRASE` or prompted for, and handed to gpg through
//! loopback pinentry; the ciphertext then travels through a private
//! temp file because stdin carries the passphrase.

use std::ffi::OsString;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

use tempfile::NamedTempFile;
use zeroize::Zeroizing;

use super::{Identity, VaultCodec};
use crate::errors::{Result, TwoFactorError};

/// Environment variable consulted for the passphrase when the agent is off.
pub const PASSPHRASE_ENV: &str = "TWOFACTOR_PASSPHRASE";

/// Prompted passphrase attempts before giving up.
const MAX_PASSPHRASE_ATTEMPTS: usize = 3;

/// Codec backed by a locally installed GnuPG.
#[derive(Debug, Clone)]
pub struct GpgCodec {
    program: String,
    home: Option<PathBuf>,
    use_agent: bool,
}

impl GpgCodec {
    /// Create a codec that runs `program` (e.g. `gpg` or `/usr/bin/gpg2`).
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            home: None,
            use_agent: true,
        }
    }

    /// Use a specific GnuPG home directory instead of gpg's default.
    pub fn with_home(mut self, home: Option<PathBuf>) -> Self {
        self.home = home;
        self
    }

    /// Enable or disable gpg-agent passphrase handling.
    pub fn with_agent(mut self, use_agent: bool) -> Self {
        self.use_agent = use_agent;
        self
    }

    /// Run gpg with `args`, writing `input` to its stdin.
    fn run(&self, args: &[OsString], input: &[u8]) -> Result<Output> {
        let mut cmd = Command::new(&self.program);
        cmd.arg("--batch").arg("--quiet").arg("--yes");
        if let Some(home) = &self.home {
            cmd.arg("--homedir").arg(home);
        }
        cmd.args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        log::debug!("running {} {:?}", self.program, args);

        let mut child = cmd.spawn().map_err(|e| {
            TwoFactorError::Codec(format!("cannot run '{}': {e}", self.program))
        })?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| TwoFactorError::Codec("gpg stdin unavailable".into()))?;

        let output = std::thread::scope(|scope| {
            let writer = scope.spawn(move || {
                // gpg may exit before reading everything; its exit status
                // carries the real error, so a broken pipe here is ignored.
                let _ = stdin.write_all(input);
            });
            let output = child.wait_with_output();
            let _ = writer.join();
            output
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = stderr.trim();
            return Err(TwoFactorError::Codec(if detail.is_empty() {
                format!("{} exited with {}", self.program, output.status)
            } else {
                detail.to_string()
            }));
        }

        Ok(output)
    }

    /// Decrypt through loopback pinentry with an explicit passphrase.
    fn decrypt_with_passphrase(
        &self,
        ciphertext: &[u8],
        passphrase: &str,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let mut file = NamedTempFile::new()?;
        file.write_all(ciphertext)?;
        file.flush()?;

        let args = [
            OsString::from("--pinentry-mode"),
            OsString::from("loopback"),
            OsString::from("--passphrase-fd"),
            OsString::from("0"),
            OsString::from("--decrypt"),
            file.path().as_os_str().to_os_string(),
        ];

        let mut input = Zeroizing::new(Vec::with_capacity(passphrase.len() + 1));
        input.extend_from_slice(passphrase.as_bytes());
        input.push(b'\n');

        let output = self.run(&args, &input)?;
        Ok(Zeroizing::new(output.stdout))
    }

    /// Ask `passphrase` for up to `MAX_PASSPHRASE_ATTEMPTS` passphrases
    /// until one decrypts.
    fn decrypt_with_retries(
        &self,
        ciphertext: &[u8],
        mut passphrase: impl FnMut() -> Result<Zeroizing<String>>,
    ) -> Result<Zeroizing<Vec<u8>>> {
        let mut attempt = 1;
        loop {
            let pw = passphrase()?;
            match self.decrypt_with_passphrase(ciphertext, &pw) {
                Ok(plaintext) => return Ok(plaintext),
                Err(e) if attempt < MAX_PASSPHRASE_ATTEMPTS => {
                    log::warn!("decryption attempt {attempt} failed, try again: {e}");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl VaultCodec for GpgCodec {
    fn encrypt(&self, plaintext: &[u8], recipient: &Identity) -> Result<Vec<u8>> {
        let args = [
            OsString::from("--armor"),
            OsString::from("--trust-model"),
            OsString::from("always"),
            OsString::from("--encrypt"),
            OsString::from("--recipient"),
            OsString::from(&recipient.fingerprint),
        ];
        let output = self.run(&args, plaintext)?;
        if output.stdout.is_empty() {
            return Err(TwoFactorError::Codec(format!(
                "gpg produced no ciphertext for {recipient}"
            )));
        }
        Ok(output.stdout)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
        if self.use_agent {
            let output = self.run(&[OsString::from("--decrypt")], ciphertext)?;
            return Ok(Zeroizing::new(output.stdout));
        }

        if let Ok(pw) = std::env::var(PASSPHRASE_ENV) {
            if !pw.is_empty() {
                let pw = Zeroizing::new(pw);
                return self.decrypt_with_passphrase(ciphertext, &pw);
            }
        }

        self.decrypt_with_retries(ciphertext, prompt_passphrase)
    }

    fn private_identities(&self) -> Result<Vec<Identity>> {
        let args = [
            OsString::from("--with-colons"),
            OsString::from("--with-fingerprint"),
            OsString::from("--list-secret-keys"),
        ];
        let output = self.run(&args, &[])?;
        let listing = String::from_utf8_lossy(&output.stdout);
        Ok(parse_secret_keys(&listing))
    }
}

/// Prompt for the key passphrase on the terminal.
fn prompt_passphrase() -> Result<Zeroizing<String>> {
    let pw = dialoguer::Password::new()
        .with_prompt("Enter GPG key passphrase")
        .allow_empty_password(true)
        .interact()
        .map_err(|e| TwoFactorError::CommandFailed(format!("passphrase prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Extract usable primary keys from `gpg --with-colons --list-secret-keys`.
///
/// Each `sec` record opens a key; the first `fpr` after it is the
/// primary fingerprint and the first `uid` its user id. Revoked and
/// expired keys are skipped.
pub fn parse_secret_keys(listing: &str) -> Vec<Identity> {
    let mut identities = Vec::new();
    let mut current: Option<Identity> = None;
    let mut awaiting_fpr = false;
    let mut usable = false;

    for line in listing.lines() {
        let fields: Vec<&str> = line.split(':').collect();
        match fields.first().copied() {
            Some("sec") => {
                if let Some(id) = current.take().filter(|_| usable) {
                    identities.push(id);
                }
                let validity = fields.get(1).copied().unwrap_or("");
                usable = !matches!(validity, "r" | "e");
                current = Some(Identity::new(String::new()));
                awaiting_fpr = true;
            }
            Some("fpr") if awaiting_fpr => {
                if let (Some(id), Some(fpr)) = (current.as_mut(), fields.get(9)) {
                    id.fingerprint = (*fpr).to_string();
                }
                awaiting_fpr = false;
            }
            Some("uid") => {
                if let (Some(id), Some(uid)) = (current.as_mut(), fields.get(9)) {
                    if id.user_id.is_none() && !uid.is_empty() {
                        id.user_id = Some((*uid).to_string());
                    }
                }
            }
            _ => {}
        }
    }

    if let Some(id) = current.filter(|_| usable) {
        identities.push(id);
    }

    identities.retain(|id| !id.fingerprint.is_empty());
    identities
}
