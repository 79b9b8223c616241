//! `twofactor add` — insert or overwrite a site.

use crate::codec::VaultCodec;
use crate::errors::{Result, TwoFactorError};
use crate::vault::{Padding, SecretRecord, VaultSession};

/// Execute the `add` command.
///
/// An existing site with the same name is replaced wholesale.
pub fn execute<C: VaultCodec>(
    session: &VaultSession<C>,
    name: &str,
    secret: &str,
    description: Option<&str>,
    padding: Option<&str>,
) -> Result<()> {
    if name.trim().is_empty() {
        return Err(TwoFactorError::MissingArgument("name"));
    }
    if secret.trim().is_empty() {
        return Err(TwoFactorError::MissingArgument("secret"));
    }
    let padding = match padding {
        Some(p) => p.parse::<Padding>()?,
        None => Padding::default(),
    };
    let record = SecretRecord::new(name, secret, description.unwrap_or(""), padding);

    let mut vault = session.load()?;
    let existed = vault.contains(name);
    vault.add(record)?;
    session.store(&vault)?;

    log::info!(
        "{} '{name}' ({} digits)",
        if existed { "replaced" } else { "added" },
        padding
    );
    Ok(())
}
