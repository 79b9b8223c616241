//! `twofactor set-padding` — change how many digits a site's code has.

use crate::codec::VaultCodec;
use crate::errors::Result;
use crate::vault::{Padding, VaultSession};

/// Execute the `set-padding` command.
///
/// The padding is validated before the vault is even loaded.
pub fn execute<C: VaultCodec>(session: &VaultSession<C>, name: &str, padding: &str) -> Result<()> {
    let padding: Padding = padding.parse()?;

    let mut vault = session.load()?;
    vault.set_padding(name, padding)?;
    session.store(&vault)
}
