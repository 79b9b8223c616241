//! `twofactor set-description` — change a site's description.

use crate::codec::VaultCodec;
use crate::errors::Result;
use crate::vault::VaultSession;

/// Execute the `set-description` command.
pub fn execute<C: VaultCodec>(
    session: &VaultSession<C>,
    name: &str,
    description: &str,
) -> Result<()> {
    let mut vault = session.load()?;
    vault.set_description(name, description)?;
    session.store(&vault)
}
