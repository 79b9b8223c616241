//! `twofactor rename` — move a site to a new name.

use crate::codec::VaultCodec;
use crate::errors::Result;
use crate::vault::VaultSession;

/// Execute the `rename` command.
///
/// Fails without touching the vault file if `name` is unknown. A site
/// already called `new_name` is overwritten.
pub fn execute<C: VaultCodec>(session: &VaultSession<C>, name: &str, new_name: &str) -> Result<()> {
    let mut vault = session.load()?;
    vault.rename(name, new_name)?;
    session.store(&vault)
}
