//! `twofactor list` — display all sites in aligned columns.

use crate::cli::output;
use crate::codec::VaultCodec;
use crate::errors::Result;
use crate::vault::VaultSession;

/// Execute the `list` command and return the rendered table.
pub fn execute<C: VaultCodec>(session: &VaultSession<C>) -> Result<String> {
    let vault = session.load()?;
    Ok(output::secrets_table(&vault))
}
