//! `twofactor get` — compute the current code for a site.

use crate::codec::VaultCodec;
use crate::errors::{Result, TwoFactorError};
use crate::totp;
use crate::vault::VaultSession;

/// Execute the `get` command and return the code.
pub fn execute<C: VaultCodec>(session: &VaultSession<C>, name: &str) -> Result<String> {
    execute_at(session, name, totp::current_unix_time()?)
}

/// Compute the code for `name` as of `unix_seconds`.
pub fn execute_at<C: VaultCodec>(
    session: &VaultSession<C>,
    name: &str,
    unix_seconds: u64,
) -> Result<String> {
    let vault = session.load()?;
    let record = vault.get(name)?;

    let code = totp::compute(&record.secret, unix_seconds, record.padding.digits()).map_err(
        |e| match e {
            TwoFactorError::InvalidSecret(_) => TwoFactorError::InvalidSecret(name.to_string()),
            other => other,
        },
    )?;

    log::debug!(
        "code for '{name}' valid for {}s",
        totp::seconds_remaining(unix_seconds)
    );
    Ok(code)
}
