//! Time-based one-time passwords (RFC 6238) on top of HOTP (RFC 4226).
//!
//! Codes use HMAC-SHA1 with a 30-second step. The digit count is a
//! per-record setting rather than the usual fixed six, so `compute`
//! takes it as an argument and zero-pads the result to exactly that
//! many characters.

use chrono::Utc;
use hmac::{Hmac, Mac};
use sha1::Sha1;
use zeroize::Zeroizing;

use crate::errors::{Result, TwoFactorError};

/// Length of one TOTP time step in seconds.
pub const TIME_STEP: u64 = 30;

/// Largest digit count whose modulus still reduces the 31-bit HOTP value.
const MAX_REDUCING_DIGITS: u32 = 9;

/// Compute the TOTP code for `secret_b32` at `unix_seconds`, padded to
/// `digits` characters.
pub fn compute(secret_b32: &str, unix_seconds: u64, digits: u32) -> Result<String> {
    let key = Zeroizing::new(decode_secret(secret_b32)?);
    let counter = unix_seconds / TIME_STEP;
    hotp(&key, counter, digits)
}

/// Seconds until the code valid at `unix_seconds` rolls over.
pub fn seconds_remaining(unix_seconds: u64) -> u64 {
    TIME_STEP - (unix_seconds % TIME_STEP)
}

/// Current Unix time in whole seconds.
pub fn current_unix_time() -> Result<u64> {
    let now = Utc::now().timestamp();
    u64::try_from(now).map_err(|_| {
        TwoFactorError::CommandFailed(format!("system clock is before the Unix epoch ({now})"))
    })
}

/// HOTP value for raw key bytes and a counter, rendered to `digits`.
fn hotp(key: &[u8], counter: u64, digits: u32) -> Result<String> {
    let mut mac = Hmac::<Sha1>::new_from_slice(key)
        .map_err(|e| TwoFactorError::CommandFailed(format!("invalid HMAC key: {e}")))?;
    mac.update(&counter.to_be_bytes());
    let digest = mac.finalize().into_bytes();

    let value = truncate(&digest);
    let code = if digits <= MAX_REDUCING_DIGITS {
        value % 10u32.pow(digits)
    } else {
        value
    };

    Ok(format!("{code:0>width$}", width = digits as usize))
}

/// Dynamic truncation per RFC 4226 §5.3.
fn truncate(digest: &[u8]) -> u32 {
    let offset = (digest[digest.len() - 1] & 0x0f) as usize;
    (u32::from(digest[offset] & 0x7f) << 24)
        | (u32::from(digest[offset + 1]) << 16)
        | (u32::from(digest[offset + 2]) << 8)
        | u32::from(digest[offset + 3])
}

/// Decode a base32 seed into key bytes.
///
/// Accepts lowercase input, embedded spaces or hyphens, and optional
/// trailing `=` padding.
pub fn decode_secret(secret_b32: &str) -> Result<Vec<u8>> {
    let cleaned: String = secret_b32
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '-')
        .collect::<String>()
        .trim_end_matches('=')
        .to_uppercase();

    if cleaned.is_empty() {
        return Err(TwoFactorError::InvalidSecret(secret_b32.to_string()));
    }

    base32::decode(base32::Alphabet::Rfc4648 { padding: false }, &cleaned)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| TwoFactorError::InvalidSecret(secret_b32.to_string()))
}
