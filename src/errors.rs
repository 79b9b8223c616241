use std::path::PathBuf;
use thiserror::Error;

/// All errors that can occur in twofactor.
#[derive(Debug, Error)]
pub enum TwoFactorError {
    // --- Argument errors ---
    #[error("<{0}> is required")]
    MissingArgument(&'static str),

    #[error("'{0}' is not a known site")]
    UnknownName(String),

    #[error("Invalid padding '{0}' — expected a whole number between 1 and {max}", max = crate::vault::Padding::MAX)]
    InvalidPadding(String),

    #[error("Secret for '{0}' is not valid base32")]
    InvalidSecret(String),

    // --- Recipient errors ---
    #[error("More than one private key available ({}) — --fingerprint is required", .0.join(", "))]
    AmbiguousRecipient(Vec<String>),

    #[error("No private keys available — import a key or pass --fingerprint")]
    NoRecipient,

    // --- Vault errors ---
    #[error("Cannot read vault at {}: {reason}", path.display())]
    VaultUnreadable { path: PathBuf, reason: String },

    #[error("Cannot write vault at {}: {reason}", path.display())]
    VaultWriteFailed { path: PathBuf, reason: String },

    // --- Codec errors ---
    #[error("GPG error: {0}")]
    Codec(String),

    // --- Config errors ---
    #[error("Config file error: {0}")]
    Config(String),

    // --- IO errors ---
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // --- CLI errors ---
    #[error("Command failed: {0}")]
    CommandFailed(String),
}

/// Convenience type alias for twofactor results.
pub type Result<T> = std::result::Result<T, TwoFactorError>;
