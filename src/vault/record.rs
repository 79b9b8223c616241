//! `SecretRecord` and its `Padding` digit count.
//!
//! Older vaults stored `padding` as whatever the argument parser handed
//! over, which was an integer for the default and a string when the
//! user typed one. Deserialization accepts both and normalizes to the
//! integer form; serialization always writes an integer.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::errors::{Result, TwoFactorError};

/// A single named TOTP seed stored in the vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecretRecord {
    /// The shared base32 seed.
    pub secret: String,

    /// Free-text description shown by `list`.
    #[serde(default)]
    pub description: String,

    /// Key of this record in the vault. Repaired on load if it drifted.
    #[serde(default)]
    pub name: String,

    /// Number of digits the code is padded to.
    #[serde(default)]
    pub padding: Padding,
}

impl SecretRecord {
    pub fn new(name: &str, secret: &str, description: &str, padding: Padding) -> Self {
        Self {
            secret: secret.to_string(),
            description: description.to_string(),
            name: name.to_string(),
            padding,
        }
    }
}

/// Number of digits a TOTP code is rendered with. Always at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Padding(u32);

impl Padding {
    /// Digit count used when none is given.
    pub const DEFAULT: u32 = 6;

    /// Widest code we are willing to render.
    pub const MAX: u32 = 64;

    /// Build a padding from an integer, rejecting 0 and values above `MAX`.
    pub fn new(digits: u32) -> Result<Self> {
        if digits == 0 || digits > Self::MAX {
            return Err(TwoFactorError::InvalidPadding(digits.to_string()));
        }
        Ok(Self(digits))
    }

    pub fn digits(self) -> u32 {
        self.0
    }
}

impl Default for Padding {
    fn default() -> Self {
        Self(Self::DEFAULT)
    }
}

impl fmt::Display for Padding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Padding {
    type Err = TwoFactorError;

    fn from_str(s: &str) -> Result<Self> {
        let digits: u32 = s
            .trim()
            .parse()
            .map_err(|_| TwoFactorError::InvalidPadding(s.to_string()))?;
        Self::new(digits).map_err(|_| TwoFactorError::InvalidPadding(s.to_string()))
    }
}

impl Serialize for Padding {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_u32(self.0)
    }
}

impl<'de> Deserialize<'de> for Padding {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawPadding {
            Number(u64),
            Text(String),
        }

        match RawPadding::deserialize(deserializer)? {
            RawPadding::Number(n) => u32::try_from(n)
                .ok()
                .and_then(|n| Padding::new(n).ok())
                .ok_or_else(|| serde::de::Error::custom(format!("invalid padding {n}"))),
            RawPadding::Text(s) => s.parse().map_err(serde::de::Error::custom),
        }
    }
}
