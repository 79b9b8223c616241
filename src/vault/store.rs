//! The in-memory vault and the operations commands run against it.
//!
//! `Vault` never touches the disk itself; `VaultSession` loads and
//! stores it. Every mutator checks its preconditions before changing
//! anything, so a failed command leaves the map exactly as loaded.

use std::collections::BTreeMap;

use crate::errors::{Result, TwoFactorError};

use super::record::{Padding, SecretRecord};

/// Named secret records, ordered by name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vault {
    records: BTreeMap<String, SecretRecord>,
}

impl Vault {
    /// An empty vault, used when no vault file exists yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a vault from a decoded name -> record map.
    ///
    /// Records whose stored `name` disagrees with their key are repaired
    /// so the key always wins.
    pub fn from_records(records: BTreeMap<String, SecretRecord>) -> Self {
        let records = records
            .into_iter()
            .map(|(key, mut record)| {
                if record.name != key {
                    log::warn!(
                        "record '{key}' carried name '{}', repairing to match its key",
                        record.name
                    );
                    record.name = key.clone();
                }
                (key, record)
            })
            .collect();
        Self { records }
    }

    /// Borrow the underlying map (used for serialization).
    pub fn records(&self) -> &BTreeMap<String, SecretRecord> {
        &self.records
    }

    /// Insert or overwrite a record. Last write wins.
    pub fn add(&mut self, record: SecretRecord) -> Result<()> {
        if record.name.is_empty() {
            return Err(TwoFactorError::MissingArgument("name"));
        }
        if record.secret.is_empty() {
            return Err(TwoFactorError::MissingArgument("secret"));
        }
        self.records.insert(record.name.clone(), record);
        Ok(())
    }

    /// Look up a record by name.
    pub fn get(&self, name: &str) -> Result<&SecretRecord> {
        self.records
            .get(name)
            .ok_or_else(|| TwoFactorError::UnknownName(name.to_string()))
    }

    fn get_mut(&mut self, name: &str) -> Result<&mut SecretRecord> {
        self.records
            .get_mut(name)
            .ok_or_else(|| TwoFactorError::UnknownName(name.to_string()))
    }

    /// Move a record to `new_name`, overwriting any record already there.
    pub fn rename(&mut self, name: &str, new_name: &str) -> Result<()> {
        if new_name.is_empty() {
            return Err(TwoFactorError::MissingArgument("newname"));
        }
        let mut record = self
            .records
            .remove(name)
            .ok_or_else(|| TwoFactorError::UnknownName(name.to_string()))?;

        if self.records.contains_key(new_name) {
            log::info!("rename of '{name}' replaces existing record '{new_name}'");
        }

        record.name = new_name.to_string();
        self.records.insert(new_name.to_string(), record);
        Ok(())
    }

    /// Replace a record's description.
    pub fn set_description(&mut self, name: &str, description: &str) -> Result<()> {
        self.get_mut(name)?.description = description.to_string();
        Ok(())
    }

    /// Replace a record's padding.
    pub fn set_padding(&mut self, name: &str, padding: Padding) -> Result<()> {
        self.get_mut(name)?.padding = padding;
        Ok(())
    }

    /// Returns `true` if a record with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &SecretRecord> {
        self.records.values()
    }
}
