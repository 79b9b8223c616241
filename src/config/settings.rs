use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::errors::{Result, TwoFactorError};

/// User-level configuration, loaded from `<config_dir>/twofactor/config.toml`.
///
/// Every field has a sensible default so twofactor works out-of-the-box
/// without any config file at all. Command-line flags override these.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    /// Vault file location. A leading `~` expands to the home directory.
    #[serde(default = "default_vault")]
    pub vault: String,

    /// Fingerprint to encrypt the vault to when several keys are available.
    #[serde(default)]
    pub fingerprint: Option<String>,

    /// Let gpg-agent handle passphrases (default: true).
    #[serde(default = "default_use_agent")]
    pub use_agent: bool,

    /// GnuPG executable to run.
    #[serde(default = "default_gpg_program")]
    pub gpg_program: String,

    /// GnuPG home directory, if not gpg's own default.
    #[serde(default)]
    pub gpg_home: Option<String>,
}

// ── Serde default helpers ────────────────────────────────────────────

fn default_vault() -> String {
    "~/.twofactor.gpg".to_string()
}

fn default_use_agent() -> bool {
    true
}

fn default_gpg_program() -> String {
    "gpg".to_string()
}

// ── Implementation ───────────────────────────────────────────────────

impl Default for Settings {
    fn default() -> Self {
        Self {
            vault: default_vault(),
            fingerprint: None,
            use_agent: default_use_agent(),
            gpg_program: default_gpg_program(),
            gpg_home: None,
        }
    }
}

impl Settings {
    /// Directory under the platform config dir that holds our file.
    const DIR_NAME: &'static str = "twofactor";

    /// Name of the config file inside `DIR_NAME`.
    const FILE_NAME: &'static str = "config.toml";

    /// The default config file location, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::DIR_NAME).join(Self::FILE_NAME))
    }

    /// Load settings from `path`, or from `default_path()` when `None`.
    ///
    /// If the file does not exist, sensible defaults are returned.
    /// If the file exists but cannot be parsed, an error is returned.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(p) => p.to_path_buf(),
            None => match Self::default_path() {
                Some(p) => p,
                None => return Ok(Self::default()),
            },
        };

        if !config_path.exists() {
            log::debug!("no config at {}, using defaults", config_path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(&config_path)?;

        let settings: Settings = toml::from_str(&contents).map_err(|e| {
            TwoFactorError::Config(format!("Failed to parse {}: {e}", config_path.display()))
        })?;

        log::debug!("loaded config from {}", config_path.display());
        Ok(settings)
    }

    /// The configured vault path with `~` expanded.
    pub fn vault_path(&self) -> Result<PathBuf> {
        expand_home(&self.vault)
    }

    /// The configured GnuPG home with `~` expanded.
    pub fn gpg_home(&self) -> Result<Option<PathBuf>> {
        self.gpg_home.as_deref().map(expand_home).transpose()
    }
}

/// Expand a leading `~` or `~/` to the user's home directory.
pub fn expand_home(path: &str) -> Result<PathBuf> {
    let rest = match path.strip_prefix('~') {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest.trim_start_matches('/'),
        _ => return Ok(PathBuf::from(path)),
    };

    let home = dirs::home_dir().ok_or_else(|| {
        TwoFactorError::Config(format!("cannot expand '{path}': no home directory"))
    })?;

    Ok(if rest.is_empty() { home } else { home.join(rest) })
}

// ── Tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn default_settings_are_sensible() {
        let s = Settings::default();
        assert_eq!(s.vault, "~/.twofactor.gpg");
        assert_eq!(s.fingerprint, None);
        assert!(s.use_agent);
        assert_eq!(s.gpg_program, "gpg");
        assert_eq!(s.gpg_home, None);
    }

    #[test]
    fn load_returns_defaults_when_no_config_file() {
        let tmp = TempDir::new().unwrap();
        let settings = Settings::load(Some(&tmp.path().join("config.toml"))).unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn load_parses_toml_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        let config = r#"
vault = "/srv/otp/vault.gpg"
fingerprint = "AAAA1111AAAA1111AAAA1111AAAA1111AAAA1111"
use_agent = false
gpg_program = "gpg2"
gpg_home = "/srv/otp/gnupg"
"#;
        fs::write(&path, config).unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert_eq!(settings.vault, "/srv/otp/vault.gpg");
        assert_eq!(
            settings.fingerprint.as_deref(),
            Some("AAAA1111AAAA1111AAAA1111AAAA1111AAAA1111")
        );
        assert!(!settings.use_agent);
        assert_eq!(settings.gpg_program, "gpg2");
        assert_eq!(
            settings.gpg_home().unwrap(),
            Some(PathBuf::from("/srv/otp/gnupg"))
        );
    }

    #[test]
    fn load_uses_defaults_for_missing_fields() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "use_agent = false\n").unwrap();

        let settings = Settings::load(Some(&path)).unwrap();
        assert!(!settings.use_agent);
        // Rest should be defaults
        assert_eq!(settings.vault, "~/.twofactor.gpg");
        assert_eq!(settings.gpg_program, "gpg");
    }

    #[test]
    fn load_errors_on_invalid_toml() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.toml");
        fs::write(&path, "not valid {{toml").unwrap();

        let result = Settings::load(Some(&path));
        assert!(matches!(result, Err(TwoFactorError::Config(_))));
    }

    #[test]
    fn expand_home_leaves_plain_paths_alone() {
        assert_eq!(
            expand_home("/tmp/vault.gpg").unwrap(),
            PathBuf::from("/tmp/vault.gpg")
        );
        assert_eq!(
            expand_home("relative/vault.gpg").unwrap(),
            PathBuf::from("relative/vault.gpg")
        );
        assert_eq!(expand_home("~user/x").unwrap(), PathBuf::from("~user/x"));
    }

    #[test]
    fn expand_home_expands_tilde() {
        if let Some(home) = dirs::home_dir() {
            assert_eq!(expand_home("~").unwrap(), home);
            assert_eq!(
                expand_home("~/.twofactor.gpg").unwrap(),
                home.join(".twofactor.gpg")
            );
        }
    }
}
