//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use crate::codec::GpgCodec;
use crate::config::{expand_home, Settings};
use crate::errors::Result;
use crate::vault::VaultSession;

/// twofactor CLI: TOTP codes from a GPG-encrypted vault.
#[derive(Parser)]
#[command(
    name = "twofactor",
    about = "Time-based one-time passwords from a GPG-encrypted vault",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// GPG vault of secrets (default: ~/.twofactor.gpg)
    #[arg(short, long, env = "TWOFACTOR_VAULT", global = true)]
    pub vault: Option<String>,

    /// Disable using a GPG agent (prompt for the passphrase instead)
    #[arg(long, global = true)]
    pub disable_agent: bool,

    /// Which key fingerprint to encrypt the vault to
    #[arg(long, env = "TWOFACTOR_FINGERPRINT", global = true)]
    pub fingerprint: Option<String>,

    /// Config file (default: <config dir>/twofactor/config.toml)
    #[arg(long, env = "TWOFACTOR_CONFIG", global = true)]
    pub config: Option<String>,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Print the current code for a site
    Get {
        /// Site name
        name: String,
    },

    /// Add a site (overwrites an existing one with the same name)
    Add {
        /// Site name
        name: String,
        /// Base32 TOTP seed
        secret: String,
        /// Free-text description
        description: Option<String>,
        /// Number of digits in the code, 1 to 64 (default: 6)
        padding: Option<String>,
    },

    /// List all sites
    List,

    /// Rename a site
    Rename {
        /// Current site name
        name: String,
        /// New site name
        newname: String,
    },

    /// Change a site's description
    SetDescription {
        /// Site name
        name: String,
        /// New description
        description: String,
    },

    /// Change the number of digits a site's code is padded to
    SetPadding {
        /// Site name
        name: String,
        /// Number of digits (1 to 64)
        padding: String,
    },

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Load settings from `--config` or the default location.
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let path = cli.config.as_deref().map(expand_home).transpose()?;
    Settings::load(path.as_deref())
}

/// Resolve the vault path: `--vault` wins over the config file.
pub fn vault_path(cli: &Cli, settings: &Settings) -> Result<PathBuf> {
    match &cli.vault {
        Some(path) => expand_home(path),
        None => settings.vault_path(),
    }
}

/// Build the GPG codec from flags and settings.
pub fn build_codec(cli: &Cli, settings: &Settings) -> Result<GpgCodec> {
    Ok(GpgCodec::new(&settings.gpg_program)
        .with_home(settings.gpg_home()?)
        .with_agent(settings.use_agent && !cli.disable_agent))
}

/// Build this invocation's vault session.
pub fn open_session(cli: &Cli, settings: &Settings) -> Result<VaultSession<GpgCodec>> {
    let path = vault_path(cli, settings)?;
    let codec = build_codec(cli, settings)?;
    let recipient = cli.fingerprint.clone().or_else(|| settings.fingerprint.clone());
    log::debug!("vault path: {}", path.display());
    Ok(VaultSession::new(path, codec, recipient))
}
