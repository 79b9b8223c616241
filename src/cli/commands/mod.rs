//! One module per subcommand.
//!
//! Vault commands take the invocation's `VaultSession`, validate their
//! arguments first, then load, act and (when mutating) store.

pub mod add;
pub mod completions;
pub mod get;
pub mod list;
pub mod rename;
pub mod set_description;
pub mod set_padding;
