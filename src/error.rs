//! Typed errors for profile management and settings persistence.
//!
//! Pattern parsing has its own [`ParseError`](crate::ParseError), which callers usually discard
//! since patterns come from free-text input.

use thiserror::Error;

/// Errors from vault profile operations.
#[derive(Debug, Clone, Eq, Error, PartialEq)]
pub enum ProfileError {
    /// The settings contain no profile at all. This is an invariant violation: settings are
    /// expected to have gone through [`ensure_vault_profiles`](crate::ensure_vault_profiles).
    #[error("no vault profiles configured")]
    NoProfiles,

    #[error("unknown vault profile '{0}'")]
    UnknownProfile(String),

    #[error("vault profile name must not be empty")]
    EmptyName,

    #[error("a vault profile named '{0}' already exists")]
    DuplicateName(String),

    #[error("the default vault profile cannot be deleted")]
    CannotDeleteDefault,

    #[error("the last vault profile cannot be deleted")]
    CannotDeleteLast,
}

/// Errors that can occur when loading or saving settings.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An I/O error occurred reading or writing the settings file.
    #[error("I/O error accessing settings: {0}")]
    Io(#[from] std::io::Error),

    /// The settings file contained invalid JSON.
    #[error("JSON error in settings: {0}")]
    Json(#[from] serde_json::Error),
}
