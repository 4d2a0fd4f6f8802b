// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the svimpass credential vault.

use std::path::PathBuf;

use thiserror::Error;

/// The primary error type used across the vault core and its outer surfaces.
///
/// Every failure of a vault operation maps to exactly one variant, so callers
/// can react to the typed outcome instead of a generic boolean.
#[derive(Debug, Error)]
pub enum SvimpassError {
    /// Reading, writing, or removing the master password configuration failed.
    #[error("configuration I/O error at {}: {source}", path.display())]
    ConfigIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The persisted master password configuration exists but cannot be parsed.
    #[error("malformed master password configuration: {0}")]
    MalformedConfig(String),

    /// Setup was called on a vault that already has a master password.
    #[error("master password already initialized")]
    AlreadyInitialized,

    /// An operation requiring a master password ran before setup.
    #[error("master password not initialized")]
    NotInitialized,

    /// Setup password and confirmation differ.
    #[error("passwords do not match")]
    PasswordMismatch,

    /// The candidate master password did not unlock the vault.
    #[error("invalid master password")]
    InvalidPassword,

    /// An empty plaintext was handed to the cipher.
    #[error("plaintext must not be empty")]
    EmptyInput,

    /// A ciphertext envelope is too short to contain a nonce.
    #[error("ciphertext too short to contain a nonce")]
    MalformedCiphertext,

    /// The AEAD tag did not verify: wrong key, corrupted data, or tampering.
    #[error("ciphertext failed authentication")]
    AuthenticationFailure,

    /// Encrypt or decrypt was requested while no key is unlocked.
    #[error("vault is locked")]
    Locked,

    /// The operating system random source could not produce bytes.
    #[error("system random source unavailable")]
    RandomSource,

    /// Key derivation parameters were rejected or derivation failed.
    #[error("key derivation error: {0}")]
    Kdf(String),

    /// Application configuration errors (invalid TOML, failed validation).
    #[error("configuration error: {0}")]
    Config(String),

    /// Passphrase acquisition failed (no TTY, unreadable input).
    #[error("passphrase prompt error: {0}")]
    Prompt(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SvimpassError {
    /// Whether the process cannot safely continue after this error.
    ///
    /// Fatal errors are surfaced to the embedding context so it can log and
    /// exit cleanly; the core never retries or repairs them.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::ConfigIo { .. } | Self::MalformedConfig(_) | Self::RandomSource
        )
    }
}
