// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the svimpass credential vault.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use serde::{Deserialize, Serialize};

/// Top-level svimpass configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SvimpassConfig {
    /// Key derivation settings for new master passwords.
    #[serde(default)]
    pub vault: VaultConfig,

    /// File location overrides.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Logging settings.
    #[serde(default)]
    pub log: LogConfig,

    /// Password generator settings.
    #[serde(default)]
    pub generator: GeneratorConfig,
}

/// Password-based key derivation function used for new master passwords.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
pub enum KdfAlgorithm {
    /// PBKDF2-HMAC-SHA256.
    #[default]
    #[serde(rename = "pbkdf2-sha256")]
    Pbkdf2Sha256,
    /// Argon2id (memory-hard).
    #[serde(rename = "argon2id")]
    Argon2id,
}

impl std::fmt::Display for KdfAlgorithm {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pbkdf2Sha256 => f.write_str("pbkdf2-sha256"),
            Self::Argon2id => f.write_str("argon2id"),
        }
    }
}

/// Credential vault key-derivation configuration.
///
/// These parameters only apply when a salt and verifier are (re)built, i.e.
/// at setup and on master password change. The parameters in effect for an
/// existing vault are persisted next to its salt.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VaultConfig {
    /// KDF algorithm (default: pbkdf2-sha256).
    #[serde(default)]
    pub kdf: KdfAlgorithm,

    /// PBKDF2-HMAC-SHA256 iteration count (default: 600000).
    #[serde(default = "default_pbkdf2_iterations")]
    pub pbkdf2_iterations: u32,

    /// Argon2id memory cost in KiB (default: 65536 = 64 MiB).
    #[serde(default = "default_argon2_memory_cost")]
    pub argon2_memory_cost: u32,

    /// Argon2id iteration count (default: 3).
    #[serde(default = "default_argon2_iterations")]
    pub argon2_iterations: u32,

    /// Argon2id parallelism lanes (default: 4).
    #[serde(default = "default_argon2_parallelism")]
    pub argon2_parallelism: u32,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf: KdfAlgorithm::default(),
            pbkdf2_iterations: default_pbkdf2_iterations(),
            argon2_memory_cost: default_argon2_memory_cost(),
            argon2_iterations: default_argon2_iterations(),
            argon2_parallelism: default_argon2_parallelism(),
        }
    }
}

fn default_pbkdf2_iterations() -> u32 {
    600_000 // OWASP 2023 recommendation for PBKDF2-HMAC-SHA256
}

fn default_argon2_memory_cost() -> u32 {
    65536
}

fn default_argon2_iterations() -> u32 {
    3
}

fn default_argon2_parallelism() -> u32 {
    4
}

/// File location overrides.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Path of the master password record.
    /// Defaults to `$XDG_CONFIG_HOME/svimpass/master.conf`.
    #[serde(default)]
    pub master_config: Option<String>,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LogConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Password generator configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Generated password length (default: 20).
    #[serde(default = "default_generator_length")]
    pub length: usize,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            length: default_generator_length(),
        }
    }
}

fn default_generator_length() -> usize {
    20
}
