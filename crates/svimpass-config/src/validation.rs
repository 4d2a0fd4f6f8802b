// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde attributes,
//! such as KDF cost floors and known log levels.

use crate::diagnostic::ConfigError;
use crate::model::{KdfAlgorithm, SvimpassConfig};

/// Lowest PBKDF2 iteration count accepted for new master passwords.
pub const MIN_PBKDF2_ITERATIONS: u32 = 100_000;

/// Lowest Argon2id memory cost (KiB) accepted for new master passwords.
pub const MIN_ARGON2_MEMORY_COST: u32 = 32768;

/// Shortest password the generator may be asked for.
pub const MIN_GENERATOR_LENGTH: usize = 8;

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &SvimpassConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    // Only the selected algorithm's parameters matter.
    match config.vault.kdf {
        KdfAlgorithm::Pbkdf2Sha256 => {
            if config.vault.pbkdf2_iterations < MIN_PBKDF2_ITERATIONS {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "vault.pbkdf2_iterations must be at least {MIN_PBKDF2_ITERATIONS}, got {}",
                        config.vault.pbkdf2_iterations
                    ),
                });
            }
        }
        KdfAlgorithm::Argon2id => {
            if config.vault.argon2_memory_cost < MIN_ARGON2_MEMORY_COST {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "vault.argon2_memory_cost must be at least {MIN_ARGON2_MEMORY_COST} (32 MiB), got {}",
                        config.vault.argon2_memory_cost
                    ),
                });
            }
            if config.vault.argon2_iterations < 2 {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "vault.argon2_iterations must be at least 2, got {}",
                        config.vault.argon2_iterations
                    ),
                });
            }
            if config.vault.argon2_parallelism < 1 {
                errors.push(ConfigError::Validation {
                    message: format!(
                        "vault.argon2_parallelism must be at least 1, got {}",
                        config.vault.argon2_parallelism
                    ),
                });
            }
        }
    }

    if let Some(path) = &config.paths.master_config
        && path.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "paths.master_config must not be empty when set".to_string(),
        });
    }

    if !LOG_LEVELS.contains(&config.log.level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "log.level `{}` is not one of: {}",
                config.log.level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.generator.length < MIN_GENERATOR_LENGTH {
        errors.push(ConfigError::Validation {
            message: format!(
                "generator.length must be at least {MIN_GENERATOR_LENGTH}, got {}",
                config.generator.length
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
