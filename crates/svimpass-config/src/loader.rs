// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./svimpass.toml` > `~/.config/svimpass/svimpass.toml` >
//! `/etc/svimpass/svimpass.toml` with environment variable overrides via the
//! `SVIMPASS_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::SvimpassConfig;

/// System-wide configuration file.
pub const SYSTEM_CONFIG_FILE: &str = "/etc/svimpass/svimpass.toml";

/// Configuration file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "svimpass.toml";

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "SVIMPASS_";

/// `SVIMPASS_*` variables that are not configuration keys.
///
/// `SVIMPASS_MASTER_PASSWORD` feeds the passphrase prompt and must never be
/// merged into the config (it would also trip `deny_unknown_fields`).
const IGNORED_ENV_KEYS: &[&str] = &["master_password", "new_master_password", "config"];

/// `~/.config/svimpass/svimpass.toml`, if a config directory can be resolved.
pub fn user_config_file() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("svimpass").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/svimpass/svimpass.toml` (system-wide)
/// 3. `~/.config/svimpass/svimpass.toml` (user XDG config)
/// 4. `./svimpass.toml` (local directory)
/// 5. `SVIMPASS_*` environment variables
pub fn load_config() -> Result<SvimpassConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<SvimpassConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SvimpassConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<SvimpassConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(SvimpassConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used for hierarchy loading (exposed for diagnostic use).
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(SvimpassConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_FILE))
        .merge(Toml::file(user_config_file().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Environment provider mapping `SVIMPASS_SECTION_KEY` to `section.key`.
///
/// Uses `Env::map()` rather than `Env::split("_")` because key names contain
/// underscores: `SVIMPASS_VAULT_PBKDF2_ITERATIONS` must become
/// `vault.pbkdf2_iterations`, not `vault.pbkdf2.iterations`. Figment passes
/// the key with its original case, so it is lowercased before mapping.
fn env_provider() -> Env {
    Env::prefixed(ENV_PREFIX).ignore(IGNORED_ENV_KEYS).map(|key| {
        let mapped = key
            .as_str()
            .to_ascii_lowercase()
            .replacen("vault_", "vault.", 1)
            .replacen("paths_", "paths.", 1)
            .replacen("log_", "log.", 1)
            .replacen("generator_", "generator.", 1);
        mapped.into()
    })
}
