// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! XDG path resolution for svimpass files.

use std::path::PathBuf;

use svimpass_core::SvimpassError;

use crate::model::SvimpassConfig;

/// Application directory name under the XDG base directories.
pub const APP_DIR: &str = "svimpass";

/// File name of the master password record.
pub const MASTER_CONFIG_FILE: &str = "master.conf";

/// Resolved locations of the files svimpass owns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    /// Directory holding svimpass configuration (`~/.config/svimpass`).
    pub config_dir: PathBuf,
    /// The master password record.
    pub master_config: PathBuf,
}

impl AppPaths {
    /// Resolve paths from the XDG environment, honoring `[paths]` overrides.
    ///
    /// `dirs::config_dir()` follows `$XDG_CONFIG_HOME` and falls back to
    /// `~/.config` on Linux.
    pub fn resolve(config: &SvimpassConfig) -> Result<Self, SvimpassError> {
        let config_dir = dirs::config_dir()
            .map(|d| d.join(APP_DIR))
            .ok_or_else(|| {
                SvimpassError::Config("cannot determine the user configuration directory".into())
            })?;
        Ok(Self::with_config_dir(config_dir, config))
    }

    /// Build paths rooted at an explicit configuration directory.
    pub fn with_config_dir(config_dir: PathBuf, config: &SvimpassConfig) -> Self {
        let master_config = config
            .paths
            .master_config
            .as_ref()
            .map(PathBuf::from)
            .unwrap_or_else(|| config_dir.join(MASTER_CONFIG_FILE));
        Self {
            config_dir,
            master_config,
        }
    }
}
