// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `svimpass status` command implementation.
//!
//! Reports whether a master password exists, where the record lives, and the
//! key derivation parameters it was written with. Never asks for a password.

use std::io::IsTerminal;
use std::path::Path;

use serde::Serialize;
use svimpass_core::{SvimpassError, VaultState};
use svimpass_vault::store::ConfigStore;
use svimpass_vault::VaultSession;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: VaultState,
    pub initialized: bool,
    pub master_config: String,
    pub kdf: Option<String>,
    pub weak_kdf: bool,
}

impl StatusResponse {
    pub fn from_session<S: ConfigStore>(session: &VaultSession<S>, master_config: &Path) -> Self {
        let kdf = session.record_kdf();
        Self {
            state: session.state(),
            initialized: session.is_initialized(),
            master_config: master_config.display().to_string(),
            kdf: kdf.map(|params| params.to_string()),
            weak_kdf: kdf.is_some_and(|params| params.is_weak()),
        }
    }
}

/// Run the `svimpass status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub fn run_status<S: ConfigStore>(
    session: &VaultSession<S>,
    master_config: &Path,
    json: bool,
    plain: bool,
) -> Result<(), SvimpassError> {
    let status = StatusResponse::from_session(session, master_config);

    if json {
        let out = serde_json::to_string_pretty(&status)
            .map_err(|e| SvimpassError::Internal(format!("failed to serialize status: {e}")))?;
        println!("{out}");
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }

    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  svimpass status");
    println!("  {}", "-".repeat(35));

    if use_color {
        use colored::Colorize;
        if status.initialized {
            println!("    State:    {} {}", "✓".green(), "initialized".green());
        } else {
            println!("    State:    {} {}", "✗".yellow(), "not initialized".yellow());
        }
    } else if status.initialized {
        println!("    State:    [OK] initialized");
    } else {
        println!("    State:    [--] not initialized");
    }

    println!("    Record:   {}", status.master_config);
    if let Some(kdf) = &status.kdf {
        println!("    KDF:      {kdf}");
    }
    println!();

    if !status.initialized {
        println!("  Create one with: svimpass init");
        println!();
    } else if status.weak_kdf {
        println!("  Weak key derivation: run `svimpass change-password` to upgrade");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use secrecy::SecretString;
    use svimpass_vault::{KdfParams, MemoryConfigStore};

    use super::*;

    fn session() -> VaultSession<MemoryConfigStore> {
        VaultSession::open(MemoryConfigStore::new(), KdfParams::pbkdf2(1000).unwrap()).unwrap()
    }

    #[test]
    fn uninitialized_status_serializes() {
        let status = StatusResponse::from_session(&session(), Path::new("/tmp/master.conf"));
        let json = serde_json::to_string(&status).unwrap();
        assert!(json.contains("\"state\":\"uninitialized\""));
        assert!(json.contains("\"initialized\":false"));
        assert!(json.contains("\"kdf\":null"));
    }

    #[test]
    fn initialized_status_reports_locked_and_kdf() {
        let session = session();
        let pw = SecretString::from("pw".to_string());
        session.setup(&pw, &pw).unwrap();
        session.lock();

        let status = StatusResponse::from_session(&session, Path::new("/tmp/master.conf"));
        assert_eq!(status.state, VaultState::Locked);
        assert_eq!(status.kdf.as_deref(), Some("pbkdf2-sha256.1000"));
        assert!(status.weak_kdf);
    }
}
