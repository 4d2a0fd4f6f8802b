// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via environment variable or TTY prompt.

use secrecy::{ExposeSecret, SecretString};
use svimpass_core::SvimpassError;

/// Environment variable holding the current master password.
pub const MASTER_PASSWORD_ENV_VAR: &str = "SVIMPASS_MASTER_PASSWORD";

/// Environment variable holding the replacement password for `change-password`.
pub const NEW_MASTER_PASSWORD_ENV_VAR: &str = "SVIMPASS_NEW_MASTER_PASSWORD";

fn from_env(var: &str) -> Option<SecretString> {
    match std::env::var(var) {
        Ok(value) if !value.is_empty() => Some(SecretString::from(value)),
        _ => None,
    }
}

fn read_tty(label: &str) -> Result<SecretString, SvimpassError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map(SecretString::from)
        .map_err(|e| SvimpassError::Prompt(format!("failed to read password: {e}")))
}

fn not_interactive(var: &str) -> SvimpassError {
    SvimpassError::Prompt(format!(
        "no master password provided; set {var} or run interactively"
    ))
}

fn stdin_is_tty() -> bool {
    std::io::IsTerminal::is_terminal(&std::io::stdin())
}

/// Get the current master password.
///
/// Priority: `SVIMPASS_MASTER_PASSWORD`, then an interactive prompt.
pub fn read_master_password() -> Result<SecretString, SvimpassError> {
    if let Some(password) = from_env(MASTER_PASSWORD_ENV_VAR) {
        return Ok(password);
    }
    if stdin_is_tty() {
        let password = read_tty("Master password")?;
        if password.expose_secret().is_empty() {
            return Err(SvimpassError::Prompt("empty master password not allowed".into()));
        }
        return Ok(password);
    }
    Err(not_interactive(MASTER_PASSWORD_ENV_VAR))
}

/// Get a new master password and its confirmation.
///
/// A password taken from `env_var` is its own confirmation. On a TTY the user
/// types it twice; comparing the pair is left to
/// [`crate::manager::MasterPasswordManager::setup`] so a mismatch surfaces as
/// [`SvimpassError::PasswordMismatch`].
pub fn read_new_master_password(
    env_var: &str,
) -> Result<(SecretString, SecretString), SvimpassError> {
    if let Some(password) = from_env(env_var) {
        let confirm = password.clone();
        return Ok((password, confirm));
    }
    if stdin_is_tty() {
        let password = read_tty("New master password")?;
        if password.expose_secret().is_empty() {
            return Err(SvimpassError::Prompt("empty master password not allowed".into()));
        }
        let confirm = read_tty("Confirm master password")?;
        return Ok((password, confirm));
    }
    Err(not_interactive(env_var))
}
