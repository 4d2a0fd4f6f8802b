// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Subcommand implementations.

use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use svimpass_config::model::SvimpassConfig;
use svimpass_config::validation::MIN_GENERATOR_LENGTH;
use svimpass_config::AppPaths;
use svimpass_core::{CredentialCipher, SvimpassError};
use svimpass_vault::prompt::{MASTER_PASSWORD_ENV_VAR, NEW_MASTER_PASSWORD_ENV_VAR};
use svimpass_vault::store::ConfigStore;
use svimpass_vault::{
    crypto, generate_password, read_master_password, read_new_master_password, FileConfigStore, KdfParams,
    Rekey, VaultSession,
};
use tracing::{info, warn};
use zeroize::Zeroizing;

use crate::Commands;

/// Resolve the record location and open a locked session on it.
fn open_session(
    config: &SvimpassConfig,
) -> Result<(AppPaths, VaultSession<FileConfigStore>), SvimpassError> {
    let paths = AppPaths::resolve(config)?;
    let store = FileConfigStore::new(&paths.master_config);
    let session = VaultSession::open(store, KdfParams::from_config(&config.vault)?)?;
    Ok((paths, session))
}

/// Dispatch a parsed subcommand.
pub(crate) fn run(command: Commands, config: &SvimpassConfig) -> Result<(), SvimpassError> {
    match command {
        Commands::Status { json, plain } => {
            let (paths, session) = open_session(config)?;
            crate::status::run_status(&session, &paths.master_config, json, plain)
        }
        Commands::Init => {
            let (paths, session) = open_session(config)?;
            let (password, confirm) = read_new_master_password(MASTER_PASSWORD_ENV_VAR)?;
            session.setup(&password, &confirm)?;
            println!("Master password created at {}", paths.master_config.display());
            Ok(())
        }
        Commands::Unlock => {
            let (_, session) = open_session(config)?;
            session.unlock(&read_master_password()?)?;
            println!("Master password OK");
            Ok(())
        }
        Commands::ChangePassword { reseal } => {
            let (_, session) = open_session(config)?;
            let old = read_master_password()?;
            let (new, confirm) = read_new_master_password(NEW_MASTER_PASSWORD_ENV_VAR)?;
            match reseal {
                Some(path) => {
                    let count = change_password_and_reseal(&session, &old, &new, &confirm, &path)?;
                    println!("Master password changed; {count} envelope(s) re-encrypted");
                }
                None => {
                    change_password(&session, &old, &new, &confirm)?;
                    warn!("master password changed without resealing; existing envelopes will not decrypt");
                    println!("Master password changed");
                }
            }
            Ok(())
        }
        Commands::Reset { yes } => {
            if !yes {
                return Err(SvimpassError::Config(
                    "reset erases the master password record; pass --yes to confirm".into(),
                ));
            }
            let (_, session) = open_session(config)?;
            session.reset()?;
            println!("Master password record erased");
            Ok(())
        }
        Commands::Encrypt => {
            let (_, session) = open_session(config)?;
            session.unlock(&read_master_password()?)?;
            let plaintext = read_stdin_line()?;
            println!("{}", encrypt_value(&session, &plaintext)?);
            Ok(())
        }
        Commands::Decrypt { envelope } => {
            let (_, session) = open_session(config)?;
            session.unlock(&read_master_password()?)?;
            let plaintext = decrypt_value(&session, &envelope)?;
            println!("{}", plaintext.expose_secret());
            Ok(())
        }
        Commands::Generate { length } => {
            let password = generated_password(length.unwrap_or(config.generator.length))?;
            println!("{}", password.expose_secret());
            Ok(())
        }
    }
}

/// Change the master password after checking the confirmation.
fn change_password<S: ConfigStore>(
    session: &VaultSession<S>,
    old: &SecretString,
    new: &SecretString,
    confirm: &SecretString,
) -> Result<Rekey, SvimpassError> {
    if new.expose_secret() != confirm.expose_secret() {
        return Err(SvimpassError::PasswordMismatch);
    }
    session.change_master_password(old, new)
}

/// Generate a password, holding `--length` to the same floor as `generator.length`.
fn generated_password(length: usize) -> Result<SecretString, SvimpassError> {
    if length < MIN_GENERATOR_LENGTH {
        return Err(SvimpassError::Config(format!(
            "--length must be at least {MIN_GENERATOR_LENGTH}, got {length}"
        )));
    }
    generate_password(length)
}

/// Seal `plaintext` under the live key and hex-encode the envelope.
pub fn encrypt_value<S: ConfigStore>(
    session: &VaultSession<S>,
    plaintext: &str,
) -> Result<String, SvimpassError> {
    Ok(hex::encode(session.encrypt(plaintext)?))
}

/// Decode a hex envelope and open it under the live key.
pub fn decrypt_value<S: ConfigStore>(
    session: &VaultSession<S>,
    envelope_hex: &str,
) -> Result<SecretString, SvimpassError> {
    let envelope = hex::decode(envelope_hex.trim()).map_err(|_| SvimpassError::MalformedCiphertext)?;
    session.decrypt(&envelope)
}

/// Envelopes from a reseal file, opened under the current key and ready to be
/// sealed under the next one.
pub struct ResealPlan {
    path: PathBuf,
    plaintexts: Vec<Zeroizing<Vec<u8>>>,
    tmp: tempfile::NamedTempFile,
}

fn file_io_error(path: &Path) -> impl Fn(std::io::Error) -> SvimpassError + '_ {
    move |source| SvimpassError::ConfigIo {
        path: path.to_path_buf(),
        source,
    }
}

/// Open every hex envelope in `path` under the live key of an unlocked session.
///
/// Nothing is changed on failure, so a bad line aborts a password change
/// before the record is rewritten.
pub fn prepare_reseal<S: ConfigStore>(
    session: &VaultSession<S>,
    path: &Path,
) -> Result<ResealPlan, SvimpassError> {
    let io_err = file_io_error(path);
    let contents = std::fs::read_to_string(path).map_err(&io_err)?;

    let mut plaintexts = Vec::new();
    for line in contents.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let envelope = hex::decode(line).map_err(|_| SvimpassError::MalformedCiphertext)?;
        plaintexts.push(session.decrypt_bytes(&envelope)?);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let tmp = tempfile::NamedTempFile::new_in(dir).map_err(&io_err)?;

    Ok(ResealPlan {
        path: path.to_path_buf(),
        plaintexts,
        tmp,
    })
}

/// Seal the buffered plaintexts under the new key and replace the file atomically.
pub fn commit_reseal(plan: ResealPlan, rekey: &Rekey) -> Result<usize, SvimpassError> {
    let ResealPlan {
        path,
        plaintexts,
        mut tmp,
    } = plan;
    let io_err = file_io_error(&path);

    for plaintext in &plaintexts {
        let envelope = crypto::seal(rekey.new_key(), plaintext)?;
        writeln!(tmp, "{}", hex::encode(envelope)).map_err(&io_err)?;
    }
    tmp.as_file().sync_all().map_err(&io_err)?;
    tmp.persist(&path).map_err(|e| io_err(e.error))?;

    info!(count = plaintexts.len(), path = %path.display(), "envelopes resealed");
    Ok(plaintexts.len())
}

/// Change the master password and re-encrypt the envelopes in `path`.
///
/// The old password is verified and every envelope is opened first; the
/// record is only rewritten once the whole file is known to be readable.
pub fn change_password_and_reseal<S: ConfigStore>(
    session: &VaultSession<S>,
    old: &SecretString,
    new: &SecretString,
    confirm: &SecretString,
    path: &Path,
) -> Result<usize, SvimpassError> {
    if new.expose_secret() != confirm.expose_secret() {
        return Err(SvimpassError::PasswordMismatch);
    }
    session.unlock(old)?;
    let plan = prepare_reseal(session, path)?;
    let rekey = session.change_master_password(old, new)?;
    commit_reseal(plan, &rekey)
}

fn read_stdin_line() -> Result<Zeroizing<String>, SvimpassError> {
    let mut line = Zeroizing::new(String::new());
    std::io::stdin()
        .lock()
        .read_line(&mut line)
        .map_err(|e| SvimpassError::Prompt(format!("failed to read value from stdin: {e}")))?;
    let trimmed = line.trim_end_matches(['\r', '\n']).len();
    line.truncate(trimmed);
    Ok(line)
}
