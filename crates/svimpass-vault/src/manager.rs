// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The master password lifecycle: setup, verification, change, and reset.
//!
//! [`MasterPasswordManager`] owns the persisted record and is the only place a
//! live [`DerivedKey`] is produced. It holds no key itself; unlock state lives
//! in [`crate::session::VaultSession`].

use secrecy::{ExposeSecret, SecretString};
use svimpass_core::{CredentialEntry, SvimpassError};
use tracing::{debug, info, warn};

use crate::crypto;
use crate::kdf::{derive_key, DerivedKey, KdfParams};
use crate::store::{ConfigStore, MasterPasswordConfig};
use crate::verifier::{build_verifier, verify};

/// Old and new keys produced by a master password change.
///
/// Envelopes sealed before the change open only under [`Rekey::old_key`]. The
/// caller re-encrypts its stored blobs with [`Rekey::reseal`] or
/// [`Rekey::reseal_entry`]; anything not resealed before this handle is
/// dropped stays encrypted under a key that can no longer be derived.
pub struct Rekey {
    old: DerivedKey,
    new: DerivedKey,
}

impl Rekey {
    pub fn old_key(&self) -> &DerivedKey {
        &self.old
    }

    pub fn new_key(&self) -> &DerivedKey {
        &self.new
    }

    /// Move one envelope from the old key to the new key.
    pub fn reseal(&self, envelope: &[u8]) -> Result<Vec<u8>, SvimpassError> {
        crypto::reseal(&self.old, &self.new, envelope)
    }

    /// Reseal the password blob of a stored entry in place.
    pub fn reseal_entry(&self, entry: &mut CredentialEntry) -> Result<(), SvimpassError> {
        let blob = self.reseal(&entry.encrypted_password)?;
        entry.replace_password(blob);
        Ok(())
    }
}

impl std::fmt::Debug for Rekey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rekey")
            .field("old", &self.old)
            .field("new", &self.new)
            .finish()
    }
}

/// Owns the master password record and its store.
#[derive(Debug)]
pub struct MasterPasswordManager<S> {
    store: S,
    config: Option<MasterPasswordConfig>,
    kdf: KdfParams,
}

impl<S: ConfigStore> MasterPasswordManager<S> {
    /// Read the current record from `store`.
    ///
    /// `kdf` is used for keys created by setup and password change; existing
    /// records keep the parameters they were written with. A malformed record
    /// is returned as an error and left untouched.
    pub fn load(store: S, kdf: KdfParams) -> Result<Self, SvimpassError> {
        let config = store.load()?;
        debug!(initialized = config.is_some(), "master password record loaded");
        Ok(Self { store, config, kdf })
    }

    pub fn is_initialized(&self) -> bool {
        self.config.is_some()
    }

    pub fn config(&self) -> Option<&MasterPasswordConfig> {
        self.config.as_ref()
    }

    /// KDF parameters applied to newly created keys.
    pub fn kdf_params(&self) -> KdfParams {
        self.kdf
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Create the master password and return its key.
    pub fn setup(
        &mut self,
        password: &SecretString,
        confirm: &SecretString,
    ) -> Result<DerivedKey, SvimpassError> {
        if password.expose_secret() != confirm.expose_secret() {
            return Err(SvimpassError::PasswordMismatch);
        }
        if self.is_initialized() {
            return Err(SvimpassError::AlreadyInitialized);
        }

        let key = derive_key(password, None, self.kdf)?;
        let config = MasterPasswordConfig {
            salt: *key.salt(),
            encrypted_token: build_verifier(&key)?,
            kdf: self.kdf,
        };
        self.store.save(&config)?;
        self.config = Some(config);

        info!(kdf = %self.kdf, "master password initialized");
        Ok(key)
    }

    /// Check `password` against the stored verifier and return its key.
    ///
    /// Fails with [`SvimpassError::InvalidPassword`] without touching the record.
    pub fn verify(&self, password: &SecretString) -> Result<DerivedKey, SvimpassError> {
        let config = self.config.as_ref().ok_or(SvimpassError::NotInitialized)?;

        let key = derive_key(password, Some(config.salt), config.kdf)?;
        if !verify(&key, &config.encrypted_token) {
            debug!("master password verification failed");
            return Err(SvimpassError::InvalidPassword);
        }

        if config.kdf.is_weak() {
            warn!(
                kdf = %config.kdf,
                "master password record uses weak key derivation parameters; \
                 change the master password to upgrade"
            );
        }
        Ok(key)
    }

    /// Replace the master password.
    ///
    /// `old` must verify. The new key gets a fresh salt and the configured KDF
    /// parameters. Stored envelopes are not touched; see [`Rekey`].
    pub fn change_master_password(
        &mut self,
        old: &SecretString,
        new: &SecretString,
    ) -> Result<Rekey, SvimpassError> {
        let old_key = self.verify(old)?;

        let new_key = derive_key(new, None, self.kdf)?;
        let config = MasterPasswordConfig {
            salt: *new_key.salt(),
            encrypted_token: build_verifier(&new_key)?,
            kdf: self.kdf,
        };
        self.store.save(&config)?;
        self.config = Some(config);

        info!(kdf = %self.kdf, "master password changed");
        Ok(Rekey {
            old: old_key,
            new: new_key,
        })
    }

    /// Erase the record. Requires no password; gating is the caller's job.
    pub fn reset(&mut self) -> Result<(), SvimpassError> {
        self.store.erase()?;
        self.config = None;
        warn!("master password record erased");
        Ok(())
    }
}
