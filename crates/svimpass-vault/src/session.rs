// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Unlock state and the live key.
//!
//! Lifecycle operations serialize on the manager mutex; the key slot is an
//! `RwLock` so encrypt and decrypt can run concurrently. Lock order is always
//! manager, then key slot.

use std::sync::{Mutex, MutexGuard, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use secrecy::SecretString;
use svimpass_core::{CredentialCipher, SvimpassError, VaultState};
use tracing::info;
use zeroize::{Zeroize, Zeroizing};

use crate::crypto;
use crate::kdf::{DerivedKey, KdfParams};
use crate::manager::{MasterPasswordManager, Rekey};
use crate::store::ConfigStore;

/// An open vault: the master password manager plus at most one live key.
pub struct VaultSession<S> {
    manager: Mutex<MasterPasswordManager<S>>,
    key: RwLock<Option<DerivedKey>>,
}

impl<S> std::fmt::Debug for VaultSession<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let unlocked = self
            .key
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        f.debug_struct("VaultSession")
            .field("unlocked", &unlocked)
            .finish_non_exhaustive()
    }
}

impl<S: ConfigStore> VaultSession<S> {
    /// Wrap a loaded manager. The session starts locked.
    pub fn new(manager: MasterPasswordManager<S>) -> Self {
        Self {
            manager: Mutex::new(manager),
            key: RwLock::new(None),
        }
    }

    /// Load the record from `store` and open a locked session on it.
    pub fn open(store: S, kdf: KdfParams) -> Result<Self, SvimpassError> {
        Ok(Self::new(MasterPasswordManager::load(store, kdf)?))
    }

    fn manager(&self) -> MutexGuard<'_, MasterPasswordManager<S>> {
        self.manager.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot(&self) -> RwLockReadGuard<'_, Option<DerivedKey>> {
        self.key.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn slot_mut(&self) -> RwLockWriteGuard<'_, Option<DerivedKey>> {
        self.key.write().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn state(&self) -> VaultState {
        let manager = self.manager();
        if !manager.is_initialized() {
            VaultState::Uninitialized
        } else if self.slot().is_some() {
            VaultState::Unlocked
        } else {
            VaultState::Locked
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.manager().is_initialized()
    }

    pub fn is_unlocked(&self) -> bool {
        self.slot().is_some()
    }

    /// Create the master password and unlock with it.
    pub fn setup(&self, password: &SecretString, confirm: &SecretString) -> Result<(), SvimpassError> {
        let mut manager = self.manager();
        let key = manager.setup(password, confirm)?;
        *self.slot_mut() = Some(key);
        info!("vault initialized and unlocked");
        Ok(())
    }

    /// Unlock with `password`. On failure the current state is kept.
    pub fn unlock(&self, password: &SecretString) -> Result<(), SvimpassError> {
        let manager = self.manager();
        let key = manager.verify(password)?;
        *self.slot_mut() = Some(key);
        info!("vault unlocked");
        Ok(())
    }

    /// Drop the live key. Idempotent.
    pub fn lock(&self) {
        let _manager = self.manager();
        if self.slot_mut().take().is_some() {
            info!("vault locked");
        }
    }

    /// Change the master password and switch the session to the new key.
    ///
    /// The returned [`Rekey`] must be used to reseal stored envelopes; they
    /// no longer open under the session key.
    pub fn change_master_password(
        &self,
        old: &SecretString,
        new: &SecretString,
    ) -> Result<Rekey, SvimpassError> {
        let mut manager = self.manager();
        let rekey = manager.change_master_password(old, new)?;
        *self.slot_mut() = Some(rekey.new_key().clone());
        Ok(rekey)
    }

    /// Erase the master password record and drop the live key.
    pub fn reset(&self) -> Result<(), SvimpassError> {
        let mut manager = self.manager();
        manager.reset()?;
        self.slot_mut().take();
        Ok(())
    }

    /// KDF parameters of the stored record, if initialized.
    pub fn record_kdf(&self) -> Option<KdfParams> {
        self.manager().config().map(|config| config.kdf)
    }

    /// Seal raw bytes under the live key.
    pub fn encrypt_bytes(&self, plaintext: &[u8]) -> Result<Vec<u8>, SvimpassError> {
        let slot = self.slot();
        let key = slot.as_ref().ok_or(SvimpassError::Locked)?;
        crypto::seal(key, plaintext)
    }

    /// Open an envelope under the live key.
    pub fn decrypt_bytes(&self, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>, SvimpassError> {
        let slot = self.slot();
        let key = slot.as_ref().ok_or(SvimpassError::Locked)?;
        crypto::open(key, envelope)
    }
}

impl<S: ConfigStore> CredentialCipher for VaultSession<S> {
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, SvimpassError> {
        self.encrypt_bytes(plaintext.as_bytes())
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<SecretString, SvimpassError> {
        let mut plain = self.decrypt_bytes(ciphertext)?;
        match String::from_utf8(std::mem::take(&mut *plain)) {
            Ok(text) => Ok(SecretString::from(text)),
            Err(e) => {
                e.into_bytes().zeroize();
                Err(SvimpassError::Internal(
                    "decrypted credential is not valid UTF-8".to_string(),
                ))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use secrecy::ExposeSecret;
    use tracing_test::traced_test;

    use super::*;
    use crate::store::MemoryConfigStore;

    fn pw(s: &str) -> SecretString {
        SecretString::from(s.to_string())
    }

    fn session() -> VaultSession<MemoryConfigStore> {
        VaultSession::open(MemoryConfigStore::new(), KdfParams::pbkdf2(1000).unwrap()).unwrap()
    }

    #[test]
    fn states_follow_lifecycle() {
        let s = session();
        assert_eq!(s.state(), VaultState::Uninitialized);

        s.setup(&pw("pw"), &pw("pw")).unwrap();
        assert_eq!(s.state(), VaultState::Unlocked);

        s.lock();
        assert_eq!(s.state(), VaultState::Locked);
        s.lock();
        assert_eq!(s.state(), VaultState::Locked);

        s.unlock(&pw("pw")).unwrap();
        assert_eq!(s.state(), VaultState::Unlocked);

        s.reset().unwrap();
        assert_eq!(s.state(), VaultState::Uninitialized);
        assert!(!s.is_unlocked());
    }

    #[test]
    fn locked_session_refuses_crypto() {
        let s = session();
        assert!(matches!(s.encrypt("x"), Err(SvimpassError::Locked)));
        assert!(matches!(s.decrypt(&[0u8; 40]), Err(SvimpassError::Locked)));

        s.setup(&pw("pw"), &pw("pw")).unwrap();
        let blob = s.encrypt("x").unwrap();
        s.lock();
        assert!(matches!(s.decrypt(&blob), Err(SvimpassError::Locked)));
    }

    #[test]
    fn failed_unlock_keeps_current_state() {
        let s = session();
        s.setup(&pw("pw"), &pw("pw")).unwrap();
        let blob = s.encrypt("kept").unwrap();

        assert!(matches!(
            s.unlock(&pw("wrong")),
            Err(SvimpassError::InvalidPassword)
        ));
        assert_eq!(s.state(), VaultState::Unlocked);
        assert_eq!(s.decrypt(&blob).unwrap().expose_secret(), "kept");

        s.lock();
        assert!(s.unlock(&pw("wrong")).is_err());
        assert_eq!(s.state(), VaultState::Locked);
    }

    #[test]
    fn change_password_installs_new_key() {
        let s = session();
        s.setup(&pw("old"), &pw("old")).unwrap();
        let blob = s.encrypt("s3cr3t").unwrap();

        let rekey = s.change_master_password(&pw("old"), &pw("new")).unwrap();
        assert!(matches!(
            s.decrypt(&blob),
            Err(SvimpassError::AuthenticationFailure)
        ));

        let resealed = rekey.reseal(&blob).unwrap();
        assert_eq!(s.decrypt(&resealed).unwrap().expose_secret(), "s3cr3t");
    }

    #[test]
    fn non_utf8_plaintext_is_an_error() {
        let s = session();
        s.setup(&pw("pw"), &pw("pw")).unwrap();
        let blob = s.encrypt_bytes(&[0xff, 0xfe, 0xfd]).unwrap();
        assert!(matches!(s.decrypt(&blob), Err(SvimpassError::Internal(_))));
        assert_eq!(s.decrypt_bytes(&blob).unwrap().as_slice(), &[0xff, 0xfe, 0xfd]);
    }

    #[test]
    fn concurrent_encrypt_while_unlocked() {
        let s = Arc::new(session());
        s.setup(&pw("pw"), &pw("pw")).unwrap();

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let s = Arc::clone(&s);
                std::thread::spawn(move || {
                    let value = format!("secret-{i}");
                    let blob = s.encrypt(&value).unwrap();
                    assert_eq!(s.decrypt(&blob).unwrap().expose_secret(), value);
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
    }

    #[test]
    fn debug_does_not_expose_key() {
        let s = session();
        s.setup(&pw("pw"), &pw("pw")).unwrap();
        let debug = format!("{s:?}");
        assert!(debug.contains("unlocked: true"));
        assert!(!debug.contains("key"));
    }

    #[test]
    #[traced_test]
    fn lifecycle_logs_never_contain_secrets() {
        let s = session();
        s.setup(&pw("correct-horse"), &pw("correct-horse")).unwrap();
        let blob = s.encrypt("s3cr3t").unwrap();
        s.lock();
        let _ = s.unlock(&pw("battery-staple"));
        s.unlock(&pw("correct-horse")).unwrap();
        s.decrypt(&blob).unwrap();
        s.change_master_password(&pw("correct-horse"), &pw("tr0ub4dor"))
            .unwrap();

        assert!(logs_contain("vault unlocked"));
        assert!(!logs_contain("correct-horse"));
        assert!(!logs_contain("battery-staple"));
        assert!(!logs_contain("tr0ub4dor"));
        assert!(!logs_contain("s3cr3t"));
    }
}
