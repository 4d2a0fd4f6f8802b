// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Encrypt/decrypt access to the live vault key.

use secrecy::{ExposeSecret, SecretString};

use crate::error::SvimpassError;
use crate::types::CredentialEntry;

/// The two operations the vault exposes on its live key.
///
/// Both fail with [`SvimpassError::Locked`] when no key is unlocked. Cipher
/// failures are always returned; implementors never swallow them.
pub trait CredentialCipher {
    /// Seal a credential value under the live key.
    fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, SvimpassError>;

    /// Open a blob produced by [`CredentialCipher::encrypt`].
    fn decrypt(&self, ciphertext: &[u8]) -> Result<SecretString, SvimpassError>;

    /// Build a new entry whose password is sealed under the live key.
    fn seal_entry(
        &self,
        service_name: &str,
        username: &str,
        password: &SecretString,
        notes: Option<String>,
    ) -> Result<CredentialEntry, SvimpassError> {
        let blob = self.encrypt(password.expose_secret())?;
        Ok(CredentialEntry::new(service_name, username, blob, notes))
    }

    /// Decrypt the password of a stored entry.
    fn reveal_password(&self, entry: &CredentialEntry) -> Result<SecretString, SvimpassError> {
        self.decrypt(&entry.encrypted_password)
    }
}
