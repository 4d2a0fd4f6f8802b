// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the vault core and its collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Lifecycle state of the vault session.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum VaultState {
    /// No master password has ever been set up.
    Uninitialized,
    /// A master password exists but no key is held in memory.
    Locked,
    /// The live key is held in memory.
    Unlocked,
}

/// A stored credential, owned by the storage collaborator.
///
/// The vault core only ever sees `encrypted_password` as an opaque envelope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialEntry {
    /// Row identifier assigned by the store; `None` until persisted.
    #[serde(default)]
    pub id: Option<i64>,
    pub service_name: String,
    pub username: String,
    /// nonce || AES-256-GCM ciphertext || tag, hex-encoded when serialized.
    #[serde(with = "hex::serde")]
    pub encrypted_password: Vec<u8>,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CredentialEntry {
    /// Create an unsaved entry stamped with the current time.
    pub fn new(
        service_name: &str,
        username: &str,
        encrypted_password: Vec<u8>,
        notes: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: None,
            service_name: service_name.to_string(),
            username: username.to_string(),
            encrypted_password,
            notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replace the sealed password, e.g. after a re-encryption pass.
    pub fn replace_password(&mut self, encrypted_password: Vec<u8>) {
        self.encrypted_password = encrypted_password;
        self.updated_at = Utc::now();
    }
}
