// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password authentication and credential encryption for svimpass.
//!
//! A key is derived from the master password ([`kdf`]); a sealed constant
//! proves a candidate password correct ([`verifier`]); credential values are
//! sealed with AES-256-GCM under that key ([`crypto`]). [`manager`] owns the
//! persisted record, and [`session`] holds the live key between unlock and lock.

pub mod crypto;
pub mod generator;
pub mod kdf;
pub mod manager;
pub mod prompt;
pub mod session;
pub mod store;
pub mod verifier;

pub use generator::generate_password;
pub use kdf::{derive_key, DerivedKey, KdfParams, Salt};
pub use manager::{MasterPasswordManager, Rekey};
pub use prompt::{read_master_password, read_new_master_password};
pub use session::VaultSession;
pub use store::{ConfigStore, FileConfigStore, MasterPasswordConfig, MemoryConfigStore};
