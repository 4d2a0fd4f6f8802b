// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password verification.
//!
//! A known constant is sealed under the derived key at setup. A candidate
//! password is correct iff its key opens that envelope and yields the constant.
//! Neither the password nor a reversible hash of it is ever stored.

use svimpass_core::SvimpassError;

use crate::crypto;
use crate::kdf::DerivedKey;

/// Public plaintext sealed into every verifier. Must never change: existing
/// vaults would stop unlocking.
pub const VERIFICATION_TOKEN: &[u8] = b"PASSWORD_MANAGER_VERIFICATION_TOKEN_2024";

/// Seal the verification token under `key`.
pub fn build_verifier(key: &DerivedKey) -> Result<Vec<u8>, SvimpassError> {
    crypto::seal(key, VERIFICATION_TOKEN)
}

/// Whether `key` opens `encrypted_token` to exactly [`VERIFICATION_TOKEN`].
pub fn verify(key: &DerivedKey, encrypted_token: &[u8]) -> bool {
    // The token is public, so a plain comparison leaks nothing.
    matches!(crypto::open(key, encrypted_token), Ok(plain) if plain.as_slice() == VERIFICATION_TOKEN)
}
