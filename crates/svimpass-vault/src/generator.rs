// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation.

use rand::rngs::OsRng;
use rand::RngCore;
use secrecy::SecretString;
use svimpass_core::SvimpassError;
use zeroize::Zeroizing;

/// Letters, digits and symbols, without the look-alikes `l`, `o`, `I`, `O`, `0`, `1`.
pub const CHARSET: &[u8; 64] = b"abcdefghijkmnpqrstuvwxyzABCDEFGHJKLMNPQRSTUVWXYZ23456789!@#$%^&*";

/// Default generated password length.
pub const DEFAULT_LENGTH: usize = 20;

/// Generate a password of `length` characters drawn uniformly from [`CHARSET`].
pub fn generate_password(length: usize) -> Result<SecretString, SvimpassError> {
    let mut bytes = Zeroizing::new(vec![0u8; length]);
    OsRng
        .try_fill_bytes(&mut bytes)
        .map_err(|_| SvimpassError::RandomSource)?;

    // CHARSET has exactly 64 entries, so masking keeps the distribution uniform.
    let password: String = bytes
        .iter()
        .map(|b| CHARSET[usize::from(b & 0x3f)] as char)
        .collect();
    Ok(SecretString::from(password))
}
