// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! AES-256-GCM seal/open over self-describing envelopes.
//!
//! Envelope layout: `nonce (12 bytes) || ciphertext || tag (16 bytes)`.
//! Every call to [`seal`] draws a fresh random 96-bit nonce from the system
//! CSPRNG; nonces are never derived from counters. No associated data is bound.

use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};
use svimpass_core::SvimpassError;
use zeroize::{Zeroize, Zeroizing};

use crate::kdf::DerivedKey;

/// Nonce prefix length of an envelope.
pub const NONCE_LEN: usize = ring::aead::NONCE_LEN;

/// GCM authentication tag length.
pub const TAG_LEN: usize = 16;

fn aead_key(key: &DerivedKey) -> Result<LessSafeKey, SvimpassError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key.as_bytes())
        .map_err(|_| SvimpassError::Internal("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt `plaintext` under `key` into a new envelope.
///
/// Fails with [`SvimpassError::EmptyInput`] for an empty plaintext: an empty
/// secret is never a valid credential value.
pub fn seal(key: &DerivedKey, plaintext: &[u8]) -> Result<Vec<u8>, SvimpassError> {
    if plaintext.is_empty() {
        return Err(SvimpassError::EmptyInput);
    }

    let aead = aead_key(key)?;

    let mut nonce_bytes = [0u8; NONCE_LEN];
    SystemRandom::new()
        .fill(&mut nonce_bytes)
        .map_err(|_| SvimpassError::RandomSource)?;

    let mut envelope = Vec::with_capacity(NONCE_LEN + plaintext.len() + TAG_LEN);
    envelope.extend_from_slice(&nonce_bytes);
    envelope.extend_from_slice(plaintext);

    // Encrypts envelope[NONCE_LEN..] in place.
    let sealed = aead.seal_in_place_separate_tag(
        Nonce::assume_unique_for_key(nonce_bytes),
        Aad::empty(),
        &mut envelope[NONCE_LEN..],
    );
    match sealed {
        Ok(tag) => {
            envelope.extend_from_slice(tag.as_ref());
            Ok(envelope)
        }
        Err(_) => {
            // The buffer may still hold plaintext.
            envelope.zeroize();
            Err(SvimpassError::Internal("AES-256-GCM encryption failed".to_string()))
        }
    }
}

/// Decrypt an envelope produced by [`seal`].
///
/// An envelope shorter than the nonce is rejected with
/// [`SvimpassError::MalformedCiphertext`] before any cryptographic work. Any tag
/// mismatch (wrong key, corruption, tampering) is
/// [`SvimpassError::AuthenticationFailure`] with no partial plaintext.
pub fn open(key: &DerivedKey, envelope: &[u8]) -> Result<Zeroizing<Vec<u8>>, SvimpassError> {
    if envelope.len() < NONCE_LEN {
        return Err(SvimpassError::MalformedCiphertext);
    }
    let (nonce_bytes, ciphertext) = envelope.split_at(NONCE_LEN);
    let nonce = Nonce::try_assume_unique_for_key(nonce_bytes)
        .map_err(|_| SvimpassError::MalformedCiphertext)?;

    let aead = aead_key(key)?;

    let mut in_out = Zeroizing::new(ciphertext.to_vec());
    let plaintext_len = aead
        .open_in_place(nonce, Aad::empty(), &mut in_out[..])
        .map_err(|_| SvimpassError::AuthenticationFailure)?
        .len();
    in_out.truncate(plaintext_len);

    Ok(in_out)
}

/// Re-encrypt an envelope from `old` to `new`, keeping the plaintext in
/// zeroizing memory only.
pub fn reseal(old: &DerivedKey, new: &DerivedKey, envelope: &[u8]) -> Result<Vec<u8>, SvimpassError> {
    let plaintext = open(old, envelope)?;
    seal(new, &plaintext)
}
