// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password-based key derivation.
//!
//! Derives a 32-byte AES-256 key from the master password and a 32-byte salt,
//! using PBKDF2-HMAC-SHA256 (default) or Argon2id. The parameters are part of
//! the persisted master record so an existing vault keeps unlocking when the
//! configured defaults change.

use std::fmt;
use std::num::NonZeroU32;
use std::str::FromStr;

use ring::rand::{SecureRandom, SystemRandom};
use secrecy::{ExposeSecret, SecretString};
use svimpass_config::model::{KdfAlgorithm, VaultConfig};
use svimpass_config::validation::MIN_PBKDF2_ITERATIONS;
use svimpass_core::SvimpassError;
use zeroize::Zeroizing;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// Derived key length in bytes (AES-256).
pub const KEY_LEN: usize = 32;

/// Iteration count used by records that predate persisted KDF parameters.
pub const LEGACY_PBKDF2_ITERATIONS: u32 = 1000;

const LEGACY_ITERATIONS: NonZeroU32 = match NonZeroU32::new(LEGACY_PBKDF2_ITERATIONS) {
    Some(n) => n,
    None => panic!("legacy iteration count must be non-zero"),
};

/// Public per-vault random salt.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt from the OS CSPRNG.
    pub fn generate() -> Result<Self, SvimpassError> {
        let rng = SystemRandom::new();
        let mut salt = [0u8; SALT_LEN];
        rng.fill(&mut salt).map_err(|_| SvimpassError::RandomSource)?;
        Ok(Self(salt))
    }

    pub const fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }
}

impl TryFrom<&[u8]> for Salt {
    type Error = SvimpassError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let salt: [u8; SALT_LEN] = bytes.try_into().map_err(|_| {
            SvimpassError::MalformedConfig(format!(
                "salt must be {SALT_LEN} bytes, got {}",
                bytes.len()
            ))
        })?;
        Ok(Self(salt))
    }
}

impl fmt::Debug for Salt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Salt({})", hex::encode(self.0))
    }
}

/// KDF algorithm and cost parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KdfParams {
    /// PBKDF2-HMAC-SHA256 with the given iteration count.
    Pbkdf2Sha256 { iterations: NonZeroU32 },
    /// Argon2id (memory cost in KiB).
    Argon2id {
        memory_cost: u32,
        iterations: u32,
        parallelism: u32,
    },
}

impl KdfParams {
    /// Parameters of records written without a KDF field.
    pub const fn legacy() -> Self {
        Self::Pbkdf2Sha256 {
            iterations: LEGACY_ITERATIONS,
        }
    }

    /// PBKDF2-HMAC-SHA256 parameters; zero iterations are rejected.
    pub fn pbkdf2(iterations: u32) -> Result<Self, SvimpassError> {
        let iterations = NonZeroU32::new(iterations)
            .ok_or_else(|| SvimpassError::Kdf("PBKDF2 iterations must be non-zero".into()))?;
        Ok(Self::Pbkdf2Sha256 { iterations })
    }

    /// Parameters for new master passwords as configured in `[vault]`.
    pub fn from_config(config: &VaultConfig) -> Result<Self, SvimpassError> {
        match config.kdf {
            KdfAlgorithm::Pbkdf2Sha256 => Self::pbkdf2(config.pbkdf2_iterations),
            KdfAlgorithm::Argon2id => {
                let params = Self::Argon2id {
                    memory_cost: config.argon2_memory_cost,
                    iterations: config.argon2_iterations,
                    parallelism: config.argon2_parallelism,
                };
                params.argon2_params()?;
                Ok(params)
            }
        }
    }

    /// Whether these parameters are below what new vaults would accept.
    pub fn is_weak(&self) -> bool {
        matches!(self, Self::Pbkdf2Sha256 { iterations } if iterations.get() < MIN_PBKDF2_ITERATIONS)
    }

    fn argon2_params(&self) -> Result<argon2::Params, SvimpassError> {
        match *self {
            Self::Argon2id {
                memory_cost,
                iterations,
                parallelism,
            } => argon2::Params::new(memory_cost, iterations, parallelism, Some(KEY_LEN))
                .map_err(|e| SvimpassError::Kdf(format!("invalid Argon2id parameters: {e}"))),
            Self::Pbkdf2Sha256 { .. } => {
                Err(SvimpassError::Kdf("not an Argon2id parameter set".into()))
            }
        }
    }
}

/// Persisted form: `pbkdf2-sha256.<iterations>` or
/// `argon2id.<memory>.<iterations>.<parallelism>`. Never contains `:`.
impl fmt::Display for KdfParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pbkdf2Sha256 { iterations } => write!(f, "pbkdf2-sha256.{iterations}"),
            Self::Argon2id {
                memory_cost,
                iterations,
                parallelism,
            } => write!(f, "argon2id.{memory_cost}.{iterations}.{parallelism}"),
        }
    }
}

impl FromStr for KdfParams {
    type Err = SvimpassError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || SvimpassError::MalformedConfig(format!("unrecognized KDF descriptor `{s}`"));
        let number = |part: &str| part.parse::<u32>().map_err(|_| malformed());

        let parts: Vec<&str> = s.split('.').collect();
        match parts.as_slice() {
            ["pbkdf2-sha256", iterations] => {
                Self::pbkdf2(number(*iterations)?).map_err(|_| malformed())
            }
            ["argon2id", memory_cost, iterations, parallelism] => {
                let params = Self::Argon2id {
                    memory_cost: number(*memory_cost)?,
                    iterations: number(*iterations)?,
                    parallelism: number(*parallelism)?,
                };
                params.argon2_params().map_err(|_| malformed())?;
                Ok(params)
            }
            _ => Err(malformed()),
        }
    }
}

/// A symmetric key derived from the master password, with the salt and
/// parameters that produced it.
///
/// Key bytes are zeroed on drop. Debug output omits them.
#[derive(Clone)]
pub struct DerivedKey {
    key: Zeroizing<[u8; KEY_LEN]>,
    salt: Salt,
    params: KdfParams,
}

impl DerivedKey {
    pub fn salt(&self) -> &Salt {
        &self.salt
    }

    pub fn params(&self) -> KdfParams {
        self.params
    }

    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LEN] {
        &self.key
    }

    #[cfg(test)]
    pub(crate) fn from_raw(key: [u8; KEY_LEN]) -> Self {
        Self {
            key: Zeroizing::new(key),
            salt: Salt::from_bytes([0u8; SALT_LEN]),
            params: KdfParams::legacy(),
        }
    }
}

impl fmt::Debug for DerivedKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DerivedKey")
            .field("key", &"[REDACTED]")
            .field("salt", &self.salt)
            .field("params", &self.params)
            .finish()
    }
}

/// Derive a key from `password`.
///
/// With `salt == None` a fresh salt is generated first (setup and password
/// change). The same (password, salt, params) always yields the same key.
pub fn derive_key(
    password: &SecretString,
    salt: Option<Salt>,
    params: KdfParams,
) -> Result<DerivedKey, SvimpassError> {
    let salt = match salt {
        Some(salt) => salt,
        None => Salt::generate()?,
    };

    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    let secret = password.expose_secret().as_bytes();
    match params {
        KdfParams::Pbkdf2Sha256 { iterations } => {
            ring::pbkdf2::derive(
                ring::pbkdf2::PBKDF2_HMAC_SHA256,
                iterations,
                salt.as_bytes(),
                secret,
                key.as_mut(),
            );
        }
        KdfParams::Argon2id { .. } => {
            let argon2 = argon2::Argon2::new(
                argon2::Algorithm::Argon2id,
                argon2::Version::V0x13,
                params.argon2_params()?,
            );
            argon2
                .hash_password_into(secret, salt.as_bytes(), key.as_mut())
                .map_err(|e| SvimpassError::Kdf(format!("Argon2id key derivation failed: {e}")))?;
        }
    }

    Ok(DerivedKey { key, salt, params })
}
