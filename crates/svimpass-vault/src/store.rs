// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistence of the master password record.
//!
//! The record is a single line `salt_hex:token_hex:initialized[:kdf]`. Records
//! without the fourth field predate tunable KDFs and decode with
//! [`KdfParams::legacy`].

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

use svimpass_core::SvimpassError;
use tracing::debug;

use crate::kdf::{KdfParams, Salt};

/// The persisted state of an initialized master password.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MasterPasswordConfig {
    pub salt: Salt,
    pub encrypted_token: Vec<u8>,
    pub kdf: KdfParams,
}

impl MasterPasswordConfig {
    /// Serialize to the on-disk line (no trailing newline).
    pub fn encode(&self) -> String {
        format!(
            "{}:{}:true:{}",
            hex::encode(self.salt.as_bytes()),
            hex::encode(&self.encrypted_token),
            self.kdf
        )
    }

    /// Parse an on-disk record.
    ///
    /// Returns `Ok(None)` for a well-formed record whose initialized flag is
    /// `false`. Anything unparseable is [`SvimpassError::MalformedConfig`].
    pub fn decode(record: &str) -> Result<Option<Self>, SvimpassError> {
        let malformed = |why: &str| SvimpassError::MalformedConfig(why.to_string());

        let fields: Vec<&str> = record.trim_end_matches(['\r', '\n']).split(':').collect();
        let (salt_hex, token_hex, flag, kdf) = match fields.as_slice() {
            [salt, token, flag] => (*salt, *token, *flag, None),
            [salt, token, flag, kdf] => (*salt, *token, *flag, Some(*kdf)),
            _ => {
                return Err(malformed(&format!(
                    "expected 3 or 4 fields, found {}",
                    fields.len()
                )));
            }
        };

        let salt = hex::decode(salt_hex).map_err(|e| malformed(&format!("salt: {e}")))?;
        let encrypted_token =
            hex::decode(token_hex).map_err(|e| malformed(&format!("verification token: {e}")))?;
        let initialized = match flag {
            "true" => true,
            "false" => false,
            other => return Err(malformed(&format!("initialized flag `{other}` is not a boolean"))),
        };
        let kdf = match kdf {
            Some(descriptor) => descriptor.parse()?,
            None => KdfParams::legacy(),
        };

        if !initialized {
            return Ok(None);
        }
        if encrypted_token.is_empty() {
            return Err(malformed("initialized record has an empty verification token"));
        }

        Ok(Some(Self {
            salt: Salt::try_from(salt.as_slice())?,
            encrypted_token,
            kdf,
        }))
    }

    /// Whether this record lacks persisted KDF parameters.
    pub fn is_legacy(&self) -> bool {
        self.kdf == KdfParams::legacy()
    }
}

/// Where the master password record lives.
pub trait ConfigStore: Send + Sync {
    /// The stored record, or `None` if nothing (or an uninitialized record) is stored.
    fn load(&self) -> Result<Option<MasterPasswordConfig>, SvimpassError>;

    /// Replace the stored record. Either the old or the new record survives a crash.
    fn save(&self, config: &MasterPasswordConfig) -> Result<(), SvimpassError>;

    /// Remove the stored record. Erasing an absent record is not an error.
    fn erase(&self) -> Result<(), SvimpassError>;
}

/// Record stored in a file, written via temp file + rename.
#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn io_error(&self, source: std::io::Error) -> SvimpassError {
        SvimpassError::ConfigIo {
            path: self.path.clone(),
            source,
        }
    }

    fn parent_dir(&self) -> &Path {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        }
    }
}

fn create_private_dir(dir: &Path) -> std::io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Result<Option<MasterPasswordConfig>, SvimpassError> {
        match std::fs::read_to_string(&self.path) {
            Ok(contents) => MasterPasswordConfig::decode(&contents),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(self.io_error(e)),
        }
    }

    fn save(&self, config: &MasterPasswordConfig) -> Result<(), SvimpassError> {
        let dir = self.parent_dir();
        if !dir.exists() {
            create_private_dir(dir).map_err(|e| self.io_error(e))?;
        }

        let mut tmp = tempfile::NamedTempFile::new_in(dir).map_err(|e| self.io_error(e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            tmp.as_file()
                .set_permissions(std::fs::Permissions::from_mode(0o600))
                .map_err(|e| self.io_error(e))?;
        }
        tmp.write_all(config.encode().as_bytes())
            .map_err(|e| self.io_error(e))?;
        tmp.as_file().sync_all().map_err(|e| self.io_error(e))?;
        tmp.persist(&self.path).map_err(|e| self.io_error(e.error))?;

        debug!(path = %self.path.display(), "master password record written");
        Ok(())
    }

    fn erase(&self) -> Result<(), SvimpassError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                debug!(path = %self.path.display(), "master password record removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(self.io_error(e)),
        }
    }
}

/// In-memory store holding the encoded record, for tests and ephemeral vaults.
#[derive(Debug, Default)]
pub struct MemoryConfigStore {
    record: Mutex<Option<String>>,
}

impl MemoryConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store pre-populated with a raw record line.
    pub fn with_record(record: impl Into<String>) -> Self {
        Self {
            record: Mutex::new(Some(record.into())),
        }
    }

    /// The raw stored line.
    pub fn raw(&self) -> Option<String> {
        self.record
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

impl ConfigStore for MemoryConfigStore {
    fn load(&self) -> Result<Option<MasterPasswordConfig>, SvimpassError> {
        match self.raw() {
            Some(record) => MasterPasswordConfig::decode(&record),
            None => Ok(None),
        }
    }

    fn save(&self, config: &MasterPasswordConfig) -> Result<(), SvimpassError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = Some(config.encode());
        Ok(())
    }

    fn erase(&self) -> Result<(), SvimpassError> {
        *self.record.lock().unwrap_or_else(PoisonError::into_inner) = None;
        Ok(())
    }
}

impl<T: ConfigStore + ?Sized> ConfigStore for std::sync::Arc<T> {
    fn load(&self) -> Result<Option<MasterPasswordConfig>, SvimpassError> {
        (**self).load()
    }

    fn save(&self, config: &MasterPasswordConfig) -> Result<(), SvimpassError> {
        (**self).save(config)
    }

    fn erase(&self) -> Result<(), SvimpassError> {
        (**self).erase()
    }
}
