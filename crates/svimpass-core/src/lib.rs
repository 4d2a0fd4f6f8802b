// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the svimpass credential vault.
//!
//! This crate provides the error taxonomy, the types shared with the storage
//! collaborator, and the [`CredentialCipher`] trait through which the store and
//! import/export paths reach the live vault key.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::SvimpassError;
pub use traits::CredentialCipher;
pub use types::{CredentialEntry, VaultState};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use secrecy::{ExposeSecret, SecretString};

    use super::*;

    /// Reversible stand-in cipher so the provided trait methods can be exercised.
    struct XorCipher(u8);

    impl CredentialCipher for XorCipher {
        fn encrypt(&self, plaintext: &str) -> Result<Vec<u8>, SvimpassError> {
            if plaintext.is_empty() {
                return Err(SvimpassError::EmptyInput);
            }
            Ok(plaintext.bytes().map(|b| b ^ self.0).collect())
        }

        fn decrypt(&self, ciphertext: &[u8]) -> Result<SecretString, SvimpassError> {
            let bytes: Vec<u8> = ciphertext.iter().map(|b| b ^ self.0).collect();
            String::from_utf8(bytes)
                .map(SecretString::from)
                .map_err(|_| SvimpassError::AuthenticationFailure)
        }
    }

    #[test]
    fn fatal_classification() {
        assert!(SvimpassError::RandomSource.is_fatal());
        assert!(SvimpassError::MalformedConfig("bad hex".into()).is_fatal());
        assert!(
            SvimpassError::ConfigIo {
                path: "/tmp/x".into(),
                source: std::io::Error::other("disk"),
            }
            .is_fatal()
        );
        assert!(!SvimpassError::InvalidPassword.is_fatal());
        assert!(!SvimpassError::AuthenticationFailure.is_fatal());
        assert!(!SvimpassError::Locked.is_fatal());
    }

    #[test]
    fn invalid_password_message_does_not_leak_cause() {
        assert_eq!(SvimpassError::InvalidPassword.to_string(), "invalid master password");
    }

    #[test]
    fn vault_state_display_round_trip() {
        for state in [VaultState::Uninitialized, VaultState::Locked, VaultState::Unlocked] {
            let parsed = VaultState::from_str(&state.to_string()).expect("should parse back");
            assert_eq!(state, parsed);
        }
        assert_eq!(VaultState::Unlocked.to_string(), "unlocked");
    }

    #[test]
    fn seal_entry_and_reveal_password() {
        let cipher = XorCipher(0x5a);
        let password = SecretString::from("hunter2".to_string());

        let entry = cipher
            .seal_entry("github", "alice", &password, Some("work".into()))
            .unwrap();
        assert_eq!(entry.service_name, "github");
        assert!(entry.id.is_none());
        assert_ne!(entry.encrypted_password, b"hunter2");

        let revealed = cipher.reveal_password(&entry).unwrap();
        assert_eq!(revealed.expose_secret(), "hunter2");
    }

    #[test]
    fn seal_entry_propagates_cipher_errors() {
        let cipher = XorCipher(1);
        let empty = SecretString::from(String::new());
        let err = cipher.seal_entry("svc", "bob", &empty, None).unwrap_err();
        assert!(matches!(err, SvimpassError::EmptyInput));
    }

    #[test]
    fn credential_entry_serializes_blob_as_hex() {
        let entry = CredentialEntry::new("svc", "bob", vec![0xde, 0xad, 0xbe, 0xef], None);
        let json = serde_json::to_string(&entry).expect("should serialize");
        assert!(json.contains("\"deadbeef\""));

        let parsed: CredentialEntry = serde_json::from_str(&json).expect("should deserialize");
        assert_eq!(parsed, entry);
    }

    #[test]
    fn replace_password_bumps_updated_at() {
        let mut entry = CredentialEntry::new("svc", "bob", vec![1, 2, 3], None);
        let created = entry.created_at;
        entry.replace_password(vec![4, 5, 6]);
        assert_eq!(entry.encrypted_password, vec![4, 5, 6]);
        assert!(entry.updated_at >= created);
    }
}
