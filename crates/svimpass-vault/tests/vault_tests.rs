// SPDX-FileCopyrightText: 2026 Svimpass Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests of the master password lifecycle over a file-backed store.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use svimpass_core::{CredentialCipher, SvimpassError, VaultState};
use svimpass_vault::crypto;
use svimpass_vault::{
    derive_key, FileConfigStore, KdfParams, MasterPasswordManager, MemoryConfigStore, Salt,
    VaultSession,
};

fn pw(s: &str) -> SecretString {
    SecretString::from(s.to_string())
}

fn fast() -> KdfParams {
    KdfParams::pbkdf2(1000).unwrap()
}

fn file_session(dir: &tempfile::TempDir) -> VaultSession<FileConfigStore> {
    let store = FileConfigStore::new(dir.path().join("svimpass").join("master.conf"));
    VaultSession::open(store, fast()).unwrap()
}

#[test]
fn setup_encrypt_lock_unlock_decrypt() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(&dir);

    session
        .setup(&pw("correct-horse"), &pw("correct-horse"))
        .unwrap();
    let blob = session.encrypt("s3cr3t").unwrap();
    session.lock();
    assert!(matches!(session.decrypt(&blob), Err(SvimpassError::Locked)));

    session.unlock(&pw("correct-horse")).unwrap();
    assert_eq!(session.decrypt(&blob).unwrap().expose_secret(), "s3cr3t");
}

#[test]
fn setup_survives_process_restart() {
    let dir = tempfile::tempdir().unwrap();
    let blob = {
        let session = file_session(&dir);
        session.setup(&pw("pw"), &pw("pw")).unwrap();
        session.encrypt("persisted").unwrap()
    };

    let session = file_session(&dir);
    assert_eq!(session.state(), VaultState::Locked);
    session.unlock(&pw("pw")).unwrap();
    assert_eq!(session.decrypt(&blob).unwrap().expose_secret(), "persisted");
}

#[test]
fn fresh_vault_is_uninitialized() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(&dir);

    assert!(!session.is_initialized());
    assert_eq!(session.state(), VaultState::Uninitialized);
    assert!(matches!(
        session.unlock(&pw("anything")),
        Err(SvimpassError::NotInitialized)
    ));
    assert!(!dir.path().join("svimpass").exists());
}

#[test]
fn wrong_password_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(&dir);
    session.setup(&pw("right"), &pw("right")).unwrap();
    session.lock();

    let path = dir.path().join("svimpass").join("master.conf");
    let before = std::fs::read(&path).unwrap();
    assert!(matches!(
        session.unlock(&pw("wrong")),
        Err(SvimpassError::InvalidPassword)
    ));
    assert_eq!(std::fs::read(&path).unwrap(), before);
    assert_eq!(session.state(), VaultState::Locked);
}

#[test]
fn change_password_invalidates_old_password_and_ciphertext() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(&dir);
    session.setup(&pw("old"), &pw("old")).unwrap();
    let old_blob = session.encrypt("before").unwrap();

    let rekey = session
        .change_master_password(&pw("old"), &pw("new"))
        .unwrap();
    drop(rekey);

    // Not resealed: the old envelope is orphaned.
    assert!(matches!(
        session.decrypt(&old_blob),
        Err(SvimpassError::AuthenticationFailure)
    ));

    session.lock();
    assert!(matches!(
        session.unlock(&pw("old")),
        Err(SvimpassError::InvalidPassword)
    ));
    session.unlock(&pw("new")).unwrap();
    let new_blob = session.encrypt("after").unwrap();
    assert_eq!(session.decrypt(&new_blob).unwrap().expose_secret(), "after");
}

#[test]
fn rekey_reseals_stored_entries() {
    let session = VaultSession::open(MemoryConfigStore::new(), fast()).unwrap();
    session.setup(&pw("old"), &pw("old")).unwrap();
    let mut entries = vec![
        session
            .seal_entry("github", "alice", &pw("gh-token"), None)
            .unwrap(),
        session
            .seal_entry("mail", "alice@example.com", &pw("mail-pass"), Some("work".into()))
            .unwrap(),
    ];

    let rekey = session
        .change_master_password(&pw("old"), &pw("new"))
        .unwrap();
    for entry in &mut entries {
        rekey.reseal_entry(entry).unwrap();
    }
    drop(rekey);

    assert_eq!(
        session.reveal_password(&entries[0]).unwrap().expose_secret(),
        "gh-token"
    );
    assert_eq!(
        session.reveal_password(&entries[1]).unwrap().expose_secret(),
        "mail-pass"
    );
}

#[test]
fn reset_removes_record_and_allows_new_setup() {
    let dir = tempfile::tempdir().unwrap();
    let session = file_session(&dir);
    session.setup(&pw("pw"), &pw("pw")).unwrap();

    session.reset().unwrap();
    assert_eq!(session.state(), VaultState::Uninitialized);
    assert!(!dir.path().join("svimpass").join("master.conf").exists());
    assert!(matches!(session.encrypt("x"), Err(SvimpassError::Locked)));

    session.setup(&pw("other"), &pw("other")).unwrap();
    assert_eq!(session.state(), VaultState::Unlocked);
}

#[test]
fn malformed_file_is_fatal_and_preserved() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("master.conf");
    std::fs::write(&path, "deadbeef:cafe:maybe").unwrap();

    let err = VaultSession::open(FileConfigStore::new(&path), fast()).unwrap_err();
    assert!(err.is_fatal());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "deadbeef:cafe:maybe");
}

#[test]
fn legacy_record_still_unlocks() {
    // A record as older installations wrote it: no KDF field, PBKDF2 at 1000 rounds.
    let salt = Salt::from_bytes([0x11; 32]);
    let key = derive_key(&pw("legacy-pw"), Some(salt), KdfParams::legacy()).unwrap();
    let token = svimpass_vault::verifier::build_verifier(&key).unwrap();
    let record = format!("{}:{}:true", "11".repeat(32), hex::encode(token));

    let session =
        VaultSession::open(MemoryConfigStore::with_record(record), KdfParams::pbkdf2(600_000).unwrap())
            .unwrap();
    assert_eq!(session.record_kdf(), Some(KdfParams::legacy()));
    session.unlock(&pw("legacy-pw")).unwrap();
    assert!(session.is_unlocked());
}

#[test]
fn argon2id_vault_roundtrip() {
    let params = KdfParams::Argon2id {
        memory_cost: 8192,
        iterations: 1,
        parallelism: 1,
    };
    let store = Arc::new(MemoryConfigStore::new());
    let session = VaultSession::open(Arc::clone(&store), params).unwrap();
    session.setup(&pw("memory-hard"), &pw("memory-hard")).unwrap();
    assert!(store.raw().unwrap().ends_with(":argon2id.8192.1.1"));

    let reopened = VaultSession::open(store, fast()).unwrap();
    assert_eq!(reopened.record_kdf(), Some(params));
    reopened.unlock(&pw("memory-hard")).unwrap();
}

#[test]
fn distinct_salts_yield_distinct_keys() {
    let a = derive_key(&pw("same"), None, fast()).unwrap();
    let b = derive_key(&pw("same"), None, fast()).unwrap();
    assert_ne!(a.salt(), b.salt());

    let blob = crypto::seal(&a, b"payload").unwrap();
    assert!(matches!(
        crypto::open(&b, &blob),
        Err(SvimpassError::AuthenticationFailure)
    ));

    let a_again = derive_key(&pw("same"), Some(*a.salt()), fast()).unwrap();
    assert_eq!(crypto::open(&a_again, &blob).unwrap().as_slice(), b"payload");
}

#[test]
fn manager_and_session_agree_on_record() {
    let store = Arc::new(MemoryConfigStore::new());
    let mut manager = MasterPasswordManager::load(Arc::clone(&store), fast()).unwrap();
    manager.setup(&pw("pw"), &pw("pw")).unwrap();

    let session = VaultSession::open(Arc::clone(&store), fast()).unwrap();
    assert_eq!(session.state(), VaultState::Locked);
    session.unlock(&pw("pw")).unwrap();
}
