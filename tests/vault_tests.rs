//! Integration tests for loading and storing the encrypted vault.

mod common;

use std::fs;

use common::{alice_session, vault_path, FakeCodec, ALICE, BOB};
use twofactor::errors::TwoFactorError;
use twofactor::vault::{Padding, SecretRecord, Vault, VaultSession};

fn sample_vault() -> Vault {
    let mut vault = Vault::new();
    vault
        .add(SecretRecord::new(
            "github",
            "JBSWY3DPEHPK3PXP",
            "GitHub (personal)",
            Padding::default(),
        ))
        .unwrap();
    vault
        .add(SecretRecord::new(
            "bank",
            "GEZDGNBVGY3TQOJQ",
            "Crédit — ünïcode",
            Padding::new(8).unwrap(),
        ))
        .unwrap();
    vault
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

#[test]
fn load_missing_file_returns_empty_vault() {
    let (_dir, path) = vault_path();
    let vault = alice_session(&path).load().unwrap();
    assert!(vault.is_empty());
    assert!(!path.exists());
}

#[cfg(unix)]
#[test]
fn load_fails_when_the_path_cannot_be_inspected() {
    let (dir, _) = vault_path();
    let plain = dir.path().join("plain-file");
    fs::write(&plain, b"x").unwrap();
    // A regular file used as a directory: the stat fails with something
    // other than "not found".
    let path = plain.join("vault.gpg");

    let err = alice_session(&path).load().unwrap_err();
    assert!(matches!(err, TwoFactorError::VaultUnreadable { .. }));
}

#[test]
fn load_garbage_is_unreadable() {
    let (_dir, path) = vault_path();
    fs::write(&path, b"this is not a vault").unwrap();

    let err = alice_session(&path).load().unwrap_err();
    assert!(matches!(err, TwoFactorError::VaultUnreadable { .. }));
}

#[test]
fn load_without_matching_private_key_is_unreadable() {
    let (_dir, path) = vault_path();
    fs::write(&path, FakeCodec::seal(b"{}", BOB)).unwrap();

    let err = alice_session(&path).load().unwrap_err();
    assert!(matches!(err, TwoFactorError::VaultUnreadable { .. }));
    assert!(err.to_string().contains("No secret key"));
}

#[test]
fn load_rejects_malformed_plaintext() {
    let (_dir, path) = vault_path();
    fs::write(&path, FakeCodec::seal(b"[1, 2, 3]", ALICE)).unwrap();

    assert!(matches!(
        alice_session(&path).load(),
        Err(TwoFactorError::VaultUnreadable { .. })
    ));
}

#[test]
fn load_rejects_non_positive_padding_at_rest() {
    let (_dir, path) = vault_path();
    let doc = br#"{"gh":{"secret":"S","description":"","name":"gh","padding":0}}"#;
    fs::write(&path, FakeCodec::seal(doc, ALICE)).unwrap();

    assert!(matches!(
        alice_session(&path).load(),
        Err(TwoFactorError::VaultUnreadable { .. })
    ));
}

#[test]
fn load_normalizes_legacy_documents() {
    let (_dir, path) = vault_path();
    // Older vaults stored CLI padding as a string and never updated
    // `name` on rename.
    let doc = br#"{"work":{"secret":"JBSWY3DPEHPK3PXP","description":"Mail","name":"old-work","padding":"8"},
                   "home":{"secret":"GEZDGNBVGY3TQOJQ","description":"","name":"home","padding":6}}"#;
    fs::write(&path, FakeCodec::seal(doc, ALICE)).unwrap();

    let vault = alice_session(&path).load().unwrap();
    let work = vault.get("work").unwrap();
    assert_eq!(work.name, "work");
    assert_eq!(work.padding.digits(), 8);
    assert_eq!(vault.get("home").unwrap().padding.digits(), 6);
}

// ---------------------------------------------------------------------------
// Store
// ---------------------------------------------------------------------------

#[test]
fn store_then_load_roundtrip() {
    let (_dir, path) = vault_path();
    let session = alice_session(&path);
    let vault = sample_vault();

    session.store(&vault).unwrap();
    let reloaded = session.load().unwrap();
    assert_eq!(reloaded, vault);

    // A second cycle is just as lossless.
    session.store(&reloaded).unwrap();
    assert_eq!(session.load().unwrap(), vault);
}

#[test]
fn store_empty_vault_roundtrip() {
    let (_dir, path) = vault_path();
    let session = alice_session(&path);

    session.store(&Vault::new()).unwrap();
    assert!(path.exists());
    assert!(session.load().unwrap().is_empty());
}

#[test]
fn store_encrypts_to_the_only_private_key() {
    let (_dir, path) = vault_path();
    alice_session(&path).store(&sample_vault()).unwrap();

    let raw = fs::read(&path).unwrap();
    assert_eq!(raw, FakeCodec::seal(&strip(&raw), ALICE));
    assert!(String::from_utf8_lossy(&raw).contains(ALICE));
}

/// Recover the plaintext of a fake-sealed file.
fn strip(raw: &[u8]) -> Vec<u8> {
    let body = &raw[b"FAKEPGP\n".len()..];
    let newline = body.iter().position(|b| *b == b'\n').unwrap();
    body[newline + 1..].iter().map(|b| b ^ 0x5a).collect()
}

#[test]
fn store_writes_canonical_json() {
    let (_dir, path) = vault_path();
    alice_session(&path).store(&sample_vault()).unwrap();

    let plaintext = strip(&fs::read(&path).unwrap());
    let json: serde_json::Value = serde_json::from_slice(&plaintext).unwrap();
    assert_eq!(json["bank"]["padding"], 8);
    assert_eq!(json["bank"]["name"], "bank");
    assert_eq!(json["github"]["description"], "GitHub (personal)");
    assert_eq!(json["github"]["secret"], "JBSWY3DPEHPK3PXP");
}

#[test]
fn store_with_no_private_keys_fails_before_writing() {
    let (_dir, path) = vault_path();
    let codec = FakeCodec::with_keys(&[]);
    let session = VaultSession::new(&path, codec, None);

    let err = session.store(&sample_vault()).unwrap_err();
    assert!(matches!(err, TwoFactorError::NoRecipient));
    assert!(!path.exists());
}

#[test]
fn store_with_two_private_keys_fails_before_writing() {
    let (dir, path) = vault_path();
    let session = VaultSession::new(&path, FakeCodec::with_keys(&[ALICE, BOB]), None);

    match session.store(&sample_vault()) {
        Err(TwoFactorError::AmbiguousRecipient(fprs)) => {
            assert_eq!(fprs, vec![ALICE.to_string(), BOB.to_string()]);
        }
        other => panic!("expected AmbiguousRecipient, got {other:?}"),
    }
    assert!(!path.exists());
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn ambiguity_check_runs_before_encryption() {
    let (_dir, path) = vault_path();
    let codec = FakeCodec::with_keys(&[ALICE, BOB]);
    let session = VaultSession::new(&path, &codec, None);

    assert!(session.store(&sample_vault()).is_err());
    assert_eq!(codec.encrypt_calls(), 0);
}

#[test]
fn explicit_fingerprint_resolves_ambiguity() {
    let (_dir, path) = vault_path();
    let session = VaultSession::new(
        &path,
        FakeCodec::with_keys(&[ALICE, BOB]),
        Some(BOB.to_string()),
    );

    session.store(&sample_vault()).unwrap();
    assert!(String::from_utf8_lossy(&fs::read(&path).unwrap()).contains(BOB));
    assert_eq!(session.load().unwrap(), sample_vault());
}

#[test]
fn encryption_failure_leaves_previous_vault_intact() {
    let (dir, path) = vault_path();
    alice_session(&path).store(&sample_vault()).unwrap();
    let before = fs::read(&path).unwrap();

    let session = VaultSession::new(&path, FakeCodec::alice().failing_encrypt(), None);
    let err = session.store(&Vault::new()).unwrap_err();

    assert!(matches!(err, TwoFactorError::VaultWriteFailed { .. }));
    assert_eq!(fs::read(&path).unwrap(), before);
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn store_into_missing_directory_fails() {
    let (dir, _) = vault_path();
    let path = dir.path().join("no-such-dir").join("vault.gpg");

    let err = alice_session(&path).store(&sample_vault()).unwrap_err();
    assert!(matches!(err, TwoFactorError::VaultWriteFailed { .. }));
    assert!(!path.exists());
}

#[test]
fn store_leaves_no_temp_files_behind() {
    let (dir, path) = vault_path();
    let session = alice_session(&path);
    for _ in 0..3 {
        session.store(&sample_vault()).unwrap();
    }

    let names: Vec<_> = fs::read_dir(dir.path())
        .unwrap()
        .map(|e| e.unwrap().file_name())
        .collect();
    assert_eq!(names, vec![std::ffi::OsString::from("vault.gpg")]);
}

#[cfg(unix)]
#[test]
fn store_writes_through_a_symlinked_vault() {
    let (dir, _) = vault_path();
    let synced = dir.path().join("synced");
    fs::create_dir(&synced).unwrap();
    let real = synced.join("real.gpg");
    let link = dir.path().join("vault.gpg");

    alice_session(&real).store(&Vault::new()).unwrap();
    std::os::unix::fs::symlink(&real, &link).unwrap();

    let session = alice_session(&link);
    session.store(&sample_vault()).unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(alice_session(&real).load().unwrap(), sample_vault());
    assert_eq!(session.load().unwrap(), sample_vault());
    assert_eq!(fs::read_dir(&synced).unwrap().count(), 1);
}
