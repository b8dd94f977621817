//! Integration tests for the FileVault crypto module.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};

use filevault::crypto::{
    decrypt, derive_key, encrypt, generate_salt, hash_bytes, hash_file_range, NONCE_LEN,
};
use tempfile::NamedTempFile;

// ---------------------------------------------------------------------------
// Encryption round-trip
// ---------------------------------------------------------------------------

#[test]
fn encrypt_decrypt_roundtrip() {
    let key = [0xABu8; 32];
    let plaintext = b"the quick brown fox jumps over the lazy dog";

    let ciphertext = encrypt(&key, plaintext).expect("encrypt should succeed");

    // CTR adds exactly one nonce and no padding or tag.
    assert_eq!(ciphertext.len(), NONCE_LEN + plaintext.len());

    let recovered = decrypt(&key, &ciphertext).expect("decrypt should succeed");
    assert_eq!(recovered, plaintext);
}

#[test]
fn encrypt_produces_different_ciphertext_each_time() {
    let key = [0xCDu8; 32];
    let plaintext = b"same input";

    let ct1 = encrypt(&key, plaintext).expect("encrypt 1");
    let ct2 = encrypt(&key, plaintext).expect("encrypt 2");

    // Fresh nonce per call, so neither the nonce nor the body may repeat.
    assert_ne!(ct1[..NONCE_LEN], ct2[..NONCE_LEN]);
    assert_ne!(ct1, ct2);
}

#[test]
fn decrypt_with_wrong_key_yields_garbage() {
    let key = [0x11u8; 32];
    let wrong_key = [0x22u8; 32];
    let plaintext = b"TOP_SECRET=42";

    let ciphertext = encrypt(&key, plaintext).expect("encrypt");
    let garbled = decrypt(&wrong_key, &ciphertext).expect("CTR never rejects a key");

    assert_eq!(garbled.len(), plaintext.len());
    assert_ne!(garbled, plaintext);
}

#[test]
fn decrypt_with_truncated_data_fails() {
    let key = [0xAAu8; 32];
    let result = decrypt(&key, &[0u8; NONCE_LEN - 1]);
    assert!(result.is_err(), "blob shorter than a nonce must fail");
}

#[test]
fn flipped_ciphertext_bit_flips_plaintext_bit() {
    let key = [0xBBu8; 32];
    let plaintext = b"VALUE=abc";

    let mut ciphertext = encrypt(&key, plaintext).expect("encrypt");
    ciphertext[NONCE_LEN] ^= 0x01;

    let recovered = decrypt(&key, &ciphertext).expect("decrypt");
    assert_eq!(recovered[0], plaintext[0] ^ 0x01);
    assert_eq!(recovered[1..], plaintext[1..]);
}

// ---------------------------------------------------------------------------
// Key derivation (Argon2id)
// ---------------------------------------------------------------------------

#[test]
fn derive_key_same_inputs_same_output() {
    let password = b"my-secure-passphrase";
    let salt = generate_salt().expect("salt");

    let key1 = derive_key(password, &salt).expect("derive 1");
    let key2 = derive_key(password, &salt).expect("derive 2");

    assert_eq!(
        key1.as_bytes(),
        key2.as_bytes(),
        "same password + salt must produce the same key"
    );
}

#[test]
fn derive_key_different_salts_different_keys() {
    let password = b"same-password";
    let salt1 = generate_salt().expect("salt 1");
    let salt2 = generate_salt().expect("salt 2");

    let key1 = derive_key(password, &salt1).expect("derive 1");
    let key2 = derive_key(password, &salt2).expect("derive 2");

    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

#[test]
fn derive_key_different_passwords_different_keys() {
    let salt = generate_salt().expect("salt");

    let key1 = derive_key(b"password-one", &salt).expect("derive 1");
    let key2 = derive_key(b"password-two", &salt).expect("derive 2");

    assert_ne!(key1.as_bytes(), key2.as_bytes());
}

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

#[test]
fn sha256_known_answer() {
    // SHA-256("abc") from FIPS 180-2.
    let expected: [u8; 32] = [
        0xba, 0x78, 0x16, 0xbf, 0x8f, 0x01, 0xcf, 0xea, 0x41, 0x41, 0x40, 0xde, 0x5d, 0xae,
        0x22, 0x23, 0xb0, 0x03, 0x61, 0xa3, 0x96, 0x17, 0x7a, 0x9c, 0xb4, 0x10, 0xff, 0x61,
        0xf2, 0x00, 0x15, 0xad,
    ];
    assert_eq!(hash_bytes(b"abc"), expected);
}

#[test]
fn file_range_hash_keeps_cursor_on_real_file() {
    let mut tmp = NamedTempFile::new().expect("temp file");
    tmp.write_all(b"header|payload|trailer").expect("write");

    let mut file = File::open(tmp.path()).expect("reopen");
    file.seek(SeekFrom::Start(3)).expect("seek");

    let digest = hash_file_range(&mut file, 7, 14).expect("hash range");
    assert_eq!(digest, hash_bytes(b"payload"));
    assert_eq!(file.stream_position().expect("position"), 3);
}

// ---------------------------------------------------------------------------
// End-to-end: password -> key -> encrypt/decrypt
// ---------------------------------------------------------------------------

#[test]
fn full_crypto_pipeline() {
    let password = b"hunter2-but-longer";
    let salt = generate_salt().expect("salt");

    let key = derive_key(password, &salt).expect("derive key");

    let plaintext = vec![0x42u8; 4096];
    let ciphertext = encrypt(key.as_bytes(), &plaintext).expect("encrypt");

    // Same password + stored salt reopens it.
    let again = derive_key(password, &salt).expect("derive again");
    let recovered = decrypt(again.as_bytes(), &ciphertext).expect("decrypt");
    assert_eq!(recovered, plaintext);
}
