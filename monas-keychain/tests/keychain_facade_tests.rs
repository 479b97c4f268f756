use monas_keychain::{
    CipherAlgorithm, CipherFacade, InMemoryKeyStore, KeyIdentifier, KeyOperation,
    KeyStoreBackend, KeychainConfig, KeychainError, SecureKeyStore, SledKeyStore,
};

/// OAEP with SHA-512 on a 2048-bit modulus: 256 - 2 * 64 - 2.
const OAEP_SHA512_BOUND: usize = 126;

fn config(tag: &str) -> KeychainConfig {
    KeychainConfig::default().with_identifier(KeyIdentifier::from(tag))
}

#[test]
fn round_trip_within_oaep_bound() {
    let facade = CipherFacade::with_config(InMemoryKeyStore::default(), &config("round-trip"));

    for len in [0, 1, 17, 64, OAEP_SHA512_BOUND] {
        let plaintext = "x".repeat(len);
        let ciphertext = facade.encrypt_text(&plaintext).unwrap();
        assert_eq!(ciphertext.len(), 256);

        let decrypted = facade.decrypt(&ciphertext).unwrap();
        assert_eq!(decrypted, plaintext.as_bytes());
    }

    let multibyte = "鍵ペア🔑";
    let ciphertext = facade.encrypt_text(multibyte).unwrap();
    assert_eq!(facade.decrypt(&ciphertext).unwrap(), multibyte.as_bytes());
}

#[test]
fn oversized_and_tampered_inputs_fail() {
    let facade = CipherFacade::with_config(InMemoryKeyStore::default(), &config("bounds"));

    let oversized = "x".repeat(OAEP_SHA512_BOUND + 1);
    assert!(matches!(
        facade.encrypt_text(&oversized),
        Err(KeychainError::Forwarded(_))
    ));

    let mut ciphertext = facade.encrypt_text("Super secret text").unwrap();
    ciphertext[100] ^= 0x01;
    assert!(matches!(
        facade.decrypt(&ciphertext),
        Err(KeychainError::Forwarded(_)) | Err(KeychainError::UnknownFailure)
    ));

    assert!(matches!(
        facade.decrypt(&ciphertext[..128]),
        Err(KeychainError::Forwarded(_)) | Err(KeychainError::UnknownFailure)
    ));
}

#[test]
fn encryption_is_randomized() {
    let facade = CipherFacade::with_config(InMemoryKeyStore::default(), &config("randomized"));

    let a = facade.encrypt_text("same").unwrap();
    let b = facade.encrypt_text("same").unwrap();

    assert_ne!(a, b);
    assert_eq!(facade.decrypt(&a).unwrap(), facade.decrypt(&b).unwrap());
}

#[test]
fn facades_sharing_a_store_share_the_key() {
    let store = InMemoryKeyStore::default();
    let first = CipherFacade::with_config(store.clone(), &config("shared"));
    let second = CipherFacade::with_config(store.clone(), &config("shared"));

    let ciphertext = first.encrypt_text("hello").unwrap();

    assert_eq!(second.decrypt(&ciphertext).unwrap(), b"hello");
    assert_eq!(store.len(), 1);
    assert_eq!(
        first.public_key().unwrap(),
        second.public_key().unwrap()
    );
}

#[test]
fn sled_key_survives_restart() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("keychain_db");

    let ciphertext = {
        let store = SledKeyStore::open(&path).expect("open sled");
        let facade = CipherFacade::with_config(store, &config("restart"));
        facade.encrypt_text("Super secret text").unwrap()
    };

    let backend = KeyStoreBackend::open(Some(&path)).expect("reopen sled");
    let facade = CipherFacade::with_config(backend, &config("restart"));

    assert_eq!(facade.decrypt(&ciphertext).unwrap(), b"Super secret text");
}

#[test]
fn public_handle_cannot_decrypt() {
    let store = InMemoryKeyStore::default();
    let facade = CipherFacade::with_config(store.clone(), &config("direction"));

    let public = facade.public_key().unwrap();

    assert!(!store.supports(
        &public,
        KeyOperation::Decrypt,
        CipherAlgorithm::RsaEncryptionOaepSha512
    ));
}
