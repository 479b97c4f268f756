//! Test utilities and a mock key store for unit testing.
//!
//! `MockKeyStore` records how often each port method is called so tests can
//! assert that a transform never ran or that generation happened exactly once.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Mutex;

use crate::application_service::keychain_service::port::{
    KeyStoreStatus, NativeError, SecureKeyStore, TransformFailure,
};
use crate::domain::cipher::{CipherAlgorithm, KeyOperation};
use crate::domain::key_attributes::{KeyAttributes, KeyQuery};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockKey {
    Private(u32),
    Public(u32),
}

/// How `transform` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockTransform {
    /// Encrypt reverses the input, decrypt reverses it back.
    Reverse,
    FailWithCause,
    FailUnreported,
}

pub struct MockKeyStore {
    keys: Mutex<HashMap<Vec<u8>, u32>>,
    next_id: AtomicU32,
    pub find_calls: AtomicUsize,
    pub generate_calls: AtomicUsize,
    pub transform_calls: AtomicUsize,
    find_failure: Option<KeyStoreStatus>,
    generate_failure: Option<KeyStoreStatus>,
    always_not_found: bool,
    concurrent_insert_on_generate: bool,
    derive_public: bool,
    supported: bool,
    transform: MockTransform,
}

impl Default for MockKeyStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MockKeyStore {
    pub fn new() -> Self {
        Self {
            keys: Mutex::new(HashMap::new()),
            next_id: AtomicU32::new(1),
            find_calls: AtomicUsize::new(0),
            generate_calls: AtomicUsize::new(0),
            transform_calls: AtomicUsize::new(0),
            find_failure: None,
            generate_failure: None,
            always_not_found: false,
            concurrent_insert_on_generate: false,
            derive_public: true,
            supported: true,
            transform: MockTransform::Reverse,
        }
    }

    pub fn with_existing_key(self, tag: &[u8], id: u32) -> Self {
        self.keys.lock().unwrap().insert(tag.to_vec(), id);
        self
    }

    pub fn with_find_failure(self, status: KeyStoreStatus) -> Self {
        Self {
            find_failure: Some(status),
            ..self
        }
    }

    pub fn with_generate_failure(self, status: KeyStoreStatus) -> Self {
        Self {
            generate_failure: Some(status),
            ..self
        }
    }

    pub fn always_not_found(self) -> Self {
        Self {
            always_not_found: true,
            ..self
        }
    }

    /// Simulates another writer storing the same tag between `find` and `generate`.
    pub fn with_concurrent_insert(self) -> Self {
        Self {
            concurrent_insert_on_generate: true,
            ..self
        }
    }

    pub fn without_public_derivation(self) -> Self {
        Self {
            derive_public: false,
            ..self
        }
    }

    pub fn unsupported(self) -> Self {
        Self {
            supported: false,
            ..self
        }
    }

    pub fn with_transform(self, transform: MockTransform) -> Self {
        Self { transform, ..self }
    }

    pub fn find_count(&self) -> usize {
        self.find_calls.load(Ordering::SeqCst)
    }

    pub fn generate_count(&self) -> usize {
        self.generate_calls.load(Ordering::SeqCst)
    }

    pub fn transform_count(&self) -> usize {
        self.transform_calls.load(Ordering::SeqCst)
    }
}

impl SecureKeyStore for MockKeyStore {
    type Key = MockKey;

    fn find(&self, query: &KeyQuery) -> Result<Option<MockKey>, KeyStoreStatus> {
        self.find_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = &self.find_failure {
            return Err(status.clone());
        }
        if self.always_not_found {
            return Ok(None);
        }
        let keys = self.keys.lock().unwrap();
        Ok(keys
            .get(query.identifier.as_bytes())
            .map(|id| MockKey::Private(*id)))
    }

    fn generate(&self, attributes: &KeyAttributes) -> Result<MockKey, KeyStoreStatus> {
        self.generate_calls.fetch_add(1, Ordering::SeqCst);
        if let Some(status) = &self.generate_failure {
            return Err(status.clone());
        }
        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let mut keys = self.keys.lock().unwrap();
        if self.concurrent_insert_on_generate {
            keys.insert(attributes.identifier.as_bytes().to_vec(), id + 100);
            return Err(KeyStoreStatus::DuplicateItem);
        }
        if attributes.permanent {
            keys.insert(attributes.identifier.as_bytes().to_vec(), id);
        }
        Ok(MockKey::Private(id))
    }

    fn derive_public(&self, private_key: &MockKey) -> Option<MockKey> {
        match (self.derive_public, private_key) {
            (true, MockKey::Private(id)) => Some(MockKey::Public(*id)),
            _ => None,
        }
    }

    fn supports(&self, key: &MockKey, operation: KeyOperation, _: CipherAlgorithm) -> bool {
        self.supported
            && matches!(
                (key, operation),
                (MockKey::Public(_), KeyOperation::Encrypt)
                    | (MockKey::Private(_), KeyOperation::Decrypt)
            )
    }

    fn transform(
        &self,
        _: &MockKey,
        _: KeyOperation,
        _: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, TransformFailure> {
        self.transform_calls.fetch_add(1, Ordering::SeqCst);
        match self.transform {
            MockTransform::Reverse => Ok(input.iter().rev().copied().collect()),
            MockTransform::FailWithCause => Err(TransformFailure::Cause(NativeError::new(
                "mock transform rejected input",
            ))),
            MockTransform::FailUnreported => Err(TransformFailure::Unreported),
        }
    }
}

/// A 2048-bit key generated once per test binary; RSA key generation is slow.
pub fn shared_rsa_key() -> crate::infrastructure::rsa_key::RsaKeyHandle {
    use std::sync::OnceLock;

    static KEY: OnceLock<crate::infrastructure::rsa_key::RsaKeyHandle> = OnceLock::new();
    KEY.get_or_init(|| crate::infrastructure::rsa_key::RsaKeyHandle::generate(2048).unwrap())
        .clone()
}
