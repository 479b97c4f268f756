use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex};

use tracing::debug;

use crate::application_service::keychain_service::port::{
    KeyStoreStatus, SecureKeyStore, TransformFailure,
};
use crate::domain::cipher::{CipherAlgorithm, KeyOperation};
use crate::domain::key_attributes::{KeyAttributes, KeyQuery, KeyType};
use crate::domain::key_identifier::KeyIdentifier;
use crate::infrastructure::rsa_key::RsaKeyHandle;

fn check_query(query: &KeyQuery) -> Result<(), KeyStoreStatus> {
    if query.return_reference {
        Ok(())
    } else {
        Err(KeyStoreStatus::InvalidParameters(
            "exporting raw key material is not supported".to_string(),
        ))
    }
}

fn generate_key(attributes: &KeyAttributes) -> Result<RsaKeyHandle, KeyStoreStatus> {
    match attributes.key_type {
        KeyType::Rsa => RsaKeyHandle::generate(attributes.key_size_bits),
    }
}

/// プロセス内の `HashMap` に鍵を保存するインメモリ実装。
///
/// - 永続化は行わず、プロセス終了とともに破棄される。
/// - ローカル開発やテスト、PoC 用途を想定。
#[derive(Clone, Default)]
pub struct InMemoryKeyStore {
    inner: Arc<Mutex<HashMap<Vec<u8>, (KeyType, RsaKeyHandle)>>>,
}

impl InMemoryKeyStore {
    pub fn len(&self) -> usize {
        self.inner.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SecureKeyStore for InMemoryKeyStore {
    type Key = RsaKeyHandle;

    fn find(&self, query: &KeyQuery) -> Result<Option<RsaKeyHandle>, KeyStoreStatus> {
        check_query(query)?;
        let guard = self
            .inner
            .lock()
            .map_err(|e| KeyStoreStatus::Storage(e.to_string()))?;

        Ok(guard
            .get(query.identifier.as_bytes())
            .filter(|(key_type, _)| *key_type == query.key_type)
            .map(|(_, key)| key.clone()))
    }

    fn generate(&self, attributes: &KeyAttributes) -> Result<RsaKeyHandle, KeyStoreStatus> {
        let key = generate_key(attributes)?;
        if !attributes.permanent {
            return Ok(key);
        }

        let mut guard = self
            .inner
            .lock()
            .map_err(|e| KeyStoreStatus::Storage(e.to_string()))?;

        match guard.entry(attributes.identifier.as_bytes().to_vec()) {
            Entry::Occupied(_) => Err(KeyStoreStatus::DuplicateItem),
            Entry::Vacant(slot) => {
                slot.insert((attributes.key_type, key.clone()));
                Ok(key)
            }
        }
    }

    fn derive_public(&self, private_key: &RsaKeyHandle) -> Option<RsaKeyHandle> {
        private_key.to_public()
    }

    fn supports(
        &self,
        key: &RsaKeyHandle,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
    ) -> bool {
        key.supports(operation, algorithm)
    }

    fn transform(
        &self,
        key: &RsaKeyHandle,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, TransformFailure> {
        key.transform(operation, algorithm, input)
    }
}

/// sled を用いた鍵ストア実装。
///
/// - キー: `"keychain:rsa:"` + 識別子のバイト列
/// - 値: 1 バイトの鍵種別 + 秘密鍵の PKCS#8 DER
///
/// 同じタグへの保存は compare-and-swap で行うため、複数プロセスが同時に生成しても
/// 残る鍵は 1 つだけになる。
//
// NOTE: 鍵素材は平文の DER のまま保存している。OS のキーチェーンや HSM の代わりにはならない。
#[derive(Clone)]
pub struct SledKeyStore {
    db: sled::Db,
}

impl SledKeyStore {
    const KEY_PREFIX: &'static [u8] = b"keychain:rsa:";

    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, KeyStoreStatus> {
        let db = sled::open(path).map_err(|e| KeyStoreStatus::Storage(e.to_string()))?;
        Ok(Self { db })
    }

    fn sled_key(identifier: &KeyIdentifier) -> Vec<u8> {
        let mut key = Vec::with_capacity(Self::KEY_PREFIX.len() + identifier.as_bytes().len());
        key.extend_from_slice(Self::KEY_PREFIX);
        key.extend_from_slice(identifier.as_bytes());
        key
    }

    fn encode(key_type: KeyType, der: &[u8]) -> Vec<u8> {
        let mut value = Vec::with_capacity(1 + der.len());
        value.push(key_type.tag());
        value.extend_from_slice(der);
        value
    }

    fn decode(bytes: &[u8]) -> Result<(KeyType, RsaKeyHandle), KeyStoreStatus> {
        let (&tag, der) = bytes
            .split_first()
            .ok_or_else(|| KeyStoreStatus::Decode("value too short".to_string()))?;
        let key_type = KeyType::from_tag(tag)
            .ok_or_else(|| KeyStoreStatus::Decode(format!("unknown key type tag: {tag}")))?;

        match key_type {
            KeyType::Rsa => Ok((key_type, RsaKeyHandle::from_pkcs8_der(der)?)),
        }
    }
}

impl SecureKeyStore for SledKeyStore {
    type Key = RsaKeyHandle;

    fn find(&self, query: &KeyQuery) -> Result<Option<RsaKeyHandle>, KeyStoreStatus> {
        check_query(query)?;
        let opt = self
            .db
            .get(Self::sled_key(&query.identifier))
            .map_err(|e| KeyStoreStatus::Storage(e.to_string()))?;

        let Some(ivec) = opt else {
            return Ok(None);
        };

        let (key_type, key) = Self::decode(ivec.as_ref())?;
        if key_type != query.key_type {
            return Ok(None);
        }
        Ok(Some(key))
    }

    fn generate(&self, attributes: &KeyAttributes) -> Result<RsaKeyHandle, KeyStoreStatus> {
        let key = generate_key(attributes)?;
        if !attributes.permanent {
            return Ok(key);
        }

        let value = Self::encode(attributes.key_type, &key.to_pkcs8_der()?);
        self.db
            .compare_and_swap(
                Self::sled_key(&attributes.identifier),
                None::<&[u8]>,
                Some(value),
            )
            .map_err(|e| KeyStoreStatus::Storage(e.to_string()))?
            .map_err(|_| KeyStoreStatus::DuplicateItem)?;
        self.db
            .flush()
            .map_err(|e| KeyStoreStatus::Storage(e.to_string()))?;

        debug!(identifier = %attributes.identifier, "persisted key to sled");
        Ok(key)
    }

    fn derive_public(&self, private_key: &RsaKeyHandle) -> Option<RsaKeyHandle> {
        private_key.to_public()
    }

    fn supports(
        &self,
        key: &RsaKeyHandle,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
    ) -> bool {
        key.supports(operation, algorithm)
    }

    fn transform(
        &self,
        key: &RsaKeyHandle,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, TransformFailure> {
        key.transform(operation, algorithm, input)
    }
}

/// 実行時にどちらのストアを使うかを選ぶためのラッパー。
#[derive(Clone)]
pub enum KeyStoreBackend {
    InMemory(InMemoryKeyStore),
    Sled(SledKeyStore),
}

impl KeyStoreBackend {
    /// パスが与えられれば sled、なければインメモリのストアを開く。
    pub fn open(path: Option<&Path>) -> Result<Self, KeyStoreStatus> {
        match path {
            Some(path) => Ok(KeyStoreBackend::Sled(SledKeyStore::open(path)?)),
            None => Ok(KeyStoreBackend::InMemory(InMemoryKeyStore::default())),
        }
    }

    fn inner(&self) -> &dyn SecureKeyStore<Key = RsaKeyHandle> {
        match self {
            KeyStoreBackend::InMemory(store) => store,
            KeyStoreBackend::Sled(store) => store,
        }
    }
}

impl SecureKeyStore for KeyStoreBackend {
    type Key = RsaKeyHandle;

    fn find(&self, query: &KeyQuery) -> Result<Option<RsaKeyHandle>, KeyStoreStatus> {
        self.inner().find(query)
    }

    fn generate(&self, attributes: &KeyAttributes) -> Result<RsaKeyHandle, KeyStoreStatus> {
        self.inner().generate(attributes)
    }

    fn derive_public(&self, private_key: &RsaKeyHandle) -> Option<RsaKeyHandle> {
        self.inner().derive_public(private_key)
    }

    fn supports(
        &self,
        key: &RsaKeyHandle,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
    ) -> bool {
        self.inner().supports(key, operation, algorithm)
    }

    fn transform(
        &self,
        key: &RsaKeyHandle,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, TransformFailure> {
        self.inner().transform(key, operation, algorithm, input)
    }
}
