use std::sync::{Mutex, PoisonError};

use tracing::{debug, info, warn};

use crate::application_service::keychain_service::error::KeychainError;
use crate::application_service::keychain_service::port::{KeyStoreStatus, SecureKeyStore};
use crate::config::KeychainConfig;
use crate::domain::key_attributes::{KeyAttributes, KeyQuery, KeyType};
use crate::domain::key_identifier::KeyIdentifier;
use crate::domain::key_pair::KeyPair;

/// 固定の識別子に対応する鍵ペアを解決する。
///
/// - 既存の秘密鍵があればそれを使い、「見つからない」場合に限り新しく生成して保存する。
/// - 解決結果はインスタンスの生存期間中キャッシュされ、ストアへの再問い合わせや再生成は行わない。
/// - 初回解決は `Mutex` で直列化されるため、同一インスタンスを複数スレッドから使っても
///   二重生成は起きない。失敗はキャッシュせず、次の呼び出しで再度解決を試みる。
pub struct KeyProvisioner<S: SecureKeyStore> {
    store: S,
    identifier: KeyIdentifier,
    key_type: KeyType,
    key_size_bits: usize,
    permanent: bool,
    cached: Mutex<Option<KeyPair<S::Key>>>,
}

impl<S: SecureKeyStore> KeyProvisioner<S> {
    pub fn new(store: S, config: &KeychainConfig) -> Self {
        Self {
            store,
            identifier: config.identifier.clone(),
            key_type: KeyType::Rsa,
            key_size_bits: config.key_size_bits,
            permanent: config.permanent,
            cached: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// キャッシュ済みの鍵ペアを返す。未解決ならここで解決する。
    pub fn key_pair(&self) -> Result<KeyPair<S::Key>, KeychainError> {
        self.ensure_resolved()
    }

    /// 秘密鍵のハンドル。初回だけストアを検索し、なければ生成する。
    pub fn private_key(&self) -> Result<S::Key, KeychainError> {
        Ok(self.ensure_resolved()?.private_key().clone())
    }

    /// 秘密鍵から導出した公開鍵のハンドル。導出結果もキャッシュされる。
    pub fn public_key(&self) -> Result<S::Key, KeychainError> {
        self.ensure_resolved()?
            .public_key()
            .cloned()
            .ok_or(KeychainError::NoPublicKey)
    }

    pub fn is_resolved(&self) -> bool {
        self.lock_cache().is_some()
    }

    /// キャッシュしているハンドルを手放す。鍵素材はストアに残る。
    pub fn release(&self) {
        if self.lock_cache().take().is_some() {
            debug!(identifier = %self.identifier, "released cached key handles");
        }
    }

    // ストアに問い合わせて秘密鍵を取得し、なければ生成する。キャッシュは使わない。
    fn find_or_generate(&self) -> Result<S::Key, KeychainError> {
        let query = KeyQuery::private_key(self.identifier.clone(), self.key_type);

        if let Some(key) = self.find(&query)? {
            debug!(identifier = %self.identifier, "found existing private key");
            return Ok(key);
        }

        let attributes = KeyAttributes {
            key_type: self.key_type,
            key_size_bits: self.key_size_bits,
            identifier: self.identifier.clone(),
            permanent: self.permanent,
        };

        match self.store.generate(&attributes) {
            Ok(key) => {
                info!(
                    identifier = %self.identifier,
                    key_size_bits = self.key_size_bits,
                    permanent = self.permanent,
                    "generated new key pair"
                );
                Ok(key)
            }
            // 検索と生成の間に別の書き手が同じタグで保存した。
            Err(KeyStoreStatus::DuplicateItem) => {
                debug!(identifier = %self.identifier, "tag was stored concurrently, re-querying");
                self.find(&query)?.ok_or(KeychainError::KeyGeneration(
                    KeyStoreStatus::DuplicateItem,
                ))
            }
            Err(status) => {
                warn!(identifier = %self.identifier, code = status.code(), "key generation failed: {status}");
                Err(KeychainError::KeyGeneration(status))
            }
        }
    }

    fn derive_public(&self, private_key: Option<&S::Key>) -> Result<S::Key, KeychainError> {
        let private_key = private_key.ok_or(KeychainError::NoPrivateKey)?;
        self.store
            .derive_public(private_key)
            .ok_or(KeychainError::NoPublicKey)
    }

    fn find(&self, query: &KeyQuery) -> Result<Option<S::Key>, KeychainError> {
        self.store.find(query).map_err(|status| {
            warn!(identifier = %self.identifier, code = status.code(), "key lookup failed: {status}");
            KeychainError::StoreFailure(status)
        })
    }

    fn ensure_resolved(&self) -> Result<KeyPair<S::Key>, KeychainError> {
        let mut cached = self.lock_cache();
        if let Some(pair) = cached.as_ref() {
            return Ok(pair.clone());
        }

        let private_key = self.find_or_generate()?;
        let public_key = match self.derive_public(Some(&private_key)) {
            Ok(public_key) => Some(public_key),
            Err(_) => {
                warn!(identifier = %self.identifier, "public key could not be derived");
                None
            }
        };

        let pair = KeyPair::new(private_key, public_key);
        *cached = Some(pair.clone());
        Ok(pair)
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, Option<KeyPair<S::Key>>> {
        // キャッシュはハンドルの有無だけなので、poison されても中身は一貫している。
        self.cached.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
