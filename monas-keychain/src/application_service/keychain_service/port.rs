use std::error::Error as StdError;
use std::fmt;

use crate::domain::{
    cipher::{CipherAlgorithm, KeyOperation},
    key_attributes::{KeyAttributes, KeyQuery},
};

/// 鍵の検索・生成・暗号変換を提供するセキュアキーストアのポート。
///
/// - 実装は infra 層（インメモリ / sled / OS のキーチェーンなど）に置く。
/// - `Key` はストアが管理する鍵素材への不透明なハンドル。鍵素材の所有者はストア側で、
///   application 層はハンドルを複製して参照するだけ。
/// - 呼び出しはすべて同期的で、I/O やハードウェア処理でブロックしうる。
pub trait SecureKeyStore {
    type Key: Clone;

    /// タグに一致する秘密鍵を探す。見つからなければ `Ok(None)`。
    fn find(&self, query: &KeyQuery) -> Result<Option<Self::Key>, KeyStoreStatus>;

    /// 新しい鍵ペアを生成し、秘密鍵のハンドルを返す。
    ///
    /// `permanent` な鍵はタグ単位でアトミックに保存され、同じタグが既にあれば
    /// `KeyStoreStatus::DuplicateItem` を返す。
    fn generate(&self, attributes: &KeyAttributes) -> Result<Self::Key, KeyStoreStatus>;

    /// 秘密鍵のハンドルから公開鍵のハンドルを導出する。
    fn derive_public(&self, private_key: &Self::Key) -> Option<Self::Key>;

    /// この鍵で `operation` 方向に `algorithm` が使えるか。
    fn supports(&self, key: &Self::Key, operation: KeyOperation, algorithm: CipherAlgorithm)
        -> bool;

    /// 暗号化 / 復号を行う。
    fn transform(
        &self,
        key: &Self::Key,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, TransformFailure>;
}

/// キーストアが返す失敗ステータス。
///
/// `code()` は診断用の安定した数値で、ログや API レスポンスにそのまま出してよい。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyStoreStatus {
    #[error("an item with the same identifier already exists")]
    DuplicateItem,
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
    #[error("stored key could not be decoded: {0}")]
    Decode(String),
    #[error("storage error: {0}")]
    Storage(String),
    #[error("key generation failed: {0}")]
    Generation(String),
}

impl KeyStoreStatus {
    pub fn code(&self) -> i32 {
        match self {
            KeyStoreStatus::DuplicateItem => -25299,
            KeyStoreStatus::InvalidParameters(_) => -50,
            KeyStoreStatus::Decode(_) => -26275,
            KeyStoreStatus::Storage(_) => -36,
            KeyStoreStatus::Generation(_) => -67673,
        }
    }
}

/// 暗号変換の失敗。原因が報告されたかどうかを区別する。
#[derive(Debug)]
pub enum TransformFailure {
    Cause(NativeError),
    Unreported,
}

/// ストアが報告した下位エラー。説明文と、あれば元のエラーを保持する。
pub struct NativeError {
    description: String,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl NativeError {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            source: None,
        }
    }

    pub fn from_source<E>(source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        Self {
            description: source.to_string(),
            source: Some(Box::new(source)),
        }
    }

    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Debug for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeError")
            .field("description", &self.description)
            .field("has_source", &self.source.is_some())
            .finish()
    }
}

impl fmt::Display for NativeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl StdError for NativeError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}
