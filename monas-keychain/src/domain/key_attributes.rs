use crate::domain::key_identifier::KeyIdentifier;

/// キーストアが扱う鍵の種類。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyType {
    Rsa,
}

impl KeyType {
    /// 永続化時に値の先頭に置く 1 バイトの識別子。
    pub fn tag(&self) -> u8 {
        match self {
            KeyType::Rsa => 1,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(KeyType::Rsa),
            _ => None,
        }
    }
}

/// 既存の秘密鍵を探すための検索条件。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyQuery {
    pub identifier: KeyIdentifier,
    pub key_type: KeyType,
    /// 鍵素材そのものではなく参照（ハンドル）を返すよう要求する。
    pub return_reference: bool,
}

impl KeyQuery {
    pub fn private_key(identifier: KeyIdentifier, key_type: KeyType) -> Self {
        Self {
            identifier,
            key_type,
            return_reference: true,
        }
    }
}

/// 新しい鍵ペアを生成するときの属性。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAttributes {
    pub key_type: KeyType,
    pub key_size_bits: usize,
    pub identifier: KeyIdentifier,
    /// `true` の場合、プロセス再起動後も残るようストアに保存する。
    pub permanent: bool,
}
