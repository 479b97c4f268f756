use std::fmt;

/// キーストア内の 1 組の鍵ペアを指す識別子（タグ）。
///
/// 逆ドメイン形式の文字列を想定しているが、ドメイン側では不透明なバイト列として扱う。
/// 同じ識別子は、一度生成された後は常に同じ秘密鍵に解決される。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyIdentifier(Vec<u8>);

impl KeyIdentifier {
    pub fn new(value: impl Into<Vec<u8>>) -> Self {
        Self(value.into())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl From<&str> for KeyIdentifier {
    fn from(value: &str) -> Self {
        Self::new(value.as_bytes())
    }
}

impl fmt::Display for KeyIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.0))
    }
}
