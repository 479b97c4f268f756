/// ストアから解決した鍵ペアのハンドル。
///
/// 鍵素材の所有者はストアであり、ここで保持するのは参照だけ。
/// 公開鍵は秘密鍵から導出できなかった場合に `None` になる。
#[derive(Debug, Clone, PartialEq)]
pub struct KeyPair<K> {
    private_key: K,
    public_key: Option<K>,
}

impl<K> KeyPair<K> {
    pub fn new(private_key: K, public_key: Option<K>) -> Self {
        Self {
            private_key,
            public_key,
        }
    }

    pub fn private_key(&self) -> &K {
        &self.private_key
    }

    pub fn public_key(&self) -> Option<&K> {
        self.public_key.as_ref()
    }
}
