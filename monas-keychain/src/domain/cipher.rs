use std::fmt;
use std::str::FromStr;

/// 鍵に対して要求する操作の向き。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyOperation {
    Encrypt,
    Decrypt,
}

impl fmt::Display for KeyOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            KeyOperation::Encrypt => f.write_str("encrypt"),
            KeyOperation::Decrypt => f.write_str("decrypt"),
        }
    }
}

/// 非対称暗号のアルゴリズム（パディング方式とダイジェストの組）。
///
/// OAEP の場合、ダイジェストと MGF1 のハッシュには同じ関数を使う。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum CipherAlgorithm {
    RsaEncryptionOaepSha256,
    #[default]
    RsaEncryptionOaepSha512,
    RsaEncryptionPkcs1,
}

impl CipherAlgorithm {
    pub fn name(&self) -> &'static str {
        match self {
            CipherAlgorithm::RsaEncryptionOaepSha256 => "rsa-encryption-oaep-sha256",
            CipherAlgorithm::RsaEncryptionOaepSha512 => "rsa-encryption-oaep-sha512",
            CipherAlgorithm::RsaEncryptionPkcs1 => "rsa-encryption-pkcs1",
        }
    }

    /// OAEP で使うダイジェストの長さ（バイト）。PKCS#1 v1.5 では `None`。
    pub fn digest_len(&self) -> Option<usize> {
        match self {
            CipherAlgorithm::RsaEncryptionOaepSha256 => Some(32),
            CipherAlgorithm::RsaEncryptionOaepSha512 => Some(64),
            CipherAlgorithm::RsaEncryptionPkcs1 => None,
        }
    }

    /// 法のバイト長 `modulus_len` の鍵で暗号化できる平文の最大長。
    ///
    /// - OAEP: `k - 2 * hLen - 2`
    /// - PKCS#1 v1.5: `k - 11`
    pub fn max_plaintext_len(&self, modulus_len: usize) -> usize {
        let overhead = match self.digest_len() {
            Some(h_len) => 2 * h_len + 2,
            None => 11,
        };
        modulus_len.saturating_sub(overhead)
    }
}

impl fmt::Display for CipherAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown cipher algorithm: {0}")]
pub struct UnknownAlgorithm(pub String);

impl FromStr for CipherAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rsa-encryption-oaep-sha256" => Ok(CipherAlgorithm::RsaEncryptionOaepSha256),
            "rsa-encryption-oaep-sha512" => Ok(CipherAlgorithm::RsaEncryptionOaepSha512),
            "rsa-encryption-pkcs1" => Ok(CipherAlgorithm::RsaEncryptionPkcs1),
            other => Err(UnknownAlgorithm(other.to_string())),
        }
    }
}

#[cfg(test)]
mod cipher_algorithm_tests {
    use super::*;

    #[test]
    fn default_is_oaep_sha512() {
        assert_eq!(
            CipherAlgorithm::default(),
            CipherAlgorithm::RsaEncryptionOaepSha512
        );
    }

    #[test]
    fn oaep_sha512_bound_for_2048_bit_key() {
        let bound = CipherAlgorithm::RsaEncryptionOaepSha512.max_plaintext_len(256);
        assert_eq!(bound, 126);
    }

    #[test]
    fn oaep_sha256_and_pkcs1_bounds_for_2048_bit_key() {
        assert_eq!(
            CipherAlgorithm::RsaEncryptionOaepSha256.max_plaintext_len(256),
            190
        );
        assert_eq!(CipherAlgorithm::RsaEncryptionPkcs1.max_plaintext_len(256), 245);
    }

    #[test]
    fn bound_saturates_on_tiny_modulus() {
        assert_eq!(CipherAlgorithm::RsaEncryptionOaepSha512.max_plaintext_len(64), 0);
    }

    #[test]
    fn parse_round_trips_names() {
        for alg in [
            CipherAlgorithm::RsaEncryptionOaepSha256,
            CipherAlgorithm::RsaEncryptionOaepSha512,
            CipherAlgorithm::RsaEncryptionPkcs1,
        ] {
            assert_eq!(alg.name().parse::<CipherAlgorithm>(), Ok(alg));
        }
        assert!("rsa-sign-pss".parse::<CipherAlgorithm>().is_err());
    }
}
