use crate::application_service::keychain_service::port::{KeyStoreStatus, NativeError};
use crate::domain::cipher::{CipherAlgorithm, KeyOperation};

/// キーチェーン操作の失敗。いずれも呼び出し元の操作を終了させ、内部での再試行は行わない。
#[derive(Debug, thiserror::Error)]
pub enum KeychainError {
    /// ストアが新しい鍵ペアの生成を拒否した。
    #[error("failed to generate key pair: {0}")]
    KeyGeneration(#[source] KeyStoreStatus),
    /// 「見つからない」以外の理由で鍵の検索が失敗した。
    #[error("key store failure (status {code}): {0}", code = .0.code())]
    StoreFailure(KeyStoreStatus),
    #[error("no public key available")]
    NoPublicKey,
    #[error("no private key available")]
    NoPrivateKey,
    #[error("algorithm {algorithm} is not supported for {operation}")]
    UnsupportedAlgorithm {
        algorithm: CipherAlgorithm,
        operation: KeyOperation,
    },
    #[error("input is not valid UTF-8 text")]
    UnsupportedInput,
    #[error("{0}")]
    Forwarded(#[source] NativeError),
    #[error("cipher operation failed without a reported cause")]
    UnknownFailure,
}

#[cfg(test)]
mod keychain_error_tests {
    use super::*;

    #[test]
    fn store_failure_message_carries_status_code() {
        let err = KeychainError::StoreFailure(KeyStoreStatus::Storage("disk full".into()));
        assert_eq!(
            err.to_string(),
            "key store failure (status -36): storage error: disk full"
        );
    }

    #[test]
    fn unsupported_algorithm_message_names_direction() {
        let err = KeychainError::UnsupportedAlgorithm {
            algorithm: CipherAlgorithm::RsaEncryptionOaepSha512,
            operation: KeyOperation::Decrypt,
        };
        assert_eq!(
            err.to_string(),
            "algorithm rsa-encryption-oaep-sha512 is not supported for decrypt"
        );
    }
}
