use crate::application_service::keychain_service::error::KeychainError;
use crate::application_service::keychain_service::key_provisioner::KeyProvisioner;
use crate::application_service::keychain_service::port::{SecureKeyStore, TransformFailure};
use crate::config::KeychainConfig;
use crate::domain::cipher::{CipherAlgorithm, KeyOperation};

/// 1 組の鍵ペアに束縛された暗号化 / 復号のユースケース。
///
/// アルゴリズムは構築時に固定され、呼び出しごとには変えられない。
/// 変換の前に必ずストアの対応状況を確認し、失敗はすべて `KeychainError` として返す。
pub struct CipherFacade<S: SecureKeyStore> {
    provisioner: KeyProvisioner<S>,
    algorithm: CipherAlgorithm,
}

impl<S: SecureKeyStore> CipherFacade<S> {
    pub fn new(store: S) -> Self {
        Self::with_config(store, &KeychainConfig::default())
    }

    pub fn with_config(store: S, config: &KeychainConfig) -> Self {
        Self {
            provisioner: KeyProvisioner::new(store, config),
            algorithm: config.algorithm,
        }
    }

    pub fn algorithm(&self) -> CipherAlgorithm {
        self.algorithm
    }

    pub fn provisioner(&self) -> &KeyProvisioner<S> {
        &self.provisioner
    }

    pub fn public_key(&self) -> Result<S::Key, KeychainError> {
        self.provisioner.public_key()
    }

    pub fn encrypt_text(&self, text: &str) -> Result<Vec<u8>, KeychainError> {
        self.encrypt(text.as_bytes())
    }

    /// 公開鍵で平文を暗号化する。平文は UTF-8 のテキストでなければならない。
    pub fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>, KeychainError> {
        let key = self.provisioner.public_key()?;
        self.ensure_supported(&key, KeyOperation::Encrypt)?;

        if std::str::from_utf8(plaintext).is_err() {
            return Err(KeychainError::UnsupportedInput);
        }

        self.transform(&key, KeyOperation::Encrypt, plaintext)
    }

    /// 秘密鍵で暗号文を復号する。
    pub fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>, KeychainError> {
        let key = self.provisioner.private_key()?;
        self.ensure_supported(&key, KeyOperation::Decrypt)?;

        self.transform(&key, KeyOperation::Decrypt, ciphertext)
    }

    /// キャッシュしている鍵ハンドルを手放す。
    pub fn release(&self) {
        self.provisioner.release();
    }

    fn ensure_supported(&self, key: &S::Key, operation: KeyOperation) -> Result<(), KeychainError> {
        if self
            .provisioner
            .store()
            .supports(key, operation, self.algorithm)
        {
            Ok(())
        } else {
            Err(KeychainError::UnsupportedAlgorithm {
                algorithm: self.algorithm,
                operation,
            })
        }
    }

    fn transform(
        &self,
        key: &S::Key,
        operation: KeyOperation,
        input: &[u8],
    ) -> Result<Vec<u8>, KeychainError> {
        self.provisioner
            .store()
            .transform(key, operation, self.algorithm, input)
            .map_err(|failure| match failure {
                TransformFailure::Cause(cause) => KeychainError::Forwarded(cause),
                TransformFailure::Unreported => KeychainError::UnknownFailure,
            })
    }
}

impl<S: SecureKeyStore> Drop for CipherFacade<S> {
    fn drop(&mut self) {
        self.release();
    }
}
