use std::fmt;
use std::sync::Arc;

use rand_core::OsRng;
use rsa::pkcs8::{DecodePrivateKey, EncodePrivateKey, EncodePublicKey};
use rsa::traits::PublicKeyParts;
use rsa::{Oaep, Pkcs1v15Encrypt, RsaPrivateKey, RsaPublicKey};
use sha2::{Sha256, Sha512};

use crate::application_service::keychain_service::port::{
    KeyStoreStatus, NativeError, TransformFailure,
};
use crate::domain::cipher::{CipherAlgorithm, KeyOperation};

/// ストアが保持する RSA 鍵への参照。
///
/// 複製しても鍵素材は共有されるだけで、コピーは作られない。
/// 暗号化は公開鍵、復号は秘密鍵のハンドルでのみ行える。
#[derive(Clone, PartialEq)]
pub enum RsaKeyHandle {
    Private(Arc<RsaPrivateKey>),
    Public(Arc<RsaPublicKey>),
}

impl RsaKeyHandle {
    pub const MIN_KEY_SIZE_BITS: usize = 1024;
    pub const MAX_KEY_SIZE_BITS: usize = 16384;

    /// 新しい秘密鍵を生成する。
    pub fn generate(key_size_bits: usize) -> Result<Self, KeyStoreStatus> {
        if !(Self::MIN_KEY_SIZE_BITS..=Self::MAX_KEY_SIZE_BITS).contains(&key_size_bits)
            || key_size_bits % 8 != 0
        {
            return Err(KeyStoreStatus::InvalidParameters(format!(
                "unsupported RSA key size: {key_size_bits}"
            )));
        }

        let private_key = RsaPrivateKey::new(&mut OsRng, key_size_bits)
            .map_err(|e| KeyStoreStatus::Generation(e.to_string()))?;
        Ok(RsaKeyHandle::Private(Arc::new(private_key)))
    }

    pub fn from_pkcs8_der(der: &[u8]) -> Result<Self, KeyStoreStatus> {
        let private_key =
            RsaPrivateKey::from_pkcs8_der(der).map_err(|e| KeyStoreStatus::Decode(e.to_string()))?;
        Ok(RsaKeyHandle::Private(Arc::new(private_key)))
    }

    /// 秘密鍵を PKCS#8 DER で書き出す。公開鍵のハンドルには使えない。
    pub fn to_pkcs8_der(&self) -> Result<Vec<u8>, KeyStoreStatus> {
        match self {
            RsaKeyHandle::Private(key) => key
                .to_pkcs8_der()
                .map(|doc| doc.as_bytes().to_vec())
                .map_err(|e| KeyStoreStatus::Decode(e.to_string())),
            RsaKeyHandle::Public(_) => Err(KeyStoreStatus::InvalidParameters(
                "public key handle has no private material".to_string(),
            )),
        }
    }

    /// 公開鍵を SubjectPublicKeyInfo DER で書き出す。
    pub fn public_key_der(&self) -> Result<Vec<u8>, KeyStoreStatus> {
        let der = match self {
            RsaKeyHandle::Private(key) => key.to_public_key().to_public_key_der(),
            RsaKeyHandle::Public(key) => key.to_public_key_der(),
        };
        der.map(|doc| doc.as_bytes().to_vec())
            .map_err(|e| KeyStoreStatus::Decode(e.to_string()))
    }

    pub fn is_private(&self) -> bool {
        matches!(self, RsaKeyHandle::Private(_))
    }

    /// 法のバイト長。
    pub fn modulus_len(&self) -> usize {
        match self {
            RsaKeyHandle::Private(key) => key.size(),
            RsaKeyHandle::Public(key) => key.size(),
        }
    }

    pub fn to_public(&self) -> Option<Self> {
        match self {
            RsaKeyHandle::Private(key) => {
                Some(RsaKeyHandle::Public(Arc::new(key.to_public_key())))
            }
            RsaKeyHandle::Public(_) => None,
        }
    }

    pub fn supports(&self, operation: KeyOperation, algorithm: CipherAlgorithm) -> bool {
        let direction_ok = matches!(
            (self, operation),
            (RsaKeyHandle::Public(_), KeyOperation::Encrypt)
                | (RsaKeyHandle::Private(_), KeyOperation::Decrypt)
        );
        direction_ok && algorithm.max_plaintext_len(self.modulus_len()) > 0
    }

    pub fn transform(
        &self,
        operation: KeyOperation,
        algorithm: CipherAlgorithm,
        input: &[u8],
    ) -> Result<Vec<u8>, TransformFailure> {
        let result = match (self, operation) {
            (RsaKeyHandle::Public(key), KeyOperation::Encrypt) => {
                let mut rng = OsRng;
                match algorithm {
                    CipherAlgorithm::RsaEncryptionOaepSha256 => {
                        key.encrypt(&mut rng, Oaep::new::<Sha256>(), input)
                    }
                    CipherAlgorithm::RsaEncryptionOaepSha512 => {
                        key.encrypt(&mut rng, Oaep::new::<Sha512>(), input)
                    }
                    CipherAlgorithm::RsaEncryptionPkcs1 => {
                        key.encrypt(&mut rng, Pkcs1v15Encrypt, input)
                    }
                }
            }
            (RsaKeyHandle::Private(key), KeyOperation::Decrypt) => match algorithm {
                CipherAlgorithm::RsaEncryptionOaepSha256 => {
                    key.decrypt(Oaep::new::<Sha256>(), input)
                }
                CipherAlgorithm::RsaEncryptionOaepSha512 => {
                    key.decrypt(Oaep::new::<Sha512>(), input)
                }
                CipherAlgorithm::RsaEncryptionPkcs1 => key.decrypt(Pkcs1v15Encrypt, input),
            },
            _ => return Err(TransformFailure::Unreported),
        };

        result.map_err(|e| TransformFailure::Cause(NativeError::from_source(e)))
    }
}

impl fmt::Debug for RsaKeyHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_private() { "Private" } else { "Public" };
        write!(f, "RsaKeyHandle::{kind}({} bits)", self.modulus_len() * 8)
    }
}
