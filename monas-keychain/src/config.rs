//! Keychain configuration

use crate::domain::cipher::{CipherAlgorithm, UnknownAlgorithm};
use crate::domain::key_identifier::KeyIdentifier;

/// Configuration for the key pair managed by a facade
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeychainConfig {
    /// Tag naming the key pair in the store
    pub identifier: KeyIdentifier,
    /// RSA modulus size for newly generated keys
    pub key_size_bits: usize,
    /// Algorithm used for every encrypt/decrypt call
    pub algorithm: CipherAlgorithm,
    /// Whether generated keys survive a process restart
    pub permanent: bool,
}

impl KeychainConfig {
    pub const DEFAULT_IDENTIFIER: &'static str = "com.monas.keychain.default";
    pub const DEFAULT_KEY_SIZE_BITS: usize = 2048;

    pub const ENV_TAG: &'static str = "MONAS_KEYCHAIN_TAG";
    pub const ENV_KEY_SIZE: &'static str = "MONAS_KEYCHAIN_KEY_SIZE";
    pub const ENV_ALGORITHM: &'static str = "MONAS_KEYCHAIN_ALGORITHM";

    pub fn with_identifier(self, identifier: KeyIdentifier) -> Self {
        Self { identifier, ..self }
    }

    /// Reads overrides from `MONAS_KEYCHAIN_*` environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(tag) = lookup(Self::ENV_TAG).filter(|s| !s.is_empty()) {
            config.identifier = KeyIdentifier::new(tag);
        }
        if let Some(size) = lookup(Self::ENV_KEY_SIZE) {
            config.key_size_bits = size
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidKeySize(size))?;
        }
        if let Some(algorithm) = lookup(Self::ENV_ALGORITHM) {
            config.algorithm = algorithm.trim().parse()?;
        }

        Ok(config)
    }
}

impl Default for KeychainConfig {
    fn default() -> Self {
        Self {
            identifier: KeyIdentifier::from(Self::DEFAULT_IDENTIFIER),
            key_size_bits: Self::DEFAULT_KEY_SIZE_BITS,
            algorithm: CipherAlgorithm::RsaEncryptionOaepSha512,
            permanent: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid key size: {0}")]
    InvalidKeySize(String),
    #[error(transparent)]
    InvalidAlgorithm(#[from] UnknownAlgorithm),
}
