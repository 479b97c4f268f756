pub mod application_service;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

#[cfg(test)]
pub(crate) mod test_utils;

pub use application_service::keychain_service::{
    CipherFacade, KeyProvisioner, KeyStoreStatus, KeychainError, NativeError, SecureKeyStore,
    TransformFailure,
};
pub use config::{ConfigError, KeychainConfig};
pub use domain::{
    cipher::{CipherAlgorithm, KeyOperation},
    key_attributes::{KeyAttributes, KeyQuery, KeyType},
    key_identifier::KeyIdentifier,
    key_pair::KeyPair,
};
pub use infrastructure::{InMemoryKeyStore, KeyStoreBackend, RsaKeyHandle, SledKeyStore};
