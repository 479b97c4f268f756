pub mod cipher_facade;
pub mod error;
pub mod key_provisioner;
pub mod port;

pub use cipher_facade::CipherFacade;
pub use error::KeychainError;
pub use key_provisioner::KeyProvisioner;
pub use port::{KeyStoreStatus, NativeError, SecureKeyStore, TransformFailure};
