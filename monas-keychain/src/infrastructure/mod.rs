pub mod key_store;
pub mod rsa_key;

pub use key_store::{InMemoryKeyStore, KeyStoreBackend, SledKeyStore};
pub use rsa_key::RsaKeyHandle;
