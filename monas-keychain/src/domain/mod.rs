pub mod cipher;
pub mod key_attributes;
pub mod key_identifier;
pub mod key_pair;
