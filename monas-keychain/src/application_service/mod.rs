pub mod keychain_service;
