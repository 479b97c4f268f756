use std::sync::Arc;
use axum::Router;
use crate::application_service::keychain_service::CipherFacade;
use crate::infrastructure::key_store::KeyStoreBackend;

pub mod keychain;

pub struct AppState {
    pub facade: CipherFacade<KeyStoreBackend>,
}

pub fn create_router(facade: CipherFacade<KeyStoreBackend>) -> Router {
    let state = Arc::new(AppState { facade });

    Router::new()
        .merge(keychain::routes())
        .with_state(state)
}
