use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    routing::{get, post},
    Router,
};
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use base64::Engine;
use serde::{Deserialize, Serialize};

use crate::application_service::keychain_service::KeychainError;

use super::AppState;

#[derive(Deserialize)]
pub struct EncryptRequest {
    pub plaintext: String,
}

#[derive(Serialize)]
pub struct EncryptResponse {
    pub algorithm: String,
    pub ciphertext_base64: String,
}

#[derive(Deserialize)]
pub struct DecryptRequest {
    pub ciphertext_base64: String,
}

#[derive(Serialize)]
pub struct DecryptResponse {
    pub plaintext_base64: String,
    pub plaintext: Option<String>,
}

#[derive(Serialize)]
pub struct PublicKeyResponse {
    pub algorithm: String,
    pub public_key_der_base64: String,
}

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/keychain/encrypt", post(encrypt))
        .route("/keychain/decrypt", post(decrypt))
        .route("/keychain/public-key", get(public_key))
}

fn error_status(e: &KeychainError) -> StatusCode {
    match e {
        KeychainError::UnsupportedInput
        | KeychainError::Forwarded(_)
        | KeychainError::UnknownFailure => StatusCode::BAD_REQUEST,
        KeychainError::UnsupportedAlgorithm { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        KeychainError::KeyGeneration(_)
        | KeychainError::StoreFailure(_)
        | KeychainError::NoPublicKey
        | KeychainError::NoPrivateKey => StatusCode::SERVICE_UNAVAILABLE,
    }
}

fn to_http_error(e: KeychainError) -> (StatusCode, String) {
    (error_status(&e), e.to_string())
}

/// ブロッキングする鍵ストア処理を tokio のワーカーから外して実行する。
async fn run_blocking<T, F>(state: Arc<AppState>, f: F) -> Result<T, (StatusCode, String)>
where
    T: Send + 'static,
    F: FnOnce(&AppState) -> Result<T, KeychainError> + Send + 'static,
{
    tokio::task::spawn_blocking(move || f(state.as_ref()))
        .await
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?
        .map_err(to_http_error)
}

async fn encrypt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<EncryptRequest>,
) -> Result<Json<EncryptResponse>, (StatusCode, String)> {
    let algorithm = state.facade.algorithm().to_string();
    let ciphertext =
        run_blocking(state, move |state| state.facade.encrypt_text(&req.plaintext)).await?;

    Ok(Json(EncryptResponse {
        algorithm,
        ciphertext_base64: BASE64_STANDARD.encode(ciphertext),
    }))
}

async fn decrypt(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DecryptRequest>,
) -> Result<Json<DecryptResponse>, (StatusCode, String)> {
    let ciphertext = BASE64_STANDARD.decode(&req.ciphertext_base64).map_err(|e| {
        (
            StatusCode::BAD_REQUEST,
            format!("invalid ciphertext_base64: {e}"),
        )
    })?;

    let plaintext = run_blocking(state, move |state| state.facade.decrypt(&ciphertext)).await?;

    Ok(Json(DecryptResponse {
        plaintext_base64: BASE64_STANDARD.encode(&plaintext),
        plaintext: String::from_utf8(plaintext).ok(),
    }))
}

async fn public_key(
    State(state): State<Arc<AppState>>,
) -> Result<Json<PublicKeyResponse>, (StatusCode, String)> {
    let algorithm = state.facade.algorithm().to_string();
    let key = run_blocking(state, |state| state.facade.public_key()).await?;
    let der = key
        .public_key_der()
        .map_err(|e| (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))?;

    Ok(Json(PublicKeyResponse {
        algorithm,
        public_key_der_base64: BASE64_STANDARD.encode(der),
    }))
}
