use std::net::SocketAddr;
use std::path::PathBuf;

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use monas_keychain::{presentation, CipherFacade, KeyStoreBackend, KeychainConfig};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = KeychainConfig::from_env()?;
    let db_path = std::env::var("MONAS_KEYCHAIN_DB").ok().map(PathBuf::from);

    let store = KeyStoreBackend::open(db_path.as_deref())?;
    match &db_path {
        Some(path) => tracing::info!("Key store: sled at {:?}", path),
        None => tracing::info!("Key store: in-memory (keys are lost on exit)"),
    }
    tracing::info!("Key identifier: {}", config.identifier);

    let app = presentation::create_router(CipherFacade::with_config(store, &config));

    let port: u16 = std::env::var("MONAS_KEYCHAIN_PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(4003);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    tracing::info!("monas-keychain server listening on http://{addr}");

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
