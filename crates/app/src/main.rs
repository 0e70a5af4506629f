use std::sync::Arc;

use engine::{Engine, RestStore};
use server::ServerConfig;

mod settings;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let settings = settings::Settings::new()?;

    tracing_subscriber::fmt()
        .with_env_filter(format!(
            "shopbook={level},server={level},engine={level}",
            level = settings.app.level
        ))
        .init();

    let store = match RestStore::new(&settings.store.url, &settings.store.service_key) {
        Ok(store) => store,
        Err(err) => {
            tracing::error!("failed to initialize the data gateway client: {err}");
            return Ok(());
        }
    };
    let engine = Engine::new(Arc::new(store));

    let bind = settings
        .server
        .bind
        .unwrap_or_else(|| "127.0.0.1".to_string());
    let addr = format!("{}:{}", bind, settings.server.port);
    let listener = match tokio::net::TcpListener::bind(addr).await {
        Ok(listener) => listener,
        Err(err) => {
            tracing::error!("failed to bind server listener: {err}");
            return Ok(());
        }
    };

    let config = ServerConfig {
        owner_email: settings.store.owner_email,
        origins: settings.server.origins,
    };
    if let Err(err) = server::run_with_listener(engine, config, listener).await {
        tracing::error!("server failed: {err}");
    }

    Ok(())
}
