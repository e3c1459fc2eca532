use kora_api::{app, config::Config, db::RestStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting kora api server...");

    dotenvy::dotenv().ok();

    let config = Config::from_env().expect("Invalid configuration");
    let addr = config.socket_addr();

    let store = RestStore::new(config.store).expect("Failed to build store client");
    tracing::info!("Store client ready.");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app(store))
        .await
        .expect("Failed to start server.");
}
