use es_driver::api::{create_router, AppState};
use es_driver::application::PersistenceService;
use es_driver::infrastructure::{AppConfig, ElasticsearchStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api=debug,es_driver=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let store = Arc::new(ElasticsearchStore::from_config(&config)?);
    let index = config.elasticsearch()?.index.clone();
    info!(index = %index, "Elasticsearch store initialized");

    let persistence = Arc::new(PersistenceService::new(store));
    let addr = SocketAddr::new(config.server.host.parse()?, config.server.port);

    let state = AppState::new(persistence, index, config);
    let app = create_router(state);

    info!("API server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
