use es_driver::domain::{User, USER_TYPE};
use es_driver::infrastructure::{AppConfig, ElasticsearchStore};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Drops the configured index if present and recreates it with the user mapping.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "init_index=info,es_driver=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    let store = ElasticsearchStore::from_config(&config)?;
    let index = &config.elasticsearch()?.index;

    if store.delete_index(index).await? {
        info!(index = %index, "old index deleted");
    } else {
        info!(index = %index, "no previous index");
    }

    store.create_index(index, USER_TYPE, User::mapping()).await?;
    info!(index = %index, "index created");

    Ok(())
}
