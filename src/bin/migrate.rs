use anyhow::{Context, bail};
use inventory_panel::{
    config::AppConfig,
    db::{connection_url, create_orm_conn, run_migrations},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    if !config.store_url.starts_with("postgres") {
        bail!("migrations need a postgres:// STORE_URL, got {}", config.store_url);
    }
    let url = connection_url(&config.store_url, &config.store_key).map_err(anyhow::Error::msg)?;
    let orm = create_orm_conn(&url)
        .await
        .context("could not connect to the store")?;
    run_migrations(&orm).await?;
    println!("Migrations applied");
    Ok(())
}
