use std::sync::Arc;

use anyhow::Context;

use warden_api::app::{self, services};
use warden_api::config::ApiConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    warden_observability::init();

    let config = ApiConfig::from_env()?;
    tracing::info!(
        token_lifetime_secs = config.auth.token_lifetime.num_seconds(),
        default_role = %config.default_role,
        "configuration loaded"
    );

    let services = Arc::new(services::AppServices::in_memory(&config));
    services::seed(&services, &config)
        .await
        .context("failed to seed roles")?;

    let app = app::build_app(&config, services);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
