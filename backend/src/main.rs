use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use church_admin_backend::{create_router, initialize_backend, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!("Starting church admin back office");
    let app_state = initialize_backend(&config).await?;
    let app = create_router(app_state, &config);

    let listener = tokio::net::TcpListener::bind(config.listen).await?;
    info!("Listening on {}", config.listen);
    axum::serve(listener, app).await?;

    Ok(())
}
