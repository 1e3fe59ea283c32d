use clipforge::app::create_app;
use clipforge::config::settings::AppConfig;
use clipforge::infrastructure::ffmpeg::probe;
use clipforge::state::AppState;
use clipforge::workers::converter::spawn_workers;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::new();
    info!("starting server on port {}", config.server_port);

    let state = AppState::new(config);
    state.storage.ensure_dirs().await?;

    // The upload path re-checks per request; this just surfaces a broken
    // host at startup instead of on the first upload.
    if let Err(e) = probe::ensure_tools() {
        warn!("{} (uploads will be rejected until installed)", e);
    }

    spawn_workers(state.clone());

    let app = create_app(state.clone()).await;
    let addr = SocketAddr::from(([0, 0, 0, 0], state.config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("server running on http://{}", addr);

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await?;

    Ok(())
}
