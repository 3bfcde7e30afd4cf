use std::net::SocketAddr;

use anyhow::Context;

use medtrack_server::{
    config::AppConfig, db::connection::connect, logging::init_tracing, routes::app,
    services::ServiceContext, state::AppState,
};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        tracing::error!("server failed: {err:?}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    let cfg = AppConfig::from_env().context("failed to load config")?;
    init_tracing(&cfg.logging);

    let db_cfg = cfg
        .database
        .clone()
        .context("database configuration is required")?;
    let db = connect(&db_cfg).await?;

    let state = AppState::new(cfg, db);
    tracing::info!(
        cost = state.credentials.password_hash_cost(),
        "password hashing configured"
    );

    ServiceContext::from_state(state.as_ref())
        .auth(&state.credentials)
        .seed_admin(&state.config.auth)
        .await?;

    let addr: SocketAddr = format!("{}:{}", state.config.general.host, state.config.general.port)
        .parse()
        .context("invalid host/port")?;
    let router = app(state);

    tracing::info!("listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
