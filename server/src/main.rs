mod config;
mod error;
mod routes;
mod services;
mod state;

#[tokio::main]
async fn main() {
    // Loaded before the subscriber so RUST_LOG may come from .env.
    let dotenv = dotenvy::dotenv();
    tracing_subscriber::fmt::init();
    if let Err(e) = dotenv {
        if !e.not_found() {
            tracing::warn!(error = %e, "ignoring unreadable .env");
        }
    }

    let config = config::Config::from_env();
    let addr = format!("{}:{}", config.bind_addr, config.port);
    let state = state::AppState::new(config);

    // Spawn background idle-session reaper.
    let _reaper = services::reaper::spawn_reaper_task(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind");

    tracing::info!(%addr, "stencil listening");
    axum::serve(listener, app).await.expect("server failed");
}
