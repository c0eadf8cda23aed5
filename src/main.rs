mod announcements;
mod app;
mod auth;
mod config;
mod db;
mod error;
mod routes;
mod state;
mod users;

#[cfg(test)]
mod test_util;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "skwela_alert=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let app_state = state::AppState::init().await?;

    // Schema and default admin; failures are logged, not fatal
    db::bootstrap(app_state.store.as_ref()).await;

    if app_state.config.production {
        tracing::info!("environment: production");
    }

    let config = app_state.config.clone();
    app::serve(app::build_app(app_state), &config).await
}
