mod app;
mod auth;
mod config;
mod db;
mod error;
mod extract;
mod posts;
mod redirect;
mod state;
mod validation;
mod views;

#[cfg(test)]
mod testing;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "blogpost=debug,axum=info,tower_http=info,sqlx=warn".to_string());
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
    app_state.migrate().await?;
    tracing::info!(
        database_url = %app_state.config.database_url,
        password_scheme = ?app_state.config.password_scheme,
        "database ready"
    );

    let app = app::build_app(app_state);
    app::serve(app).await
}
