use showcase::config::ShellConfig;
use showcase::registry::WidgetRegistry;
use showcase::widgets::WidgetCatalog;
use showcase::{routes, services, state};

#[tokio::main]
async fn main() {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt::init();

    let config = ShellConfig::from_env().expect("invalid shell configuration");
    let port = config.port;

    // A duplicate or malformed widget list is fatal.
    let registry = WidgetRegistry::load(config.widgets_file.as_deref()).expect("widget registry init failed");
    tracing::info!(widgets = registry.len(), env = ?config.app_env, "widget registry loaded");

    let state = state::AppState::new(config, registry, WidgetCatalog::builtin());

    // Spawn background idle mount sweeper.
    let _sweeper = services::sweeper::spawn_sweeper_task(state.clone());

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "showcase listening");
    axum::serve(listener, app).await.expect("server failed");
}
