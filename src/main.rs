use listener_console::{
    AppState,
    api_client::{ApiState, HttpConsoleApi},
    config::{AppConfig, Env},
    console::Console,
    create_router,
    storage::{FileStorage, StorageState},
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Loads configuration, initialises logging, builds the console over file
/// storage and serves the shell.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast in production)
    dotenv::dotenv().ok();
    let config = AppConfig::load();

    // 2. Logging Filter Setup
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "listener_console=debug,tower_http=info".into());

    // 3. Pretty output locally, JSON in production
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Console starting in {:?} mode", config.env);

    // 4. Persistent storage for the token and tag views
    let storage = Arc::new(FileStorage::new(&config.storage_dir)) as StorageState;
    tracing::info!(dir = %config.storage_dir, "using file storage");

    // 5. Console core: route table, stores, navigation controller
    let console = Arc::new(Console::new(&config, storage));

    // 6. Backend client, sharing the session so rejected tokens are reset
    let api = Arc::new(HttpConsoleApi::new(
        &config.api_base_url,
        &config.login_url,
        console.session.clone(),
    )) as ApiState;

    let listen_addr = config.listen_addr.clone();
    let app_state = AppState {
        console,
        api,
        config,
    };

    // 7. Router and Server Startup
    let app = create_router(app_state);

    let listener = TcpListener::bind(&listen_addr)
        .await
        .expect("FATAL: Failed to bind CONSOLE_LISTEN_ADDR.");

    tracing::info!("Listening on {}", listen_addr);
    tracing::info!("API Documentation (Swagger UI) available at: http://{}/swagger-ui", listen_addr);

    axum::serve(listener, app).await.unwrap();
}
