use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use sauti_api::auth::{AppState, AppStateInner};
use sauti_api::config::Config;
use sauti_api::routes::build_router;
use sauti_providers::{GroqClient, TwilioClient};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "sauti=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let config = Config::from_env()?;

    // Init database and upload directory
    let db = sauti_db::Database::open(&config.db_path)?;
    tokio::fs::create_dir_all(&config.upload_dir).await?;

    // External providers share one HTTP client
    let http = reqwest::Client::new();
    let llm = GroqClient::new(
        http.clone(),
        config.groq_api_key.clone(),
        config.groq_model.clone(),
    );
    let messenger = TwilioClient::new(
        http,
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_from_number.clone(),
    );

    let upload_dir = config.upload_dir.clone();
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        config,
        llm: Box::new(llm),
        messenger: Box::new(messenger),
    });

    let app = build_router(state, &upload_dir);

    info!("Sauti server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
