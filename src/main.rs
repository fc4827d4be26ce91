use anyhow::Context;
use localfix::advisory::AdvisoryClient;
use localfix::config::AppConfig;
use localfix::web::{router, AppState};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing; `LOG_FORMAT=json` for structured output, anything else is human-readable
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "pretty".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "localfix=info,tower_http=info".into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json().with_target(true).with_level(true))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().compact())
                .init();
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();

    let config = match AppConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("{}", e);
            std::process::exit(1);
        }
    };

    info!(
        model = %config.model,
        temperature = config.temperature,
        timeout_secs = config.timeout.as_secs(),
        legacy_png_media_type = config.legacy_png_media_type,
        max_output_tokens = ?config.max_output_tokens,
        "Configuration loaded"
    );

    let client = AdvisoryClient::from_config(&config).context("Failed to create Gemini client")?;
    let app = router(
        AppState {
            client: Arc::new(client),
        },
        config.max_upload_bytes,
    );

    let listener = tokio::net::TcpListener::bind(config.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.bind))?;

    info!("LocalFix running on http://{}", config.bind);

    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
