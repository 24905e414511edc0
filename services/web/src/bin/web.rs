//! services/web/src/bin/web.rs

use clearcom_core::{i18n::Translator, ports::CompletionService};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use web_lib::{
    adapters::{BaasHandle, OpenAiCompletionAdapter},
    config::Config,
    error::ApiError,
    web::{build_router, events::log_auth_events, events::AuthEvents, state::AppState},
};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Load the String Tables ---
    let translator = Arc::new(Translator::embedded()?);

    // --- 3. Initialize Service Adapters ---
    // Missing credentials degrade the affected screens; they never stop startup.
    let baas = BaasHandle::from_config(
        config.supabase_url.as_deref(),
        config.supabase_anon_key.as_deref(),
        config.baas_timeout,
    );
    let completion: Option<Arc<dyn CompletionService>> =
        match OpenAiCompletionAdapter::from_api_key(
            config.openai_api_key.as_deref(),
            &config.completion_model,
        ) {
            Some(adapter) => {
                info!("Completion relay enabled with model {}", config.completion_model);
                Some(Arc::new(adapter))
            }
            None => {
                warn!("OPENAI_API_KEY is not set; text generation is disabled");
                None
            }
        };

    // --- 4. Start the Auth Event Logger ---
    let events = AuthEvents::new();
    let shutdown = CancellationToken::new();
    let logger = tokio::spawn(log_auth_events(events.clone(), shutdown.clone()));

    // --- 5. Build the Shared AppState & Router ---
    let app_state = Arc::new(AppState::new(
        config.clone(),
        baas,
        completion,
        translator,
        events,
    ));
    let app = build_router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown.clone()))
        .await?;

    shutdown.cancel();
    if let Err(e) = logger.await {
        warn!("Auth event logger ended abnormally: {}", e);
    }
    info!("Server stopped.");
    Ok(())
}

/// Resolves on Ctrl+C, or when something else cancels `shutdown`.
async fn shutdown_signal(shutdown: CancellationToken) {
    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                warn!("Failed to listen for the shutdown signal: {}", e);
                shutdown.cancelled().await;
            }
        }
        _ = shutdown.cancelled() => {}
    }
    info!("Shutdown signal received.");
}
