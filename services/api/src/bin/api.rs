//! services/api/src/bin/api.rs

use livestock_api::{
    adapters::{
        genai::build_client, DbAdapter, HttpVisionAdapter, InMemoryDb, OpenAiAssistantAdapter,
        OpenAiReportAdapter, OpenAiValuationAdapter,
    },
    config::Config,
    error::ApiError,
    web::{build_router, AppState},
};
use livestock_core::{
    AccountStore, AnalysisStore, AssistantBuilder, HybridOrchestrator, RemoteTimeouts,
    ValuationBuilder,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to the Store & Run Migrations ---
    let accounts: Arc<dyn AccountStore>;
    let analyses: Arc<dyn AnalysisStore>;
    if config.uses_memory_store() {
        warn!("Using the in-memory store; data will not survive a restart.");
        let db = Arc::new(InMemoryDb::new());
        accounts = db.clone();
        analyses = db;
    } else {
        info!("Connecting to database...");
        let db_pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(&config.database_url)
            .await?;
        let db_adapter = Arc::new(DbAdapter::new(db_pool));
        info!("Running database migrations...");
        db_adapter.run_migrations().await?;
        info!("Database migrations complete.");
        accounts = db_adapter.clone();
        analyses = db_adapter;
    }

    // --- 3. Initialize Service Adapters ---
    let genai_client = build_client(&config.genai.api_key, config.genai.api_base.as_deref());
    let report_adapter = Arc::new(OpenAiReportAdapter::new(
        genai_client.clone(),
        config.genai.report_model.clone(),
    ));
    let valuation_adapter = Arc::new(OpenAiValuationAdapter::new(
        genai_client.clone(),
        config.genai.valuation_model.clone(),
    ));
    let assistant_adapter = Arc::new(OpenAiAssistantAdapter::new(
        genai_client,
        config.genai.assistant_model.clone(),
    ));

    let vision_client = reqwest::Client::builder()
        .timeout(config.vision_timeout)
        .build()?;
    let vision_adapter = Arc::new(HttpVisionAdapter::new(
        vision_client,
        &config.vision_service_url,
    ));

    let timeouts = RemoteTimeouts {
        vision: config.vision_timeout,
        generation: config.generation_timeout,
    };

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        config: config.clone(),
        accounts,
        analyses: analyses.clone(),
        orchestrator: HybridOrchestrator::new(vision_adapter, report_adapter, analyses, timeouts),
        valuations: ValuationBuilder::new(valuation_adapter, config.generation_timeout),
        assistant: AssistantBuilder::new(assistant_adapter, config.generation_timeout),
    });

    // --- 5. Create the Web Router ---
    let app = build_router(app_state);

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
