use std::sync::Arc;

use actix_web::{App, HttpServer};
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use luminalib_recommendations::app_config::config_app;
use luminalib_recommendations::library_data::RemoteLibraryData;
use luminalib_recommendations::recommendations::RecommendationsEngine;
use luminalib_recommendations::recommendations_provider::RecommendationsProvider;
use luminalib_recommendations::sentiment::{LexiconPolarityAnalyzer, SentimentScorer};
use luminalib_recommendations::settings::Settings;
use luminalib_recommendations::summarizer::{
    DisabledSummarizer, HttpTextSummarizer, TextSummarizer,
};

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "luminalib_recommendations";

    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .expect("Failed to install OpenTelemetry tracer.");

    // Tunable via `RUST_LOG` env variable
    let env_filter = EnvFilter::try_from_default_env().unwrap_or(EnvFilter::new("info"));
    let telemetry = tracing_opentelemetry::layer().with_tracer(tracer);
    let formatting_layer = BunyanFormattingLayer::new(app_name.into(), std::io::stdout);
    let subscriber = Registry::default()
        .with(env_filter)
        .with(telemetry)
        .with(JsonStorageLayer)
        .with(formatting_layer);
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to install `tracing` subscriber.")
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    init_telemetry();
    let settings = Settings::from_env().expect("Failed to load settings");
    tracing::info!("starting HTTP server at http://0.0.0.0:{}", settings.port);

    let library_data = RemoteLibraryData::new(
        &settings.luminalib_repository_url,
        &settings.luminalib_borrows_url,
    )
    .expect("Failed to create service clients");

    let summarizer: Arc<dyn TextSummarizer> = match &settings.llm_url {
        Some(llm_url) => Arc::new(
            HttpTextSummarizer::new(
                llm_url,
                settings.llm_api_key.clone(),
                settings.llm_max_retries,
            )
            .expect("Failed to create summarizer client"),
        ),
        None => {
            tracing::warn!("LLM_URL not set, reviews summaries use the template");
            Arc::new(DisabledSummarizer)
        }
    };

    let provider = Arc::new(RecommendationsProvider::new(
        Arc::new(library_data),
        summarizer,
        RecommendationsEngine::new(SentimentScorer::new(Box::new(LexiconPolarityAnalyzer))),
    ));

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(provider.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await
}
