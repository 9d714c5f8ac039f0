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

use luminalib_repository::app_config::config_app;
use luminalib_repository::book_usage_checker::{BookUsageChecker, BorrowsBookUsageChecker};
use luminalib_repository::books_repository::{
    BookRepository, InMemoryBookRepository, PostgresBooksRepository,
    PostgresBooksRepositoryConfig,
};
use luminalib_repository::settings::Settings;

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() {
    let app_name = "luminalib_repository";

    // Spans are exported in batch to Jaeger
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

    let books_repository: Arc<dyn BookRepository> = if settings.use_in_memory_db {
        Arc::new(InMemoryBookRepository::default())
    } else {
        Arc::new(
            PostgresBooksRepository::init(PostgresBooksRepositoryConfig {
                hostname: settings.db_host.clone(),
                username: settings.db_username.clone(),
                password: settings.db_password.clone(),
            })
            .await
            .expect("Failed to init postgres"),
        )
    };

    let book_usage_checker: Arc<dyn BookUsageChecker> = Arc::new(
        BorrowsBookUsageChecker::new(&settings.luminalib_borrows_url)
            .expect("Failed to create book usage checker"),
    );

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(books_repository.clone()))
            .app_data(web::Data::new(book_usage_checker.clone()))
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind(("0.0.0.0", settings.port))?
    .run()
    .await
}
