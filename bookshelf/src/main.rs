use std::sync::Arc;

use actix_web::{App, HttpServer};
use anyhow::Context;
use opentelemetry::global;
use opentelemetry_sdk::propagation::TraceContextPropagator;
use opentelemetry_sdk::runtime::TokioCurrentThread;
use paperclip::actix::{web, OpenApiExt};
use tracing_actix_web::TracingLogger;
use tracing_bunyan_formatter::{BunyanFormattingLayer, JsonStorageLayer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::{EnvFilter, Registry};

use bookshelf::app_config::{config_app, json_config, path_config};
use bookshelf::auth::Credentials;
use bookshelf::books_repository::{
    BookRepository, InMemoryBookRepository, PostgresBooksRepository,
    PostgresBooksRepositoryConfig, SqliteBooksRepository, SqliteBooksRepositoryConfig,
};
use bookshelf::settings::{Settings, StorageBackend};

// Based on https://github.com/LukeMathWalker/tracing-actix-web/blob/main/examples/opentelemetry/src/main.rs#L15
fn init_telemetry() -> anyhow::Result<()> {
    let app_name = "bookshelf";

    // Start a new Jaeger trace pipeline.
    // Spans are exported in batch - recommended setup for a production application.
    global::set_text_map_propagator(TraceContextPropagator::new());
    #[allow(deprecated)]
    let tracer = opentelemetry_jaeger::new_agent_pipeline()
        .with_service_name(app_name)
        .install_batch(TokioCurrentThread)
        .context("Failed to install OpenTelemetry tracer.")?;

    // Filter based on level - trace, debug, info, warn, error
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
        .context("Failed to install `tracing` subscriber.")
}

async fn init_books_repository(
    settings: &Settings,
) -> anyhow::Result<Arc<dyn BookRepository + Send + Sync>> {
    Ok(match settings.backend() {
        StorageBackend::InMemory => Arc::new(InMemoryBookRepository::default()),
        StorageBackend::Sqlite => Arc::new(
            SqliteBooksRepository::init(SqliteBooksRepositoryConfig {
                path: settings.sqlite_path.clone(),
            })
            .context("Failed to init sqlite")?,
        ),
        StorageBackend::Postgres => Arc::new(
            PostgresBooksRepository::init(PostgresBooksRepositoryConfig {
                hostname: settings.db_host.clone(),
                username: settings.db_username.clone(),
                password: settings.db_password.clone(),
            })
            .await
            .context("Failed to init postgres")?,
        ),
    })
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_telemetry()?;

    let settings = Settings::load().context("Failed to load settings")?;
    tracing::info!(
        "starting HTTP server at http://{}:{} with {:?} storage",
        settings.host,
        settings.port,
        settings.backend()
    );

    let books_repository = init_books_repository(&settings).await?;
    let credentials = web::Data::new(Credentials::default());

    HttpServer::new(move || {
        App::new()
            .wrap_api()
            .app_data(web::Data::new(books_repository.clone()))
            .app_data(credentials.clone())
            .app_data(json_config())
            .app_data(path_config())
            .wrap(TracingLogger::default())
            .configure(config_app)
            .with_json_spec_at("/apispec/v2")
            .build()
    })
    .bind((settings.host.as_str(), settings.port))?
    .run()
    .await?;

    global::shutdown_tracer_provider();
    Ok(())
}
