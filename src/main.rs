use axum::{
    routing::{get, post},
    Router,
};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use dotenvy::dotenv;
use std::sync::Arc;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

mod api {
    pub mod spaces;
    pub mod speech;
}
mod manifest {
    pub mod assembler;
    pub mod pipeline;
    pub mod publisher;
    pub mod runner;
    pub mod timectx;
    pub mod trigger;
}
mod handlers {
    pub mod manifest_handlers;
}
mod jobs {
    pub mod scheduler;
}
mod models {
    pub mod reminder_models;
}
mod repositories {
    pub mod reminder_repository;
}
mod config;
mod error;
mod schema;

use api::spaces::{ObjectStore, SpacesClient};
use api::speech::{AzureSpeechClient, SpeechClient};
use config::Config;
use handlers::manifest_handlers;
use repositories::reminder_repository::ReminderRepository;

pub type DbPool = r2d2::Pool<ConnectionManager<SqliteConnection>>;
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!();

pub struct AppState {
    pub repository: Arc<ReminderRepository>,
    pub speech: Arc<dyn SpeechClient>,
    pub store: Arc<dyn ObjectStore>,
}

async fn health_check() -> &'static str {
    "OK"
}

#[tokio::main]
async fn main() {
    dotenv().ok();
    use tracing_subscriber::{fmt, EnvFilter};
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,daychime=debug"));
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(true)
        .with_line_number(true)
        .init();

    // Validate all required settings before touching anything external.
    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            std::process::exit(1);
        }
    };

    let manager = ConnectionManager::<SqliteConnection>::new(&config.database_url);
    let pool = r2d2::Pool::builder()
        .build(manager)
        .expect("Failed to create pool");
    pool.get()
        .expect("Failed to get DB connection")
        .run_pending_migrations(MIGRATIONS)
        .expect("Failed to run migrations");

    let state = Arc::new(AppState {
        repository: Arc::new(ReminderRepository::new(pool.clone())),
        speech: Arc::new(AzureSpeechClient::new(&config)),
        store: Arc::new(SpacesClient::new(&config)),
    });

    let app = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/manifest/run", post(manifest_handlers::run_manifests))
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .with_state(state.clone());

    let state_for_scheduler = state.clone();
    tokio::spawn(async move {
        jobs::scheduler::start_scheduler(state_for_scheduler).await;
    });

    use tokio::net::TcpListener;
    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(3000);
    tracing::info!("Starting server on port {}", port);
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port))
        .await
        .expect("Failed to bind port");
    axum::serve(listener, app.into_make_service())
        .await
        .expect("Server error");
}
