use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use serde::Serialize;
use sqlx::postgres::PgPoolOptions;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod config;
mod error;
mod identity;
mod middleware;
mod pipeline;
mod queue;
mod routes;
mod secrets;
mod slack;
mod state;
mod stories;
#[cfg(test)]
mod testing;

use config::WebhookConfig;
use identity::PgIdentityStore;
use pipeline::WebhookPipeline;
use queue::PgJobQueue;
use secrets::{EnvSecretStore, SecretStore};
use slack::{SlackNotifier, WebhookTarget};
use stories::PgStoryStore;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Intake API",
        version = "0.1.0",
        description = "Receives signed onboarding-form deliveries and turns them into workout prompts."
    ),
    paths(routes::health::health_check, routes::webhooks::receive_typeform),
    components(schemas(HealthResponse, intake_core::error::ApiError))
)]
struct ApiDoc;

#[derive(Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[tokio::main]
async fn main() {
    // Load .env if present (dev only)
    let _ = dotenvy::dotenv();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "intake_api=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    let config = match WebhookConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "Invalid configuration");
            std::process::exit(1);
        }
    };

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .expect("Failed to connect to database");

    sqlx::migrate!("../migrations")
        .run(&pool)
        .await
        .expect("Failed to run migrations");

    let secrets: Arc<dyn SecretStore> = Arc::new(EnvSecretStore);
    let http = reqwest::Client::builder()
        .timeout(std::time::Duration::from_secs(10))
        .build()
        .expect("Failed to build HTTP client");

    let alert_target = match &config.alert_webhook_url {
        Some(url) => WebhookTarget::Fixed(url.clone()),
        None => WebhookTarget::Secret(secrets.clone()),
    };

    let pipeline = WebhookPipeline {
        secrets: secrets.clone(),
        identity: Arc::new(PgIdentityStore::new(pool.clone())),
        stories: Arc::new(PgStoryStore::new(pool.clone())),
        notifier: Arc::new(SlackNotifier::new(
            http.clone(),
            WebhookTarget::Secret(secrets.clone()),
        )),
        alerts: Arc::new(SlackNotifier::new(http, alert_target)),
        queue: Arc::new(PgJobQueue::new(pool.clone())),
    };

    let app_state = state::AppState {
        db: pool,
        pipeline: Arc::new(pipeline),
    };

    let app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .merge(routes::health::router())
        .merge(routes::webhooks::router().layer(middleware::rate_limit::webhook_layer()))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .option_layer(config.require_https.then(|| {
                    axum::middleware::from_fn(middleware::https::require_https)
                }))
                .layer(axum::middleware::from_fn(middleware::security_headers::apply)),
        )
        .with_state(app_state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Intake API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind listener");
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Server error");
}
