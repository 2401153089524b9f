mod config;
mod core;
mod models;
mod routes;
mod services;

use actix_cors::Cors;
use actix_web::{error, http::StatusCode, middleware, web, App, HttpResponse, HttpServer};
use config::Settings;
use core::Matcher;
use models::ScoringWeights;
use routes::matches::AppState;
use services::{Enricher, EnrichmentClient, ReasoningCache};
use std::sync::Arc;
use tracing::{error, info, warn};

/// JSON error response for JSON payload errors
#[derive(Debug, serde::Serialize)]
pub struct JsonError {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl std::fmt::Display for JsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for JsonError {}

impl error::ResponseError for JsonError {
    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST))
            .content_type("application/json")
            .body(serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string()))
    }
}

/// Handle JSON payload errors
pub fn handle_json_payload_error(err: error::JsonPayloadError, req: &actix_web::HttpRequest) -> actix_web::Error {
    tracing::info!("JSON payload error on {}: {}", req.path(), err);
    JsonError {
        error: "invalid_json".to_string(),
        message: format!("Invalid JSON: {}", err),
        status_code: 400,
    }
    .into()
}

/// Handle query payload errors
pub fn handle_query_payload_error(err: error::QueryPayloadError, _req: &actix_web::HttpRequest) -> actix_web::Error {
    JsonError {
        error: "invalid_query".to_string(),
        message: format!("Invalid query: {}", err),
        status_code: 400,
    }
    .into()
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load .env file if present
    dotenv::dotenv().ok();

    // Initialize logging
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());

    let subscriber = tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true);

    if log_format == "pretty" {
        subscriber.pretty().init();
    } else {
        subscriber.init();
    }

    info!("Starting HomeMatch scoring service...");

    // Load configuration
    let settings = Settings::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        panic!("Configuration error: {}", e);
    });

    info!("Configuration loaded successfully");

    // Initialize enrichment client (optional - service works without it)
    let enrichment_client = if settings.enrichment.api_key.is_empty() {
        warn!("No enrichment API key configured, using template reasoning only");
        None
    } else {
        match EnrichmentClient::new(
            settings.enrichment.base_url.clone(),
            settings.enrichment.api_key.clone(),
            settings.enrichment.model.clone(),
            settings.enrichment.timeout_secs,
        ) {
            Ok(client) => {
                info!(
                    "Enrichment client initialized (model: {}, timeout: {}s)",
                    settings.enrichment.model, settings.enrichment.timeout_secs
                );
                Some(Arc::new(client))
            }
            Err(e) => {
                warn!("Failed to build enrichment client ({}), using template reasoning only", e);
                None
            }
        }
    };

    // Initialize reasoning cache
    let cache = Arc::new(ReasoningCache::new(
        settings.cache.capacity,
        settings.cache.ttl_secs,
    ));

    info!(
        "Reasoning cache initialized ({} entries, TTL: {}s)",
        settings.cache.capacity, settings.cache.ttl_secs
    );

    let enricher = Enricher::new(enrichment_client, cache, settings.enrichment.deadline_secs);

    // Initialize matcher with configured weights
    let weights = ScoringWeights {
        price: settings.scoring.weights.price,
        location: settings.scoring.weights.location,
        features: settings.scoring.weights.features,
        size: settings.scoring.weights.size,
        timeline: settings.scoring.weights.timeline,
    };

    let matcher = Matcher::new(weights);

    info!("Matcher initialized with weights: {:?}", weights);

    // Build application state
    let app_state = AppState {
        matcher,
        enricher,
        max_limit: settings.matching.max_limit,
    };

    // Configure HTTP server
    let host = settings.server.host.clone();
    let port = settings.server.port;
    let workers = settings.server.workers.unwrap_or(4);

    info!("Starting HTTP server on {}:{}", host, port);

    HttpServer::new(move || {
        let cors = Cors::permissive();

        App::new()
            .app_data(web::Data::new(app_state.clone()))
            .app_data(web::JsonConfig::default().error_handler(handle_json_payload_error))
            .app_data(web::QueryConfig::default().error_handler(handle_query_payload_error))
            .wrap(cors)
            .wrap(middleware::Logger::default())
            .wrap(middleware::Compress::default())
            .configure(routes::configure_routes)
    })
    .workers(workers)
    .bind((host, port))?
    .run()
    .await
}
