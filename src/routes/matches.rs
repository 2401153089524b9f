use actix_web::{web, HttpResponse, Responder};
use std::collections::HashMap;
use validator::Validate;

use crate::core::Matcher;
use crate::models::{
    ErrorResponse, HealthResponse, PropertyListing, RankMatchesRequest, RankMatchesResponse,
    ScoreMatchRequest,
};
use crate::services::Enricher;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub matcher: Matcher,
    pub enricher: Enricher,
    pub max_limit: u16,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check))
        .route("/matches/score", web::post().to(score_match))
        .route("/matches/rank", web::post().to(rank_matches));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let enrichment = if state.enricher.enabled() {
        "enabled"
    } else {
        "disabled"
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
        enrichment: enrichment.to_string(),
    })
}

/// Score a single buyer/property pair
///
/// POST /api/v1/matches/score
///
/// Request body:
/// ```json
/// {
///   "buyer": { ... },
///   "property": { ... }
/// }
/// ```
async fn score_match(
    state: web::Data<AppState>,
    req: web::Json<ScoreMatchRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for score request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    let score = state.matcher.score(&req.buyer, &req.property);
    let score = state.enricher.enrich(&req.buyer, &req.property, score).await;

    tracing::info!(
        "Scored property {} for buyer {}: {} ({:?})",
        req.property.id,
        req.buyer.id,
        score.overall_score,
        score.recommended_action
    );

    HttpResponse::Ok().json(score)
}

/// Rank candidate properties for a buyer
///
/// POST /api/v1/matches/rank
///
/// Request body:
/// ```json
/// {
///   "buyer": { ... },
///   "properties": [ ... ],
///   "limit": 10
/// }
/// ```
async fn rank_matches(
    state: web::Data<AppState>,
    req: web::Json<RankMatchesRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for rank request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse {
            error: "Validation failed".to_string(),
            message: errors.to_string(),
            status_code: 400,
        });
    }

    // Cap limit to prevent excessive enrichment fan-out
    let limit = req.limit.min(state.max_limit) as usize;

    tracing::info!(
        "Ranking {} properties for buyer {}, limit {}",
        req.properties.len(),
        req.buyer.id,
        limit
    );

    let result = state.matcher.rank_matches(&req.buyer, &req.properties, limit);

    // Pair each ranked score back with its listing for the enrichment prompt
    let by_id: HashMap<&str, &PropertyListing> = req
        .properties
        .iter()
        .map(|p| (p.id.as_str(), p))
        .collect();

    let pairs: Vec<(PropertyListing, _)> = result
        .matches
        .into_iter()
        .filter_map(|score| {
            by_id
                .get(score.property_id.as_str())
                .map(|p| ((*p).clone(), score))
        })
        .collect();

    let matches = state.enricher.enrich_all(&req.buyer, pairs).await;

    let response = RankMatchesResponse {
        count: matches.len(),
        matches,
        total_candidates: result.total_candidates,
    };

    tracing::info!(
        "Returning {} matches for buyer {} (from {} candidates)",
        response.count,
        req.buyer.id,
        response.total_candidates
    );

    HttpResponse::Ok().json(response)
}
