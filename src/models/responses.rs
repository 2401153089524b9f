use serde::{Deserialize, Serialize};

use crate::models::domain::CompatibilityScore;

/// Response for the rank matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankMatchesResponse {
    pub matches: Vec<CompatibilityScore>,
    pub count: usize,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub enrichment: String,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
