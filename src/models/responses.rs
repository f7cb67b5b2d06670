use serde::{Deserialize, Serialize};
use crate::models::domain::RankedMatch;

/// Response for the score endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: f64,
}

/// Response for the rank and matches endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankResponse {
    pub matches: Vec<RankedMatch>,
    pub total_candidates: usize,
}

/// Response for compare-and-store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareResponse {
    pub score: f64,
    pub message: String,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}
