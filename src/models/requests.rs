use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::domain::{RawProfile, StoredProfile};

/// Request to normalize a single profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizeRequest {
    pub profile: RawProfile,
}

/// Request to score two profiles against each other
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreRequest {
    pub profile1: RawProfile,
    pub profile2: RawProfile,
}

/// Candidate entry within a rank request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankCandidate {
    pub id: String,
    pub profile: RawProfile,
}

/// Request to rank an explicit candidate pool against a target
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct RankRequest {
    pub target: RawProfile,
    #[serde(default)]
    pub candidates: Vec<RankCandidate>,
    #[validate(range(min = 1, max = 1000))]
    #[serde(alias = "top_k", rename = "topK", default = "default_top_k")]
    pub top_k: usize,
}

fn default_top_k() -> usize {
    5
}

/// Query parameters for the stored-profile matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct MatchesQuery {
    #[validate(range(min = 1))]
    pub limit: Option<usize>,
}

/// Request to score two stored profiles and record the comparison
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareRequest {
    pub profile1: StoredProfile,
    pub profile2: StoredProfile,
}

impl CompareRequest {
    /// Both profiles need a name to be recorded
    pub fn validate_names(&self) -> Result<(), String> {
        if self.profile1.name.trim().is_empty() || self.profile2.name.trim().is_empty() {
            return Err("profile1.name and profile2.name must not be empty".to_string());
        }
        Ok(())
    }
}
