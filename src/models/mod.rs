// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    ComparisonRecord, Feature, FeatureVector, Habit, Personality, RankedMatch, RawProfile,
    StoredProfile, FEATURES, FEATURE_COUNT,
};
pub use requests::{CompareRequest, MatchesQuery, NormalizeRequest, RankCandidate, RankRequest, ScoreRequest};
pub use responses::{CompareResponse, ErrorResponse, HealthResponse, RankResponse, ScoreResponse};
