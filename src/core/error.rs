use thiserror::Error;

/// Errors raised by normalization, scoring and ranking
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CoreError {
    #[error("Malformed profile: {0}")]
    MalformedProfile(String),

    #[error("Value out of domain: {field} = {value}")]
    OutOfDomainValue { field: &'static str, value: i64 },

    #[error("Ranking cancelled: deadline exceeded")]
    RankingCancelled,
}
