// Core algorithm exports
pub mod error;
pub mod filters;
pub mod normalizer;
pub mod ranker;
pub mod scorer;

pub use error::CoreError;
pub use filters::{opposite_sex, CandidateFilter};
pub use normalizer::{normalize, AgePolicy, DomainPolicy, Normalizer};
pub use ranker::{rank, Ranker, DEFAULT_PARALLEL_THRESHOLD};
pub use scorer::{jaccard, score, score_breakdown, ScoreBreakdown};
