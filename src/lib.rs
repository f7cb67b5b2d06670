//! Compat Score - profile compatibility scoring and match ranking
//!
//! The core turns raw profiles into normalized feature vectors, blends a
//! trait-distance similarity with a hobby-overlap similarity into a 0-100
//! score, and ranks candidate pools by that score. The service layer binds
//! those operations to HTTP, a profile store and a token verifier.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{normalize, rank, score, CandidateFilter, CoreError, DomainPolicy, Normalizer, Ranker};
pub use crate::models::{FeatureVector, RankedMatch, RawProfile, StoredProfile};
