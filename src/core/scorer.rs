use std::collections::BTreeSet;

use crate::models::{FeatureVector, FEATURE_COUNT};

/// Weight of the trait (distance) similarity in the blended score
pub const TRAIT_WEIGHT: f64 = 0.8;
/// Weight of the hobby (set overlap) similarity in the blended score
pub const HOBBY_WEIGHT: f64 = 0.2;

/// Intermediate terms of a compatibility score
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBreakdown {
    pub distance: f64,
    pub trait_similarity: f64,
    pub hobby_similarity: f64,
    pub score: f64,
}

/// Jaccard index of two tag sets
///
/// Two empty sets are treated as fully compatible (1.0): profiles without
/// hobbies are not penalised on this axis.
pub fn jaccard(a: &BTreeSet<String>, b: &BTreeSet<String>) -> f64 {
    if a.is_empty() && b.is_empty() {
        return 1.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Euclidean distance over the numeric features
#[inline]
pub fn euclidean_distance(v1: &FeatureVector, v2: &FeatureVector) -> f64 {
    v1.values()
        .iter()
        .zip(v2.values().iter())
        .map(|(a, b)| (a - b).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Distance between two vectors that differ by 1 on every feature
#[inline]
pub fn max_distance() -> f64 {
    (FEATURE_COUNT as f64).sqrt()
}

/// Compute the score and every intermediate term
///
/// `trait_similarity` is not clamped. An unclamped age distance can push the
/// Euclidean distance past [`max_distance`], making it negative and the final
/// score fall below 0.
pub fn score_breakdown(v1: &FeatureVector, v2: &FeatureVector) -> ScoreBreakdown {
    let hobby_similarity = jaccard(v1.hobbies(), v2.hobbies());
    let distance = euclidean_distance(v1, v2);
    let trait_similarity = 1.0 - distance / max_distance();

    let blended = TRAIT_WEIGHT * trait_similarity + HOBBY_WEIGHT * hobby_similarity;

    ScoreBreakdown {
        distance,
        trait_similarity,
        hobby_similarity,
        score: round2(blended * 100.0),
    }
}

/// Compatibility percentage of two normalized profiles, rounded to 2 decimals
pub fn score(v1: &FeatureVector, v2: &FeatureVector) -> f64 {
    score_breakdown(v1, v2).score
}

/// Round to 2 decimals using the exact binary value, settling exact halves
/// to the even digit
fn round2(value: f64) -> f64 {
    format!("{:.2}", value).parse().unwrap_or(value)
}
