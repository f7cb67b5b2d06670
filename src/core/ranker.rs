use std::cmp::Ordering;
use std::time::Instant;

use rayon::prelude::*;

use crate::core::normalizer::{normalize, DomainPolicy, Normalizer};
use crate::core::scorer::score;
use crate::core::CoreError;
use crate::models::{FeatureVector, RankedMatch, RawProfile};

/// Default pool size from which candidates are scored in parallel
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 256;

/// Rank candidates against a target with the default policy
///
/// Returns at most `top_k` matches, best first. Equal scores keep the order
/// of `candidates`.
pub fn rank<Id>(
    target: &RawProfile,
    candidates: &[(Id, RawProfile)],
    top_k: usize,
) -> Vec<RankedMatch<Id>>
where
    Id: Clone,
{
    let target = normalize(target);
    let scored = candidates
        .iter()
        .enumerate()
        .map(|(index, (_, profile))| (index, score(&target, &normalize(profile))))
        .collect();

    select_top(scored, candidates, top_k)
}

/// Scores and orders a candidate pool
///
/// The ranker never filters; callers remove ineligible candidates first.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    normalizer: Normalizer,
    parallel_threshold: usize,
}

impl Ranker {
    pub fn new(policy: DomainPolicy, parallel_threshold: usize) -> Self {
        Self {
            normalizer: Normalizer::new(policy),
            parallel_threshold,
        }
    }

    pub fn policy(&self) -> DomainPolicy {
        self.normalizer.policy()
    }

    pub fn normalizer(&self) -> &Normalizer {
        &self.normalizer
    }

    /// Rank a candidate pool, returning at most `top_k` matches
    pub fn rank<Id>(
        &self,
        target: &RawProfile,
        candidates: &[(Id, RawProfile)],
        top_k: usize,
    ) -> Result<Vec<RankedMatch<Id>>, CoreError>
    where
        Id: Clone + Sync,
    {
        self.rank_until(target, candidates, top_k, None)
    }

    /// Rank a candidate pool, giving up once `deadline` has passed
    ///
    /// Cancellation is all-or-nothing: a ranking that overruns its deadline
    /// returns [`CoreError::RankingCancelled`] and no partial result.
    pub fn rank_until<Id>(
        &self,
        target: &RawProfile,
        candidates: &[(Id, RawProfile)],
        top_k: usize,
        deadline: Option<Instant>,
    ) -> Result<Vec<RankedMatch<Id>>, CoreError>
    where
        Id: Clone + Sync,
    {
        let target_vector = self.normalizer.normalize(target)?;
        if candidates.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let score_one = |(index, (_, profile)): (usize, &(Id, RawProfile))| {
            score_candidate(&self.normalizer, &target_vector, index, profile, deadline)
        };

        let scored: Vec<(usize, f64)> = if candidates.len() >= self.parallel_threshold {
            tracing::debug!("Scoring {} candidates in parallel", candidates.len());
            candidates
                .par_iter()
                .enumerate()
                .map(score_one)
                .collect::<Result<Vec<_>, CoreError>>()?
        } else {
            candidates
                .iter()
                .enumerate()
                .map(score_one)
                .collect::<Result<Vec<_>, CoreError>>()?
        };

        Ok(select_top(scored, candidates, top_k))
    }
}

impl Default for Ranker {
    fn default() -> Self {
        Self::new(DomainPolicy::default(), DEFAULT_PARALLEL_THRESHOLD)
    }
}

#[inline]
fn score_candidate(
    normalizer: &Normalizer,
    target: &FeatureVector,
    index: usize,
    profile: &RawProfile,
    deadline: Option<Instant>,
) -> Result<(usize, f64), CoreError> {
    if deadline.is_some_and(|d| Instant::now() >= d) {
        return Err(CoreError::RankingCancelled);
    }
    let vector = normalizer.normalize(profile)?;
    Ok((index, score(target, &vector)))
}

/// Sort by score descending, then input position, and keep the first `top_k`
fn select_top<Id: Clone>(
    mut scored: Vec<(usize, f64)>,
    candidates: &[(Id, RawProfile)],
    top_k: usize,
) -> Vec<RankedMatch<Id>> {
    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(top_k);

    scored
        .into_iter()
        .map(|(index, score)| RankedMatch {
            id: candidates[index].0.clone(),
            score,
        })
        .collect()
}
