use crate::core::CoreError;
use crate::models::{Feature, FeatureVector, Habit, Personality, RawProfile, FEATURES, FEATURE_COUNT};

/// Lowest and highest points of the trait scale
pub const TRAIT_MIN: i64 = 1;
pub const TRAIT_MAX: i64 = 5;

/// Age is measured as a distance from an ideal age, scaled by the expected
/// age span. The result is not clamped: ages far from the ideal yield values
/// above 1.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AgePolicy {
    pub ideal: i64,
    pub min: i64,
    pub max: i64,
}

impl AgePolicy {
    pub const DEFAULT: AgePolicy = AgePolicy {
        ideal: 30,
        min: 18,
        max: 80,
    };

    #[inline]
    pub fn distance(&self, age: i64) -> f64 {
        age.abs_diff(self.ideal) as f64 / self.max.abs_diff(self.min) as f64
    }
}

impl Default for AgePolicy {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// How out-of-domain inputs are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DomainPolicy {
    /// Accept and propagate distorted values
    #[default]
    Lenient,
    /// Reject traits outside the scale and ages with a distance above 1
    Strict,
}

/// Map a trait score from the 1-5 scale onto [0, 1]
///
/// Widened to `i128` so scores at the edges of `i64` cannot overflow.
#[inline]
pub fn trait_level(raw: i64) -> f64 {
    (i128::from(raw) - i128::from(TRAIT_MIN)) as f64 / (TRAIT_MAX - TRAIT_MIN) as f64
}

/// Map a habit answer onto [0, 1]; unknown or absent answers count as "no"
#[inline]
pub fn habit_level(raw: Option<&str>) -> f64 {
    match raw.and_then(Habit::parse) {
        Some(habit) => habit.level(),
        None => 0.0,
    }
}

/// Normalize a profile with the default (lenient) policy
pub fn normalize(profile: &RawProfile) -> FeatureVector {
    let age_policy = AgePolicy::DEFAULT;
    let mut values = [0.0; FEATURE_COUNT];
    for feature in FEATURES {
        values[feature.index()] = match feature {
            Feature::Trait(personality) => trait_level(profile.trait_score(personality)),
            Feature::AgeDist => age_policy.distance(profile.age),
            Feature::Smoking => habit_level(profile.smoking.as_deref()),
            Feature::Drinking => habit_level(profile.drinking.as_deref()),
        };
    }
    FeatureVector::new(values, profile.hobbies.clone())
}

/// Feature normalizer with a configurable domain policy
#[derive(Debug, Clone, Copy, Default)]
pub struct Normalizer {
    policy: DomainPolicy,
}

impl Normalizer {
    pub fn new(policy: DomainPolicy) -> Self {
        Self { policy }
    }

    pub fn strict() -> Self {
        Self::new(DomainPolicy::Strict)
    }

    pub fn policy(&self) -> DomainPolicy {
        self.policy
    }

    /// Normalize a profile, checking its domain first
    ///
    /// In lenient mode out-of-domain values are only logged and the call
    /// never fails.
    pub fn normalize(&self, profile: &RawProfile) -> Result<FeatureVector, CoreError> {
        if let Some((field, value)) = out_of_domain(profile) {
            match self.policy {
                DomainPolicy::Strict => {
                    return Err(CoreError::OutOfDomainValue { field, value });
                }
                DomainPolicy::Lenient => {
                    tracing::debug!("Out-of-domain value accepted: {} = {}", field, value);
                }
            }
        }
        Ok(normalize(profile))
    }
}

/// First field whose value falls outside its nominal domain
fn out_of_domain(profile: &RawProfile) -> Option<(&'static str, i64)> {
    for personality in Personality::ALL {
        let raw = profile.trait_score(personality);
        if !(TRAIT_MIN..=TRAIT_MAX).contains(&raw) {
            return Some((personality.as_str(), raw));
        }
    }
    if AgePolicy::DEFAULT.distance(profile.age) > 1.0 {
        return Some(("age", profile.age));
    }
    None
}
