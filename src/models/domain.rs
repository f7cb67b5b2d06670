use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeSet;

use crate::core::CoreError;

/// Raw profile attributes as supplied by the profile store or a client
///
/// Field names match the wire shape used by the profile store, so a stored
/// record round-trips through JSON without loss.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawProfile {
    pub age: i64,
    pub openness: i64,
    pub conscientiousness: i64,
    pub extraversion: i64,
    pub agreeableness: i64,
    pub neuroticism: i64,
    #[serde(default)]
    pub smoking: Option<String>,
    #[serde(default)]
    pub drinking: Option<String>,
    #[serde(default)]
    pub hobbies: BTreeSet<String>,
}

impl RawProfile {
    /// Parse a profile from an untyped JSON value
    ///
    /// Missing or non-integer numeric fields fail with
    /// [`CoreError::MalformedProfile`]; they are never defaulted.
    pub fn from_json(value: serde_json::Value) -> Result<Self, CoreError> {
        serde_json::from_value(value).map_err(|e| CoreError::MalformedProfile(e.to_string()))
    }

    /// Raw score for one of the Big Five traits
    pub fn trait_score(&self, personality: Personality) -> i64 {
        match personality {
            Personality::Openness => self.openness,
            Personality::Conscientiousness => self.conscientiousness,
            Personality::Extraversion => self.extraversion,
            Personality::Agreeableness => self.agreeableness,
            Personality::Neuroticism => self.neuroticism,
        }
    }
}

/// Profile record held by the profile store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredProfile {
    pub name: String,
    pub sex: String,
    #[serde(flatten)]
    pub profile: RawProfile,
}

/// Big Five personality traits, scored on a 1-5 scale
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Personality {
    Openness,
    Conscientiousness,
    Extraversion,
    Agreeableness,
    Neuroticism,
}

impl Personality {
    pub const ALL: [Personality; 5] = [
        Personality::Openness,
        Personality::Conscientiousness,
        Personality::Extraversion,
        Personality::Agreeableness,
        Personality::Neuroticism,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Personality::Openness => "openness",
            Personality::Conscientiousness => "conscientiousness",
            Personality::Extraversion => "extraversion",
            Personality::Agreeableness => "agreeableness",
            Personality::Neuroticism => "neuroticism",
        }
    }
}

/// Smoking/drinking frequency
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Habit {
    No,
    Occasionally,
    Yes,
}

impl Habit {
    /// Case-insensitive parse; `None` for anything outside the closed set
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.to_lowercase().as_str() {
            "no" => Some(Habit::No),
            "occasionally" => Some(Habit::Occasionally),
            "yes" => Some(Habit::Yes),
            _ => None,
        }
    }

    pub fn level(self) -> f64 {
        match self {
            Habit::No => 0.0,
            Habit::Occasionally => 0.5,
            Habit::Yes => 1.0,
        }
    }
}

/// Numeric features, in the order both the normalizer and scorer walk them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Trait(Personality),
    AgeDist,
    Smoking,
    Drinking,
}

pub const FEATURE_COUNT: usize = 8;

pub const FEATURES: [Feature; FEATURE_COUNT] = [
    Feature::Trait(Personality::Openness),
    Feature::Trait(Personality::Conscientiousness),
    Feature::Trait(Personality::Extraversion),
    Feature::Trait(Personality::Agreeableness),
    Feature::Trait(Personality::Neuroticism),
    Feature::AgeDist,
    Feature::Smoking,
    Feature::Drinking,
];

impl Feature {
    pub fn name(self) -> &'static str {
        match self {
            Feature::Trait(Personality::Openness) => "trait_openness",
            Feature::Trait(Personality::Conscientiousness) => "trait_conscientiousness",
            Feature::Trait(Personality::Extraversion) => "trait_extraversion",
            Feature::Trait(Personality::Agreeableness) => "trait_agreeableness",
            Feature::Trait(Personality::Neuroticism) => "trait_neuroticism",
            Feature::AgeDist => "age_dist",
            Feature::Smoking => "smoking",
            Feature::Drinking => "drinking",
        }
    }

    /// Position of this feature in [`FEATURES`]
    pub fn index(self) -> usize {
        match self {
            Feature::Trait(Personality::Openness) => 0,
            Feature::Trait(Personality::Conscientiousness) => 1,
            Feature::Trait(Personality::Extraversion) => 2,
            Feature::Trait(Personality::Agreeableness) => 3,
            Feature::Trait(Personality::Neuroticism) => 4,
            Feature::AgeDist => 5,
            Feature::Smoking => 6,
            Feature::Drinking => 7,
        }
    }
}

/// Normalized view of a profile
///
/// Always carries every feature in [`FEATURES`]; hobbies are kept apart
/// because they are compared by set overlap, not by distance.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    values: [f64; FEATURE_COUNT],
    hobbies: BTreeSet<String>,
}

impl FeatureVector {
    pub fn new(values: [f64; FEATURE_COUNT], hobbies: BTreeSet<String>) -> Self {
        Self { values, hobbies }
    }

    pub fn get(&self, feature: Feature) -> f64 {
        self.values[feature.index()]
    }

    pub fn values(&self) -> &[f64; FEATURE_COUNT] {
        &self.values
    }

    pub fn hobbies(&self) -> &BTreeSet<String> {
        &self.hobbies
    }

    /// Feature name/value pairs in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        FEATURES.iter().map(move |f| (f.name(), self.get(*f)))
    }
}

impl Serialize for FeatureVector {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FEATURE_COUNT + 1))?;
        for (name, value) in self.iter() {
            map.serialize_entry(name, &value)?;
        }
        map.serialize_entry("hobbies", &self.hobbies)?;
        map.end()
    }
}

/// Ranked candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedMatch<Id = String> {
    pub id: Id,
    pub score: f64,
}

/// A computed comparison, recorded by the caller after scoring
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonRecord {
    pub id: uuid::Uuid,
    pub profile1: String,
    pub profile2: String,
    pub score: f64,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ComparisonRecord {
    pub fn new(profile1: impl Into<String>, profile2: impl Into<String>, score: f64) -> Self {
        Self {
            id: uuid::Uuid::new_v4(),
            profile1: profile1.into(),
            profile2: profile2.into(),
            score,
            timestamp: chrono::Utc::now(),
        }
    }
}
