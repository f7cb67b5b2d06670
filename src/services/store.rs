use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::core::{CandidateFilter, CoreError};
use crate::models::{ComparisonRecord, StoredProfile};

/// Errors that can occur when reading from or writing to a profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid profile record: {0}")]
    InvalidRecord(#[from] CoreError),
}

/// Source of profile records and sink for recorded comparisons
///
/// Candidates are returned in a stable order; ties in ranking fall back to
/// it.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, name: &str) -> Result<Option<StoredProfile>, StoreError>;

    async fn list_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<StoredProfile>, StoreError>;

    async fn record_comparison(&self, record: &ComparisonRecord) -> Result<(), StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError>;
}

/// Profile store held in process memory, in insertion order
#[derive(Debug, Default)]
pub struct InMemoryProfileStore {
    profiles: RwLock<Vec<StoredProfile>>,
    comparisons: RwLock<Vec<ComparisonRecord>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profiles(profiles: Vec<StoredProfile>) -> Self {
        Self {
            profiles: RwLock::new(profiles),
            comparisons: RwLock::new(Vec::new()),
        }
    }

    /// Insert a profile, replacing any existing profile with the same name
    pub async fn upsert(&self, profile: StoredProfile) {
        let mut profiles = self.profiles.write().await;
        match profiles.iter_mut().find(|p| p.name == profile.name) {
            Some(existing) => *existing = profile,
            None => profiles.push(profile),
        }
    }

    pub async fn comparisons(&self) -> Vec<ComparisonRecord> {
        self.comparisons.read().await.clone()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, name: &str) -> Result<Option<StoredProfile>, StoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().find(|p| p.name == name).cloned())
    }

    async fn list_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<StoredProfile>, StoreError> {
        let profiles = self.profiles.read().await;
        Ok(profiles.iter().filter(|p| filter.matches(p)).cloned().collect())
    }

    async fn record_comparison(&self, record: &ComparisonRecord) -> Result<(), StoreError> {
        self.comparisons.write().await.push(record.clone());
        tracing::debug!(
            "Recorded comparison: {} <-> {} = {}",
            record.profile1,
            record.profile2,
            record.score
        );
        Ok(())
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}
