use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;

use crate::core::{CandidateFilter, CoreError};
use crate::models::{ComparisonRecord, RawProfile, StoredProfile};
use crate::services::store::{ProfileStore, StoreError};

const PROFILE_COLUMNS: &str = "name, sex, age, openness, conscientiousness, extraversion, \
     agreeableness, neuroticism, smoking, drinking, hobbies";

/// PostgreSQL-backed profile store
///
/// Profiles are written by the registration flow; this client only reads
/// them. Computed comparisons are appended to the `comparisons` table.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

/// Numeric columns are nullable in the table; a NULL is a malformed profile,
/// never a zero.
fn required_int(row: &PgRow, column: &'static str) -> Result<i64, StoreError> {
    let value: Option<i32> = row.try_get(column)?;
    value
        .map(i64::from)
        .ok_or_else(|| CoreError::MalformedProfile(format!("missing field `{}`", column)).into())
}

fn profile_from_row(row: &PgRow) -> Result<StoredProfile, StoreError> {
    let hobbies: Option<Vec<String>> = row.try_get("hobbies")?;

    Ok(StoredProfile {
        name: row.try_get("name")?,
        sex: row.try_get("sex")?,
        profile: RawProfile {
            age: required_int(row, "age")?,
            openness: required_int(row, "openness")?,
            conscientiousness: required_int(row, "conscientiousness")?,
            extraversion: required_int(row, "extraversion")?,
            agreeableness: required_int(row, "agreeableness")?,
            neuroticism: required_int(row, "neuroticism")?,
            smoking: row.try_get("smoking")?,
            drinking: row.try_get("drinking")?,
            hobbies: hobbies.unwrap_or_default().into_iter().collect(),
        },
    })
}

#[async_trait]
impl ProfileStore for PostgresClient {
    async fn get_profile(&self, name: &str) -> Result<Option<StoredProfile>, StoreError> {
        let query = format!("SELECT {} FROM profiles WHERE name = $1", PROFILE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(profile_from_row).transpose()
    }

    async fn list_candidates(
        &self,
        filter: &CandidateFilter,
    ) -> Result<Vec<StoredProfile>, StoreError> {
        // NULL parameters disable the corresponding condition
        let query = format!(
            r#"
            SELECT {}
            FROM profiles
            WHERE ($1::TEXT IS NULL OR name <> $1)
              AND ($2::TEXT IS NULL OR LOWER(TRIM(sex)) = LOWER($2))
            ORDER BY id
            "#,
            PROFILE_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(filter.exclude_name.as_deref())
            .bind(filter.sex.as_deref())
            .fetch_all(&self.pool)
            .await?;

        let candidates = rows
            .iter()
            .map(profile_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} candidates with {:?}", candidates.len(), filter);

        Ok(candidates)
    }

    async fn record_comparison(&self, record: &ComparisonRecord) -> Result<(), StoreError> {
        let query = r#"
            INSERT INTO comparisons (id, profile1, profile2, score, created_at)
            VALUES ($1, $2, $3, $4, $5)
        "#;

        sqlx::query(query)
            .bind(record.id)
            .bind(&record.profile1)
            .bind(&record.profile2)
            .bind(record.score)
            .bind(record.timestamp)
            .execute(&self.pool)
            .await?;

        tracing::debug!(
            "Recorded comparison: {} <-> {} = {}",
            record.profile1,
            record.profile2,
            record.score
        );

        Ok(())
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
