use crate::error::{MatchError, MatchResult};
use crate::models::{Match, MatchStatus};
use crate::services::store::MatchRepository;
use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Live match already exists for {0}")]
    LiveMatchExists(String),
}

impl From<PostgresError> for MatchError {
    fn from(err: PostgresError) -> Self {
        match err {
            PostgresError::NotFound(what) => MatchError::NotFound(what),
            other => MatchError::StorageError(other.to_string()),
        }
    }
}

/// Column type for match status
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "match_status", rename_all = "lowercase")]
pub enum StatusColumn {
    Pending,
    Accepted,
    Declined,
    Connected,
}

impl From<MatchStatus> for StatusColumn {
    fn from(value: MatchStatus) -> Self {
        match value {
            MatchStatus::Pending => StatusColumn::Pending,
            MatchStatus::Accepted => StatusColumn::Accepted,
            MatchStatus::Declined => StatusColumn::Declined,
            MatchStatus::Connected => StatusColumn::Connected,
        }
    }
}

impl From<StatusColumn> for MatchStatus {
    fn from(value: StatusColumn) -> Self {
        match value {
            StatusColumn::Pending => MatchStatus::Pending,
            StatusColumn::Accepted => MatchStatus::Accepted,
            StatusColumn::Declined => MatchStatus::Declined,
            StatusColumn::Connected => MatchStatus::Connected,
        }
    }
}

/// Partial unique index that admits one live match per pair
const LIVE_PAIR_INDEX: &str = "matches_live_pair_idx";

const MATCH_COLUMNS: &str =
    "id, viewer_id, candidate_id, score, shared_interests, status, created_at";

/// PostgreSQL-backed match repository
///
/// Status updates are a single conditional `UPDATE ... WHERE status = $2`,
/// so the database row lock provides the compare-and-swap. A partial unique
/// index keeps at most one live match per (viewer, candidate) pair.
pub struct PostgresMatchRepository {
    pool: PgPool,
}

impl PostgresMatchRepository {
    /// Connect and run migrations
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, PostgresError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Connect using optional settings, falling back to defaults
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, PostgresError> {
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

    async fn insert(&self, record: &Match) -> Result<(), PostgresError> {
        let score = i16::from(record.score);
        let shared: Vec<String> = record.shared_interests.iter().cloned().collect();

        sqlx::query(
            r#"
            INSERT INTO matches (id, viewer_id, candidate_id, score, shared_interests, status, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            "#,
        )
        .bind(record.id)
        .bind(&record.viewer_id)
        .bind(&record.candidate_id)
        .bind(score)
        .bind(&shared)
        .bind(StatusColumn::from(record.status))
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(db) if db.constraint() == Some(LIVE_PAIR_INDEX) => {
                PostgresError::LiveMatchExists(format!(
                    "{} -> {}",
                    record.viewer_id, record.candidate_id
                ))
            }
            other => PostgresError::SqlxError(other),
        })?;

        tracing::debug!(
            "Inserted match {}: {} -> {} ({})",
            record.id,
            record.viewer_id,
            record.candidate_id,
            record.score
        );

        Ok(())
    }

    async fn fetch(&self, id: Uuid) -> Result<Option<Match>, PostgresError> {
        let query = format!("SELECT {} FROM matches WHERE id = $1", MATCH_COLUMNS);
        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(row_to_match).transpose()
    }

    async fn compare_and_set(
        &self,
        id: Uuid,
        expected: MatchStatus,
        new: MatchStatus,
    ) -> Result<Option<Match>, PostgresError> {
        let query = format!(
            r#"
            UPDATE matches
            SET status = $3, updated_at = NOW()
            WHERE id = $1 AND status = $2
            RETURNING {}
            "#,
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(StatusColumn::from(expected))
            .bind(StatusColumn::from(new))
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(row_to_match).transpose()
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

fn row_to_match(row: &PgRow) -> Result<Match, PostgresError> {
    let score: i16 = row.try_get("score")?;
    let score = u8::try_from(score)
        .ok()
        .filter(|s| *s <= 100)
        .ok_or_else(|| PostgresError::InvalidInput(format!("score {} out of range", score)))?;
    let shared: Vec<String> = row.try_get("shared_interests")?;
    let status: StatusColumn = row.try_get("status")?;

    Ok(Match {
        id: row.try_get("id")?,
        viewer_id: row.try_get("viewer_id")?,
        candidate_id: row.try_get("candidate_id")?,
        score,
        shared_interests: shared.into_iter().collect(),
        status: status.into(),
        created_at: row.try_get("created_at")?,
    })
}

#[async_trait]
impl MatchRepository for PostgresMatchRepository {
    async fn create(&self, record: Match) -> MatchResult<Match> {
        self.insert(&record).await?;
        Ok(record)
    }

    async fn get_by_id(&self, id: Uuid) -> MatchResult<Match> {
        self.fetch(id)
            .await?
            .ok_or_else(|| MatchError::NotFound(format!("match {}", id)))
    }

    async fn update_status(
        &self,
        id: Uuid,
        expected: MatchStatus,
        new: MatchStatus,
    ) -> MatchResult<Match> {
        if let Some(updated) = self.compare_and_set(id, expected, new).await? {
            return Ok(updated);
        }

        // Nothing matched: either the id is unknown or another writer got there first
        match self.fetch(id).await? {
            None => Err(MatchError::NotFound(format!("match {}", id))),
            Some(current) => Err(MatchError::InvalidTransition {
                from: current.status,
                to: new,
            }),
        }
    }

    async fn find_live(&self, viewer_id: &str, candidate_id: &str) -> MatchResult<Option<Match>> {
        let query = format!(
            "SELECT {} FROM matches WHERE viewer_id = $1 AND candidate_id = $2 AND status <> 'declined'",
            MATCH_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(viewer_id)
            .bind(candidate_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        Ok(row.as_ref().map(row_to_match).transpose()?)
    }

    async fn list_for_viewer(&self, viewer_id: &str) -> MatchResult<Vec<Match>> {
        let query = format!(
            "SELECT {} FROM matches WHERE viewer_id = $1 ORDER BY created_at DESC, id",
            MATCH_COLUMNS
        );

        let rows = sqlx::query(&query)
            .bind(viewer_id)
            .fetch_all(&self.pool)
            .await
            .map_err(PostgresError::from)?;

        tracing::debug!("Viewer {} has {} matches", viewer_id, rows.len());

        let matches: Result<Vec<Match>, PostgresError> = rows.iter().map(row_to_match).collect();
        Ok(matches?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_column_conversion() {
        for status in [
            MatchStatus::Pending,
            MatchStatus::Accepted,
            MatchStatus::Declined,
            MatchStatus::Connected,
        ] {
            assert_eq!(MatchStatus::from(StatusColumn::from(status)), status);
        }
    }

    #[test]
    fn test_not_found_keeps_its_kind() {
        let err: MatchError = PostgresError::NotFound("match x".into()).into();
        assert!(matches!(err, MatchError::NotFound(_)));

        let err: MatchError = PostgresError::InvalidInput("bad".into()).into();
        assert!(matches!(err, MatchError::StorageError(_)));

        let err: MatchError = PostgresError::LiveMatchExists("viewer -> mate".into()).into();
        assert!(matches!(err, MatchError::StorageError(ref msg) if msg.contains("viewer -> mate")));
    }

    #[tokio::test]
    #[ignore = "Requires PostgreSQL"]
    async fn test_postgres_round_trip() {
        use crate::models::Compatibility;
        use std::collections::BTreeSet;

        let url = std::env::var("DATABASE_URL").expect("DATABASE_URL not set");
        let repo = PostgresMatchRepository::from_settings(&url, Some(2), Some(1), None, None)
            .await
            .expect("Failed to connect");

        let record = Match::pending(
            &format!("viewer-{}", Uuid::new_v4()),
            "candidate",
            Compatibility {
                score: 57,
                shared_interests: BTreeSet::from(["Beach".to_string(), "Food".to_string()]),
            },
            chrono::Utc::now(),
        );

        let created = repo.create(record.clone()).await.unwrap();
        let fetched = repo.get_by_id(created.id).await.unwrap();
        assert_eq!(fetched.score, 57);
        assert_eq!(fetched.shared_interests, record.shared_interests);
        assert_eq!(fetched.status, MatchStatus::Pending);

        repo.update_status(created.id, MatchStatus::Pending, MatchStatus::Accepted)
            .await
            .unwrap();
        let err = repo
            .update_status(created.id, MatchStatus::Pending, MatchStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, MatchError::InvalidTransition { .. }));
    }
}
