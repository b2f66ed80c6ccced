use super::{is_foreign_key_violation, RepositoryError, RepositoryResult};
use crate::models::onboarding::{OnboardingProgress, OnboardingState};
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait OnboardingRepository: Send + Sync {
    async fn find(&self, company_id: i64) -> RepositoryResult<Option<OnboardingProgress>>;
    /// Create the all-false row if the company has none. Existing rows are
    /// left alone; the stored row is returned either way.
    async fn insert_default(&self, company_id: i64) -> RepositoryResult<OnboardingProgress>;
    async fn save(
        &self,
        company_id: i64,
        state: &OnboardingState,
        completed: bool,
    ) -> RepositoryResult<()>;
}

#[derive(Debug, FromRow)]
struct OnboardingRow {
    state: String,
    completed: bool,
}

pub struct SqliteOnboardingRepository {
    pool: SqlitePool,
}

impl SqliteOnboardingRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn encode(state: &OnboardingState) -> RepositoryResult<String> {
        serde_json::to_string(state).map_err(|e| RepositoryError::CorruptState(e.to_string()))
    }
}

#[async_trait]
impl OnboardingRepository for SqliteOnboardingRepository {
    async fn find(&self, company_id: i64) -> RepositoryResult<Option<OnboardingProgress>> {
        let row = sqlx::query_as::<_, OnboardingRow>(
            "SELECT state, completed FROM company_onboarding WHERE company_id = ?",
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|r| {
            let state: OnboardingState = serde_json::from_str(&r.state).map_err(|e| {
                RepositoryError::CorruptState(format!("invalid onboarding state: {}", e))
            })?;
            Ok(OnboardingProgress {
                state,
                completed: r.completed,
            })
        })
        .transpose()
    }

    async fn insert_default(&self, company_id: i64) -> RepositoryResult<OnboardingProgress> {
        let state = Self::encode(&OnboardingState::default())?;

        let result = sqlx::query(
            r#"
            INSERT INTO company_onboarding (company_id, state, completed)
            VALUES (?, ?, 0)
            ON CONFLICT(company_id) DO NOTHING
            "#,
        )
        .bind(company_id)
        .bind(state)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if is_foreign_key_violation(&e) => return Err(RepositoryError::NotFound),
            Err(e) => return Err(RepositoryError::Database(e)),
        }

        self.find(company_id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn save(
        &self,
        company_id: i64,
        state: &OnboardingState,
        completed: bool,
    ) -> RepositoryResult<()> {
        let encoded = Self::encode(state)?;

        let result = sqlx::query(
            r#"
            INSERT INTO company_onboarding (company_id, state, completed)
            VALUES (?, ?, ?)
            ON CONFLICT(company_id) DO UPDATE SET
                state = excluded.state,
                completed = excluded.completed,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(company_id)
        .bind(encoded)
        .bind(completed)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) if is_foreign_key_violation(&e) => Err(RepositoryError::NotFound),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }
}
