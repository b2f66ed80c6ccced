use super::{RepositoryError, RepositoryResult};
use crate::models::company::{Company, CompanyRole, Profile, ProfileRow};
use async_trait::async_trait;
use sqlx::SqlitePool;

#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait CompanyRepository: Send + Sync {
    async fn create_company(&self, name: &str) -> RepositoryResult<Company>;
    async fn find_company(&self, id: i64) -> RepositoryResult<Option<Company>>;
    async fn delete_company(&self, id: i64) -> RepositoryResult<()>;
    async fn create_profile(
        &self,
        email: &str,
        display_name: Option<String>,
        company_id: Option<i64>,
        role: CompanyRole,
    ) -> RepositoryResult<Profile>;
    async fn find_profile_by_email(&self, email: &str) -> RepositoryResult<Option<Profile>>;
    async fn find_profile_by_id(&self, id: i64) -> RepositoryResult<Option<Profile>>;
    async fn list_members(&self, company_id: i64) -> RepositoryResult<Vec<Profile>>;
    async fn set_membership(
        &self,
        profile_id: i64,
        company_id: Option<i64>,
        role: CompanyRole,
    ) -> RepositoryResult<()>;
    async fn count_admins(&self, company_id: i64) -> RepositoryResult<i64>;
}

pub struct SqliteCompanyRepository {
    pool: SqlitePool,
}

impl SqliteCompanyRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

fn to_profile(row: ProfileRow) -> RepositoryResult<Profile> {
    Profile::try_from(row).map_err(RepositoryError::CorruptState)
}

const PROFILE_COLUMNS: &str =
    "id, email, display_name, company_id, company_role, CAST(created_at AS TEXT) AS created_at";

#[async_trait]
impl CompanyRepository for SqliteCompanyRepository {
    async fn create_company(&self, name: &str) -> RepositoryResult<Company> {
        let id = sqlx::query("INSERT INTO companies (name) VALUES (?)")
            .bind(name)
            .execute(&self.pool)
            .await?
            .last_insert_rowid();

        self.find_company(id).await?.ok_or(RepositoryError::NotFound)
    }

    async fn find_company(&self, id: i64) -> RepositoryResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            "SELECT id, name, CAST(created_at AS TEXT) AS created_at FROM companies WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    async fn delete_company(&self, id: i64) -> RepositoryResult<()> {
        let result = sqlx::query("DELETE FROM companies WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    async fn create_profile(
        &self,
        email: &str,
        display_name: Option<String>,
        company_id: Option<i64>,
        role: CompanyRole,
    ) -> RepositoryResult<Profile> {
        let result = sqlx::query(
            "INSERT INTO profiles (email, display_name, company_id, company_role) VALUES (?, ?, ?, ?)",
        )
        .bind(email)
        .bind(display_name)
        .bind(company_id)
        .bind(role.as_str())
        .execute(&self.pool)
        .await;

        match result {
            Ok(res) => {
                let id = res.last_insert_rowid();
                self.find_profile_by_id(id)
                    .await?
                    .ok_or(RepositoryError::NotFound)
            }
            Err(e) => {
                if e.to_string().contains("UNIQUE") {
                    Err(RepositoryError::AlreadyExists)
                } else if super::is_foreign_key_violation(&e) {
                    Err(RepositoryError::NotFound)
                } else {
                    Err(RepositoryError::Database(e))
                }
            }
        }
    }

    async fn find_profile_by_email(&self, email: &str) -> RepositoryResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE email = ?",
            PROFILE_COLUMNS
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        row.map(to_profile).transpose()
    }

    async fn find_profile_by_id(&self, id: i64) -> RepositoryResult<Option<Profile>> {
        let row = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE id = ?",
            PROFILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(to_profile).transpose()
    }

    async fn list_members(&self, company_id: i64) -> RepositoryResult<Vec<Profile>> {
        let rows = sqlx::query_as::<_, ProfileRow>(&format!(
            "SELECT {} FROM profiles WHERE company_id = ? ORDER BY email",
            PROFILE_COLUMNS
        ))
        .bind(company_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(to_profile).collect()
    }

    async fn set_membership(
        &self,
        profile_id: i64,
        company_id: Option<i64>,
        role: CompanyRole,
    ) -> RepositoryResult<()> {
        let result =
            sqlx::query("UPDATE profiles SET company_id = ?, company_role = ? WHERE id = ?")
                .bind(company_id)
                .bind(role.as_str())
                .bind(profile_id)
                .execute(&self.pool)
                .await;

        match result {
            Ok(res) if res.rows_affected() == 0 => Err(RepositoryError::NotFound),
            Ok(_) => Ok(()),
            Err(e) if super::is_foreign_key_violation(&e) => Err(RepositoryError::NotFound),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }

    async fn count_admins(&self, company_id: i64) -> RepositoryResult<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM profiles WHERE company_id = ? AND company_role = 'admin'",
        )
        .bind(company_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
