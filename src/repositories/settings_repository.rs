use super::{is_foreign_key_violation, RepositoryError, RepositoryResult};
use crate::models::verification::{
    DnsRecord, PreventionSteps, SettingsPatch, VerificationSettings, SETTINGS_SCHEMA_VERSION,
};
use async_trait::async_trait;
use sqlx::{FromRow, SqlitePool};

/// Per-company verification settings row.
///
/// `find` reports a missing row as `None`; callers decide what a missing row
/// means. `merge` is the only write path and creates the row on first use.
#[async_trait]
#[cfg_attr(test, mockall::automock)]
pub trait VerificationSettingsRepository: Send + Sync {
    async fn find(&self, company_id: i64) -> RepositoryResult<Option<VerificationSettings>>;

    /// Read-modify-write merge of `patch` into the stored row. Fields the
    /// patch leaves untouched keep their stored value.
    async fn merge(
        &self,
        company_id: i64,
        patch: SettingsPatch,
    ) -> RepositoryResult<VerificationSettings>;
}

#[derive(Debug, FromRow)]
struct SettingsRow {
    company_id: i64,
    schema_version: i64,
    sender_name: Option<String>,
    sender_email: Option<String>,
    sender_id: Option<String>,
    is_verified: bool,
    pending_sender_id: Option<String>,
    pending_sender_email: Option<String>,
    pending_sender_name: Option<String>,
    prevention_steps: String,
    domain: Option<String>,
    domain_brevo_id: Option<String>,
    domain_dns_records: String,
}

impl TryFrom<SettingsRow> for VerificationSettings {
    type Error = RepositoryError;

    fn try_from(row: SettingsRow) -> Result<Self, Self::Error> {
        if row.schema_version != SETTINGS_SCHEMA_VERSION {
            return Err(RepositoryError::CorruptState(format!(
                "verification settings for company {} use unsupported schema version {}",
                row.company_id, row.schema_version
            )));
        }

        let prevention_steps: PreventionSteps = serde_json::from_str(&row.prevention_steps)
            .map_err(|e| {
                RepositoryError::CorruptState(format!("invalid prevention_steps: {}", e))
            })?;
        let domain_dns_records: Vec<DnsRecord> = serde_json::from_str(&row.domain_dns_records)
            .map_err(|e| {
                RepositoryError::CorruptState(format!("invalid domain_dns_records: {}", e))
            })?;

        let mut settings = VerificationSettings {
            company_id: row.company_id,
            sender_name: row.sender_name,
            sender_email: row.sender_email,
            sender_id: row.sender_id,
            is_verified: row.is_verified,
            pending_sender_id: row.pending_sender_id,
            pending_sender_email: row.pending_sender_email,
            pending_sender_name: row.pending_sender_name,
            prevention_steps,
            domain: row.domain,
            domain_brevo_id: row.domain_brevo_id,
            domain_dns_records,
        };
        settings.normalize();
        Ok(settings)
    }
}

pub struct SqliteVerificationSettingsRepository {
    pool: SqlitePool,
}

impl SqliteVerificationSettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VerificationSettingsRepository for SqliteVerificationSettingsRepository {
    async fn find(&self, company_id: i64) -> RepositoryResult<Option<VerificationSettings>> {
        let row = sqlx::query_as::<_, SettingsRow>(
            r#"
            SELECT
                company_id,
                schema_version,
                sender_name,
                sender_email,
                sender_id,
                is_verified,
                pending_sender_id,
                pending_sender_email,
                pending_sender_name,
                prevention_steps,
                domain,
                domain_brevo_id,
                domain_dns_records
            FROM company_verification_settings
            WHERE company_id = ?
            "#,
        )
        .bind(company_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VerificationSettings::try_from).transpose()
    }

    async fn merge(
        &self,
        company_id: i64,
        patch: SettingsPatch,
    ) -> RepositoryResult<VerificationSettings> {
        let mut settings = self
            .find(company_id)
            .await?
            .unwrap_or_else(|| VerificationSettings::empty(company_id));
        settings.apply(patch);

        let prevention_steps = serde_json::to_string(&settings.prevention_steps)
            .map_err(|e| RepositoryError::CorruptState(e.to_string()))?;
        let dns_records = serde_json::to_string(&settings.domain_dns_records)
            .map_err(|e| RepositoryError::CorruptState(e.to_string()))?;

        let result = sqlx::query(
            r#"
            INSERT INTO company_verification_settings (
                company_id, schema_version, sender_name, sender_email, sender_id, is_verified,
                pending_sender_id, pending_sender_email, pending_sender_name,
                prevention_steps, domain, domain_brevo_id, domain_dns_records
            )
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(company_id) DO UPDATE SET
                schema_version = excluded.schema_version,
                sender_name = excluded.sender_name,
                sender_email = excluded.sender_email,
                sender_id = excluded.sender_id,
                is_verified = excluded.is_verified,
                pending_sender_id = excluded.pending_sender_id,
                pending_sender_email = excluded.pending_sender_email,
                pending_sender_name = excluded.pending_sender_name,
                prevention_steps = excluded.prevention_steps,
                domain = excluded.domain,
                domain_brevo_id = excluded.domain_brevo_id,
                domain_dns_records = excluded.domain_dns_records,
                updated_at = CURRENT_TIMESTAMP
            "#,
        )
        .bind(company_id)
        .bind(SETTINGS_SCHEMA_VERSION)
        .bind(&settings.sender_name)
        .bind(&settings.sender_email)
        .bind(&settings.sender_id)
        .bind(settings.is_verified)
        .bind(&settings.pending_sender_id)
        .bind(&settings.pending_sender_email)
        .bind(&settings.pending_sender_name)
        .bind(prevention_steps)
        .bind(&settings.domain)
        .bind(&settings.domain_brevo_id)
        .bind(dns_records)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => Ok(settings),
            Err(e) if is_foreign_key_violation(&e) => Err(RepositoryError::NotFound),
            Err(e) => Err(RepositoryError::Database(e)),
        }
    }
}
