pub mod company_repository;
pub mod onboarding_repository;
pub mod settings_repository;

pub use company_repository::{CompanyRepository, SqliteCompanyRepository};
pub use onboarding_repository::{OnboardingRepository, SqliteOnboardingRepository};
pub use settings_repository::{
    SqliteVerificationSettingsRepository, VerificationSettingsRepository,
};

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Record not found")]
    NotFound,
    #[error("Record already exists")]
    AlreadyExists,
    #[error("Stored state is not readable: {0}")]
    CorruptState(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

pub(crate) fn is_foreign_key_violation(err: &sqlx::Error) -> bool {
    err.to_string().contains("FOREIGN KEY")
}
