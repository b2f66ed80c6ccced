use crate::models::company::{Company, CompanyRole, Profile};
use crate::repositories::{CompanyRepository, RepositoryError};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::sync::Arc;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid"));

#[derive(Debug, thiserror::Error)]
pub enum CompanyServiceError {
    #[error("Invalid email address")]
    InvalidEmail,
    #[error("Company name is required")]
    InvalidName,
    #[error("Company not found")]
    CompanyNotFound,
    #[error("Profile not found")]
    ProfileNotFound,
    #[error("Profile already belongs to a company")]
    AlreadyMember,
    #[error("A company needs at least one admin")]
    LastAdmin,
    #[error("Repository error: {0}")]
    RepositoryError(#[from] RepositoryError),
}

/// A newly created company and its first admin.
#[derive(Debug, Clone, Serialize)]
pub struct CompanyWithAdmin {
    pub company: Company,
    pub admin: Profile,
}

pub struct CompanyService {
    repository: Arc<dyn CompanyRepository>,
}

impl CompanyService {
    pub fn new(repository: Arc<dyn CompanyRepository>) -> Self {
        Self { repository }
    }

    /// Create a company with `admin_email` as its admin. An existing profile
    /// without a company is attached; a new one is created otherwise.
    pub async fn create_company(
        &self,
        name: &str,
        admin_email: &str,
    ) -> Result<CompanyWithAdmin, CompanyServiceError> {
        let name = name.trim();
        if name.is_empty() || name.len() > 200 {
            return Err(CompanyServiceError::InvalidName);
        }
        let email = normalize_email(admin_email)?;

        let existing = self.repository.find_profile_by_email(&email).await?;
        if existing.as_ref().is_some_and(|p| p.company_id.is_some()) {
            return Err(CompanyServiceError::AlreadyMember);
        }

        let company = self.repository.create_company(name).await?;
        let admin = match existing {
            Some(profile) => {
                self.repository
                    .set_membership(profile.id, Some(company.id), CompanyRole::Admin)
                    .await?;
                self.profile(profile.id).await?
            }
            None => {
                self.repository
                    .create_profile(&email, None, Some(company.id), CompanyRole::Admin)
                    .await?
            }
        };

        tracing::info!(company_id = company.id, admin = %admin.email, "company created");
        Ok(CompanyWithAdmin { company, admin })
    }

    pub async fn company(&self, id: i64) -> Result<Company, CompanyServiceError> {
        self.repository
            .find_company(id)
            .await?
            .ok_or(CompanyServiceError::CompanyNotFound)
    }

    pub async fn members(&self, company_id: i64) -> Result<Vec<Profile>, CompanyServiceError> {
        self.company(company_id).await?;
        Ok(self.repository.list_members(company_id).await?)
    }

    /// Attach a profile to the company, creating the profile when the email
    /// is unknown.
    pub async fn add_member(
        &self,
        company_id: i64,
        email: &str,
        role: CompanyRole,
    ) -> Result<Profile, CompanyServiceError> {
        let email = normalize_email(email)?;
        self.company(company_id).await?;

        match self.repository.find_profile_by_email(&email).await? {
            Some(profile) if profile.company_id.is_some() => Err(CompanyServiceError::AlreadyMember),
            Some(profile) => {
                self.repository
                    .set_membership(profile.id, Some(company_id), role)
                    .await?;
                self.profile(profile.id).await
            }
            None => match self
                .repository
                .create_profile(&email, None, Some(company_id), role)
                .await
            {
                Ok(profile) => Ok(profile),
                Err(RepositoryError::AlreadyExists) => Err(CompanyServiceError::AlreadyMember),
                Err(e) => Err(e.into()),
            },
        }
    }

    pub async fn set_member_role(
        &self,
        company_id: i64,
        profile_id: i64,
        role: CompanyRole,
    ) -> Result<Profile, CompanyServiceError> {
        let member = self.member(company_id, profile_id).await?;
        if member.company_role == CompanyRole::Admin && role != CompanyRole::Admin {
            self.ensure_other_admin(company_id).await?;
        }

        self.repository
            .set_membership(profile_id, Some(company_id), role)
            .await?;
        self.profile(profile_id).await
    }

    pub async fn remove_member(
        &self,
        company_id: i64,
        profile_id: i64,
    ) -> Result<(), CompanyServiceError> {
        let member = self.member(company_id, profile_id).await?;
        if member.company_role == CompanyRole::Admin {
            self.ensure_other_admin(company_id).await?;
        }

        self.repository
            .set_membership(profile_id, None, CompanyRole::Member)
            .await?;
        tracing::info!(company_id, profile_id, "member removed");
        Ok(())
    }

    /// Delete the company. Verification settings and onboarding rows go
    /// with it; member profiles are detached.
    pub async fn delete_company(&self, id: i64) -> Result<(), CompanyServiceError> {
        match self.repository.delete_company(id).await {
            Ok(()) => {
                tracing::info!(company_id = id, "company deleted");
                Ok(())
            }
            Err(RepositoryError::NotFound) => Err(CompanyServiceError::CompanyNotFound),
            Err(e) => Err(CompanyServiceError::RepositoryError(e)),
        }
    }

    pub async fn find_profile_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Profile>, CompanyServiceError> {
        Ok(self
            .repository
            .find_profile_by_email(&normalize_email(email)?)
            .await?)
    }

    /// Create a profile outside any company (admin tooling).
    pub async fn create_profile(
        &self,
        email: &str,
        display_name: Option<String>,
    ) -> Result<Profile, CompanyServiceError> {
        let email = normalize_email(email)?;
        match self
            .repository
            .create_profile(&email, display_name, None, CompanyRole::Member)
            .await
        {
            Ok(profile) => Ok(profile),
            Err(RepositoryError::AlreadyExists) => Err(CompanyServiceError::AlreadyMember),
            Err(e) => Err(e.into()),
        }
    }

    async fn profile(&self, id: i64) -> Result<Profile, CompanyServiceError> {
        self.repository
            .find_profile_by_id(id)
            .await?
            .ok_or(CompanyServiceError::ProfileNotFound)
    }

    async fn member(&self, company_id: i64, profile_id: i64) -> Result<Profile, CompanyServiceError> {
        let profile = self.profile(profile_id).await?;
        if profile.company_id != Some(company_id) {
            return Err(CompanyServiceError::ProfileNotFound);
        }
        Ok(profile)
    }

    async fn ensure_other_admin(&self, company_id: i64) -> Result<(), CompanyServiceError> {
        if self.repository.count_admins(company_id).await? <= 1 {
            return Err(CompanyServiceError::LastAdmin);
        }
        Ok(())
    }
}

fn normalize_email(email: &str) -> Result<String, CompanyServiceError> {
    let email = email.trim().to_ascii_lowercase();
    if email.len() > 255 || !EMAIL_RE.is_match(&email) {
        return Err(CompanyServiceError::InvalidEmail);
    }
    Ok(email)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::company_repository::MockCompanyRepository;
    use mockall::predicate::*;

    fn admin(id: i64, company_id: i64) -> Profile {
        Profile {
            id,
            email: format!("admin{}@example.com", id),
            display_name: None,
            company_id: Some(company_id),
            company_role: CompanyRole::Admin,
            created_at: None,
        }
    }

    #[tokio::test]
    async fn test_last_admin_cannot_be_demoted() {
        let mut repo = MockCompanyRepository::new();
        repo.expect_find_profile_by_id()
            .with(eq(7))
            .returning(|id| Box::pin(async move { Ok(Some(admin(id, 1))) }));
        repo.expect_count_admins()
            .with(eq(1))
            .returning(|_| Box::pin(async move { Ok(1) }));
        repo.expect_set_membership().times(0);

        let service = CompanyService::new(Arc::new(repo));
        let result = service.set_member_role(1, 7, CompanyRole::Member).await;
        assert!(matches!(result, Err(CompanyServiceError::LastAdmin)));
    }

    #[tokio::test]
    async fn test_member_of_other_company_is_not_found() {
        let mut repo = MockCompanyRepository::new();
        repo.expect_find_profile_by_id()
            .returning(|id| Box::pin(async move { Ok(Some(admin(id, 2))) }));

        let service = CompanyService::new(Arc::new(repo));
        let result = service.remove_member(1, 7).await;
        assert!(matches!(result, Err(CompanyServiceError::ProfileNotFound)));
    }

    #[tokio::test]
    async fn test_create_company_rejects_bad_input() {
        let service = CompanyService::new(Arc::new(MockCompanyRepository::new()));

        let result = service.create_company("  ", "a@b.com").await;
        assert!(matches!(result, Err(CompanyServiceError::InvalidName)));

        let result = service.create_company("Acme", "not-an-email").await;
        assert!(matches!(result, Err(CompanyServiceError::InvalidEmail)));
    }

    #[tokio::test]
    async fn test_delete_missing_company() {
        let mut repo = MockCompanyRepository::new();
        repo.expect_delete_company()
            .with(eq(9))
            .returning(|_| Box::pin(async move { Err(RepositoryError::NotFound) }));

        let service = CompanyService::new(Arc::new(repo));
        let result = service.delete_company(9).await;
        assert!(matches!(result, Err(CompanyServiceError::CompanyNotFound)));
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email(" A@B.com ").unwrap(), "a@b.com");
        assert!(normalize_email("a@b").is_err());
    }
}
