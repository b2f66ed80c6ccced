//! Verification workflow for a company.
//!
//! Two independent tracks are driven here:
//!
//! - sender: `NoSender -> PendingOtp -> Verified`, plus the update flow that
//!   registers a replacement sender while the verified one stays in charge
//!   until the replacement's OTP is confirmed
//! - domain: `NoDomain -> PendingDns -> Authenticated`
//!
//! Every transition calls the upstream gateway first and only writes the
//! settings row once the upstream call succeeded, so a failed call never
//! leaves a half-applied change behind.

use crate::models::verification::{SettingsPatch, VerificationProgress, VerificationSettings};
use crate::repositories::{RepositoryError, VerificationSettingsRepository};
use crate::services::domain_gateway::DomainGateway;
use crate::services::gateway::{DomainCheck, GatewayError};
use crate::services::sender_gateway::SenderGateway;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is valid")
});

static DOMAIN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?\.)+[a-z]{2,63}$")
        .expect("domain pattern is valid")
});

const MAX_SENDER_NAME_LEN: usize = 100;

/// Upstream step that failed, reported back to the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationPhase {
    CreateSender,
    ValidateOtp,
    CreateDomain,
    ValidateDomain,
    AuthenticateDomain,
}

impl fmt::Display for VerificationPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            VerificationPhase::CreateSender => "Sender creation",
            VerificationPhase::ValidateOtp => "OTP validation",
            VerificationPhase::CreateDomain => "Domain setup",
            VerificationPhase::ValidateDomain => "Domain validation",
            VerificationPhase::AuthenticateDomain => "Domain authentication",
        };
        f.write_str(label)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    AlreadyExists(String),
    #[error("The confirmation does not match the current domain")]
    ConfirmationMismatch,
    #[error("Invalid verification code")]
    InvalidCode,
    #[error("No sender has been created yet")]
    NoSender,
    #[error("No domain has been configured yet")]
    NoDomain,
    #[error("The domain is not authenticated yet")]
    DomainNotAuthenticated,
    #[error("{phase} failed: {source}")]
    Upstream {
        phase: VerificationPhase,
        #[source]
        source: GatewayError,
    },
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl VerificationError {
    fn upstream(phase: VerificationPhase) -> impl FnOnce(GatewayError) -> Self {
        move |source| match source {
            GatewayError::InvalidCode => VerificationError::InvalidCode,
            source => VerificationError::Upstream { phase, source },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationStatus {
    pub settings: VerificationSettings,
    pub progress: VerificationProgress,
    /// The live domain check could not be completed; step 2 is reported
    /// as not done.
    pub domain_check_failed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SenderRegistration {
    pub settings: VerificationSettings,
    pub spf_error: bool,
    pub dkim_error: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DomainStatus {
    pub domain: String,
    #[serde(flatten)]
    pub check: DomainCheck,
}

pub struct VerificationService {
    settings: Arc<dyn VerificationSettingsRepository>,
    senders: Arc<dyn SenderGateway>,
    domains: Arc<dyn DomainGateway>,
}

impl VerificationService {
    pub fn new(
        settings: Arc<dyn VerificationSettingsRepository>,
        senders: Arc<dyn SenderGateway>,
        domains: Arc<dyn DomainGateway>,
    ) -> Self {
        Self {
            settings,
            senders,
            domains,
        }
    }

    /// Stored settings, or the empty defaults when the company has no row.
    pub async fn settings(&self, company_id: i64) -> Result<VerificationSettings, VerificationError> {
        Ok(self
            .settings
            .find(company_id)
            .await?
            .unwrap_or_else(|| VerificationSettings::empty(company_id)))
    }

    pub async fn status(&self, company_id: i64) -> Result<VerificationStatus, VerificationError> {
        let settings = self.settings(company_id).await?;

        let (authenticated, domain_check_failed) = match settings.domain.as_deref() {
            None => (false, false),
            Some(domain) => match self.domains.validate_domain(domain).await {
                Ok(check) => (check.authenticated, false),
                Err(e) => {
                    tracing::warn!(company_id, domain, error = %e, "live domain check failed");
                    (false, true)
                }
            },
        };

        Ok(VerificationStatus {
            progress: VerificationProgress::derive(&settings, authenticated),
            settings,
            domain_check_failed,
        })
    }

    pub async fn create_sender(
        &self,
        company_id: i64,
        email: &str,
        name: &str,
    ) -> Result<SenderRegistration, VerificationError> {
        let email = validate_email(email)?;
        let name = validate_sender_name(name)?;

        let current = self.settings(company_id).await?;
        if current.is_verified {
            return Err(VerificationError::AlreadyExists(
                "A verified sender already exists; use the sender update flow".to_string(),
            ));
        }
        if current.has_sender() {
            return Err(VerificationError::AlreadyExists(
                "A sender is already awaiting OTP verification".to_string(),
            ));
        }

        let created = self
            .senders
            .create_sender(&email, &name)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::CreateSender))?;

        let settings = self
            .settings
            .merge(
                company_id,
                SettingsPatch::new().sender(&created.id, &email, &name),
            )
            .await?;

        tracing::info!(company_id, sender_id = %created.id, "sender created, awaiting OTP");
        Ok(SenderRegistration {
            settings,
            spf_error: created.spf_error,
            dkim_error: created.dkim_error,
        })
    }

    pub async fn validate_otp(
        &self,
        company_id: i64,
        otp: &str,
    ) -> Result<VerificationSettings, VerificationError> {
        let otp = validate_otp_code(otp)?;
        let current = self.settings(company_id).await?;
        let sender_id = current.sender_id.clone().ok_or(VerificationError::NoSender)?;

        if current.has_pending_sender() {
            return Err(VerificationError::Validation(
                "A sender update is pending; confirm its code with PATCH /verification"
                    .to_string(),
            ));
        }
        if current.is_verified {
            return Ok(current);
        }

        self.senders
            .validate_otp(&otp, &sender_id)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::ValidateOtp))?;

        let settings = self
            .settings
            .merge(company_id, SettingsPatch::new().verified())
            .await?;

        tracing::info!(company_id, sender_id = %sender_id, "sender verified");
        Ok(settings)
    }

    /// First half of replacing a verified sender: register the new identity
    /// upstream and park it as pending. The verified sender keeps being used
    /// until [`confirm_sender_update`](Self::confirm_sender_update) succeeds.
    pub async fn begin_sender_update(
        &self,
        company_id: i64,
        email: &str,
        name: &str,
        confirmed: bool,
    ) -> Result<SenderRegistration, VerificationError> {
        if !confirmed {
            return Err(VerificationError::Validation(
                "Replacing the verified sender must be confirmed".to_string(),
            ));
        }
        let email = validate_email(email)?;
        let name = validate_sender_name(name)?;

        let current = self.settings(company_id).await?;
        if !current.is_verified {
            return Err(VerificationError::Validation(
                "There is no verified sender to replace".to_string(),
            ));
        }
        if current.has_pending_sender() {
            return Err(VerificationError::AlreadyExists(
                "A sender update is already awaiting OTP verification".to_string(),
            ));
        }

        let created = self
            .senders
            .create_sender(&email, &name)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::CreateSender))?;

        let settings = self
            .settings
            .merge(
                company_id,
                SettingsPatch::new().pending_sender(&created.id, &email, &name),
            )
            .await?;

        tracing::info!(company_id, pending_sender_id = %created.id, "sender update started");
        Ok(SenderRegistration {
            settings,
            spf_error: created.spf_error,
            dkim_error: created.dkim_error,
        })
    }

    /// Second half of the update flow: validate the pending sender's OTP and
    /// swap it in with a single row write.
    pub async fn confirm_sender_update(
        &self,
        company_id: i64,
        otp: &str,
        email: Option<&str>,
        name: Option<&str>,
    ) -> Result<VerificationSettings, VerificationError> {
        let otp = validate_otp_code(otp)?;
        let current = self.settings(company_id).await?;
        let pending_id = current.pending_sender_id.clone().ok_or_else(|| {
            VerificationError::Validation("No sender update is in progress".to_string())
        })?;
        let pending_email = current.pending_sender_email.clone().unwrap_or_default();

        if let Some(email) = email {
            if !email.trim().eq_ignore_ascii_case(&pending_email) {
                return Err(VerificationError::Validation(
                    "Email does not match the sender awaiting verification".to_string(),
                ));
            }
        }
        let new_name = match name {
            Some(name) => validate_sender_name(name)?,
            None => current.pending_sender_name.clone().unwrap_or_default(),
        };

        self.senders
            .validate_otp(&otp, &pending_id)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::ValidateOtp))?;

        let patch = SettingsPatch::new()
            .sender(&pending_id, &pending_email, &new_name)
            .verified()
            .clear_pending_sender();
        let settings = self.settings.merge(company_id, patch).await?;

        tracing::info!(company_id, sender_id = %pending_id, "sender replaced");
        Ok(settings)
    }

    /// Abandon a pending sender update. The verified sender stays
    /// authoritative. The abandoned identity is not revoked upstream.
    pub async fn cancel_sender_update(
        &self,
        company_id: i64,
    ) -> Result<VerificationSettings, VerificationError> {
        let current = self.settings(company_id).await?;
        let Some(pending_id) = current.pending_sender_id.clone() else {
            return Ok(current);
        };

        let settings = self
            .settings
            .merge(company_id, SettingsPatch::new().clear_pending_sender())
            .await?;

        tracing::warn!(
            company_id,
            pending_sender_id = %pending_id,
            "sender update abandoned; upstream identity left in place"
        );
        Ok(settings)
    }

    pub async fn complete_prevention_step(
        &self,
        company_id: i64,
        step: u8,
    ) -> Result<VerificationSettings, VerificationError> {
        match step {
            1 => Err(VerificationError::Validation(
                "Step 1 is completed by verifying the sender".to_string(),
            )),
            2 => {
                let current = self.settings(company_id).await?;
                let domain = current.domain.clone().ok_or(VerificationError::NoDomain)?;
                let check = self
                    .domains
                    .validate_domain(&domain)
                    .await
                    .map_err(VerificationError::upstream(VerificationPhase::ValidateDomain))?;
                if !check.authenticated {
                    return Err(VerificationError::DomainNotAuthenticated);
                }
                Ok(self
                    .settings
                    .merge(company_id, SettingsPatch::new().step(2, true))
                    .await?)
            }
            3 => Ok(self
                .settings
                .merge(company_id, SettingsPatch::new().step(3, true))
                .await?),
            other => Err(VerificationError::Validation(format!(
                "Unknown prevention step: {}",
                other
            ))),
        }
    }

    pub async fn setup_domain(
        &self,
        company_id: i64,
        domain: &str,
    ) -> Result<VerificationSettings, VerificationError> {
        let domain = validate_domain(domain)?;
        let current = self.settings(company_id).await?;
        if let Some(existing) = current.domain.as_deref() {
            return Err(VerificationError::AlreadyExists(format!(
                "Domain {} is already configured; confirm it to replace it",
                existing
            )));
        }

        self.register_domain(company_id, &domain, SettingsPatch::new())
            .await
    }

    /// Read-only live check; safe to poll.
    pub async fn check_domain(&self, company_id: i64) -> Result<DomainStatus, VerificationError> {
        let current = self.settings(company_id).await?;
        let domain = current.domain.ok_or(VerificationError::NoDomain)?;

        let check = self
            .domains
            .validate_domain(&domain)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::ValidateDomain))?;

        Ok(DomainStatus { domain, check })
    }

    /// Request authentication, then re-validate. Upstream authentication is
    /// asynchronous; callers keep polling [`check_domain`](Self::check_domain)
    /// until `authenticated` turns true.
    pub async fn authenticate_domain(
        &self,
        company_id: i64,
    ) -> Result<DomainStatus, VerificationError> {
        let current = self.settings(company_id).await?;
        let domain = current.domain.ok_or(VerificationError::NoDomain)?;

        self.domains
            .authenticate_domain(&domain)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::AuthenticateDomain))?;

        let check = self
            .domains
            .validate_domain(&domain)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::ValidateDomain))?;

        Ok(DomainStatus { domain, check })
    }

    /// Replace the configured domain. `confirm_current` must repeat the
    /// stored domain exactly.
    pub async fn update_domain(
        &self,
        company_id: i64,
        confirm_current: &str,
        new_domain: &str,
    ) -> Result<VerificationSettings, VerificationError> {
        let current = self.settings(company_id).await?;
        let existing = current.domain.clone().ok_or(VerificationError::NoDomain)?;

        if confirm_current.trim() != existing {
            return Err(VerificationError::ConfirmationMismatch);
        }

        let new_domain = validate_domain(new_domain)?;
        if new_domain == existing {
            return Err(VerificationError::Validation(
                "The new domain is the same as the current one".to_string(),
            ));
        }

        // A new domain has to be authenticated from scratch.
        self.register_domain(company_id, &new_domain, SettingsPatch::new().step(2, false))
            .await
    }

    async fn register_domain(
        &self,
        company_id: i64,
        domain: &str,
        extra: SettingsPatch,
    ) -> Result<VerificationSettings, VerificationError> {
        let created = self
            .domains
            .create_domain(domain)
            .await
            .map_err(VerificationError::upstream(VerificationPhase::CreateDomain))?;

        let patch = extra.domain(domain, created.id.as_deref(), created.dns_records);
        let settings = self.settings.merge(company_id, patch).await?;

        tracing::info!(company_id, domain, "domain registered, awaiting DNS");
        Ok(settings)
    }
}

fn validate_email(email: &str) -> Result<String, VerificationError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(VerificationError::Validation("Email is required".to_string()));
    }
    if email.len() > 255 || !EMAIL_RE.is_match(email) {
        return Err(VerificationError::Validation(
            "Email address is not valid".to_string(),
        ));
    }
    Ok(email.to_string())
}

fn validate_sender_name(name: &str) -> Result<String, VerificationError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(VerificationError::Validation(
            "Sender name is required".to_string(),
        ));
    }
    if name.chars().count() > MAX_SENDER_NAME_LEN {
        return Err(VerificationError::Validation(format!(
            "Sender name must be at most {} characters",
            MAX_SENDER_NAME_LEN
        )));
    }
    Ok(name.to_string())
}

fn validate_otp_code(otp: &str) -> Result<String, VerificationError> {
    let otp = otp.trim();
    if otp.is_empty() {
        return Err(VerificationError::Validation("OTP is required".to_string()));
    }
    if !(4..=10).contains(&otp.len()) || !otp.chars().all(|c| c.is_ascii_digit()) {
        return Err(VerificationError::Validation(
            "OTP must be a numeric code".to_string(),
        ));
    }
    Ok(otp.to_string())
}

fn validate_domain(domain: &str) -> Result<String, VerificationError> {
    let domain = domain.trim().trim_end_matches('.').to_ascii_lowercase();
    if domain.is_empty() {
        return Err(VerificationError::Validation("Domain is required".to_string()));
    }
    if domain.len() > 253 || !DOMAIN_RE.is_match(&domain) {
        return Err(VerificationError::Validation(format!(
            "{} is not a valid domain name",
            domain
        )));
    }
    Ok(domain)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::verification::DnsRecord;
    use crate::repositories::settings_repository::MockVerificationSettingsRepository;
    use crate::services::domain_gateway::MockDomainGateway;
    use crate::services::gateway::{CreatedDomain, CreatedSender};
    use crate::services::sender_gateway::MockSenderGateway;
    use mockall::predicate::*;

    fn service(
        repo: MockVerificationSettingsRepository,
        senders: MockSenderGateway,
        domains: MockDomainGateway,
    ) -> VerificationService {
        VerificationService::new(Arc::new(repo), Arc::new(senders), Arc::new(domains))
    }

    fn stored(settings: VerificationSettings) -> MockVerificationSettingsRepository {
        let mut repo = MockVerificationSettingsRepository::new();
        repo.expect_find().returning(move |_| {
            let settings = settings.clone();
            Box::pin(async move { Ok(Some(settings)) })
        });
        repo
    }

    fn with_sender(verified: bool) -> VerificationSettings {
        let mut settings = VerificationSettings::empty(1);
        settings.apply(SettingsPatch::new().sender("snd-1", "a@b.com", "A"));
        if verified {
            settings.apply(SettingsPatch::new().verified());
        }
        settings
    }

    #[tokio::test]
    async fn test_create_sender_persists_after_upstream_success() {
        let mut repo = MockVerificationSettingsRepository::new();
        repo.expect_find()
            .returning(|_| Box::pin(async { Ok(None) }));
        repo.expect_merge()
            .withf(|company_id, patch| {
                *company_id == 1
                    && patch.sender_id == Some(Some("snd-9".to_string()))
                    && patch.is_verified == Some(false)
            })
            .times(1)
            .returning(|company_id, patch| {
                Box::pin(async move {
                    let mut settings = VerificationSettings::empty(company_id);
                    settings.apply(patch);
                    Ok(settings)
                })
            });

        let mut senders = MockSenderGateway::new();
        senders
            .expect_create_sender()
            .with(eq("a@b.com"), eq("A"))
            .times(1)
            .returning(|_, _| {
                Box::pin(async {
                    Ok(CreatedSender {
                        id: "snd-9".to_string(),
                        spf_error: true,
                        dkim_error: false,
                    })
                })
            });

        let service = service(repo, senders, MockDomainGateway::new());
        let result = service.create_sender(1, " a@b.com ", "A").await.unwrap();

        assert_eq!(result.settings.sender_id.as_deref(), Some("snd-9"));
        assert!(!result.settings.is_verified);
        assert!(result.spf_error);
    }

    #[tokio::test]
    async fn test_create_sender_rejects_existing_sender_without_upstream_call() {
        let mut senders = MockSenderGateway::new();
        senders.expect_create_sender().times(0);

        let service = service(stored(with_sender(false)), senders, MockDomainGateway::new());
        let result = service.create_sender(1, "c@d.com", "C").await;

        assert!(matches!(result, Err(VerificationError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_upstream_failure_leaves_settings_untouched() {
        let mut repo = MockVerificationSettingsRepository::new();
        repo.expect_find()
            .returning(|_| Box::pin(async { Ok(None) }));
        repo.expect_merge().times(0);

        let mut senders = MockSenderGateway::new();
        senders.expect_create_sender().returning(|_, _| {
            Box::pin(async {
                Err(GatewayError::Rejected {
                    status: 400,
                    message: "sender already exists".to_string(),
                })
            })
        });

        let service = service(repo, senders, MockDomainGateway::new());
        let err = service.create_sender(1, "a@b.com", "A").await.unwrap_err();

        match err {
            VerificationError::Upstream { phase, source } => {
                assert_eq!(phase, VerificationPhase::CreateSender);
                assert_eq!(source.public_message(), "sender already exists");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_invalid_code_is_not_wrapped() {
        let mut repo = stored(with_sender(false));
        repo.expect_merge().times(0);

        let mut senders = MockSenderGateway::new();
        senders
            .expect_validate_otp()
            .with(eq("000000"), eq("snd-1"))
            .returning(|_, _| Box::pin(async { Err(GatewayError::InvalidCode) }));

        let service = service(repo, senders, MockDomainGateway::new());
        let result = service.validate_otp(1, "000000").await;

        assert!(matches!(result, Err(VerificationError::InvalidCode)));
    }

    #[tokio::test]
    async fn test_validate_otp_when_already_verified_is_a_no_op() {
        let mut senders = MockSenderGateway::new();
        senders.expect_validate_otp().times(0);

        let service = service(stored(with_sender(true)), senders, MockDomainGateway::new());
        let settings = service.validate_otp(1, "123456").await.unwrap();
        assert!(settings.is_verified);
    }

    #[tokio::test]
    async fn test_update_domain_requires_exact_confirmation() {
        let mut settings = VerificationSettings::empty(1);
        settings.apply(SettingsPatch::new().domain("a.com", Some("7"), Vec::new()));

        let mut domains = MockDomainGateway::new();
        domains.expect_create_domain().times(0);

        let service = service(stored(settings), MockSenderGateway::new(), domains);
        let result = service.update_domain(1, "wrong.com", "b.com").await;
        assert!(matches!(result, Err(VerificationError::ConfirmationMismatch)));
    }

    #[tokio::test]
    async fn test_update_domain_resets_stored_step2() {
        let mut settings = VerificationSettings::empty(1);
        settings.apply(
            SettingsPatch::new()
                .domain("a.com", Some("7"), Vec::new())
                .step(2, true),
        );

        let mut repo = stored(settings.clone());
        repo.expect_merge()
            .withf(|_, patch| patch.step2 == Some(false) && patch.domain == Some(Some("b.com".to_string())))
            .times(1)
            .returning(move |_, patch| {
                let mut updated = settings.clone();
                updated.apply(patch);
                Box::pin(async move { Ok(updated) })
            });

        let mut domains = MockDomainGateway::new();
        domains
            .expect_create_domain()
            .with(eq("b.com"))
            .returning(|_| {
                Box::pin(async {
                    Ok(CreatedDomain {
                        id: Some("8".to_string()),
                        dns_records: vec![DnsRecord {
                            name: "dkim_record".to_string(),
                            record_type: "TXT".to_string(),
                            host_name: "mail._domainkey".to_string(),
                            value: "k=rsa".to_string(),
                            status: false,
                        }],
                    })
                })
            });

        let service = service(repo, MockSenderGateway::new(), domains);
        let updated = service.update_domain(1, "a.com", "B.com").await.unwrap();

        assert_eq!(updated.domain.as_deref(), Some("b.com"));
        assert_eq!(updated.domain_brevo_id.as_deref(), Some("8"));
        assert!(!updated.prevention_steps.step2);
        assert_eq!(updated.domain_dns_records.len(), 1);
    }

    #[tokio::test]
    async fn test_step2_requires_live_authentication() {
        let mut settings = VerificationSettings::empty(1);
        settings.apply(SettingsPatch::new().domain("a.com", None, Vec::new()));

        let mut repo = stored(settings);
        repo.expect_merge().times(0);

        let mut domains = MockDomainGateway::new();
        domains.expect_validate_domain().returning(|_| {
            Box::pin(async {
                Ok(DomainCheck {
                    verified: true,
                    authenticated: false,
                    dns_records: Vec::new(),
                })
            })
        });

        let service = service(repo, MockSenderGateway::new(), domains);
        let result = service.complete_prevention_step(1, 2).await;
        assert!(matches!(result, Err(VerificationError::DomainNotAuthenticated)));
    }

    #[test]
    fn test_input_validation() {
        assert!(validate_email("a@b.com").is_ok());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("").is_err());

        assert_eq!(validate_domain(" Example.COM. ").unwrap(), "example.com");
        assert!(validate_domain("exa mple.com").is_err());
        assert!(validate_domain("localhost").is_err());
        assert!(validate_domain("-bad.com").is_err());

        assert!(validate_otp_code("123456").is_ok());
        assert!(validate_otp_code("12ab56").is_err());
        assert!(validate_otp_code("").is_err());

        assert!(validate_sender_name("  ").is_err());
        assert!(validate_sender_name(&"x".repeat(101)).is_err());
    }
}
