pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use config::GatewayConfig;
use repositories::{
    SqliteCompanyRepository, SqliteOnboardingRepository, SqliteVerificationSettingsRepository,
};
use services::{
    AuthService, BrevoDomainGateway, CompanyService, DomainGateway, GatewayError,
    HttpSenderGateway, OnboardingService, SenderGateway, VerificationService,
};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub company_service: Arc<CompanyService>,
    pub verification_service: Arc<VerificationService>,
    pub onboarding_service: Arc<OnboardingService>,
    pub pool: sqlx::SqlitePool,
}

impl AppState {
    /// Wire the SQLite repositories with the given gateways.
    pub fn with_gateways(
        pool: sqlx::SqlitePool,
        senders: Arc<dyn SenderGateway>,
        domains: Arc<dyn DomainGateway>,
    ) -> Self {
        let company_repository = Arc::new(SqliteCompanyRepository::new(pool.clone()));
        let settings_repository = Arc::new(SqliteVerificationSettingsRepository::new(pool.clone()));
        let onboarding_repository = Arc::new(SqliteOnboardingRepository::new(pool.clone()));

        AppState {
            auth_service: Arc::new(AuthService::new(pool.clone(), company_repository.clone())),
            company_service: Arc::new(CompanyService::new(company_repository)),
            verification_service: Arc::new(VerificationService::new(
                settings_repository,
                senders,
                domains,
            )),
            onboarding_service: Arc::new(OnboardingService::new(onboarding_repository)),
            pool,
        }
    }

    /// Production wiring: HTTP gateways built from `gateway`.
    pub fn new(pool: sqlx::SqlitePool, gateway: &GatewayConfig) -> Result<Self, GatewayError> {
        Ok(Self::with_gateways(
            pool,
            Arc::new(HttpSenderGateway::new(gateway)?),
            Arc::new(BrevoDomainGateway::new(gateway)?),
        ))
    }
}
