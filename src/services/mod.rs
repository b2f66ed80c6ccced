pub mod auth_service;
pub mod company_service;
pub mod domain_gateway;
pub mod gateway;
pub mod onboarding_service;
pub mod sender_gateway;
pub mod verification_service;

pub use auth_service::{AuthError, AuthService, IssuedSession};
pub use company_service::{CompanyService, CompanyServiceError, CompanyWithAdmin};
pub use domain_gateway::{BrevoDomainGateway, DomainGateway};
pub use gateway::{CreatedDomain, CreatedSender, DomainCheck, GatewayClient, GatewayError};
pub use onboarding_service::{OnboardingError, OnboardingService, StepOutcome};
pub use sender_gateway::{HttpSenderGateway, SenderGateway};
pub use verification_service::{
    DomainStatus, SenderRegistration, VerificationError, VerificationPhase, VerificationService,
    VerificationStatus,
};
