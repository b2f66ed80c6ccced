pub mod company;
pub mod onboarding;
pub mod session;
pub mod verification;


pub use company::{Company, CompanyRole, Profile};
pub use onboarding::{
    compute_completion, OnboardingProgress, OnboardingState, StepTransition, TechStack,
};
pub use session::{ApiSession, AuthenticatedProfile};
pub use verification::{
    DnsRecord, DomainState, PreventionSteps, SenderState, SettingsPatch, VerificationProgress,
    VerificationSettings,
};
