use crate::models::onboarding::{
    compute_completion, OnboardingProgress, OnboardingState, StepTransition, TechStack,
};
use crate::repositories::{OnboardingRepository, RepositoryError};
use serde::Serialize;
use std::sync::Arc;

const MAX_SCREEN_LEN: usize = 64;

#[derive(Debug, thiserror::Error)]
pub enum OnboardingError {
    #[error("At least one tech stack must be selected")]
    NoStackSelected,
    #[error("Unknown step '{step}' for {stack}")]
    UnknownStep { stack: TechStack, step: String },
    #[error("Invalid screen name")]
    InvalidScreen,
    #[error("Company not found")]
    CompanyNotFound,
    #[error("Repository error: {0}")]
    Repository(RepositoryError),
}

impl From<RepositoryError> for OnboardingError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => OnboardingError::CompanyNotFound,
            other => OnboardingError::Repository(other),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StepOutcome {
    pub transition: StepTransition,
    #[serde(flatten)]
    pub progress: OnboardingProgress,
}

pub struct OnboardingService {
    repository: Arc<dyn OnboardingRepository>,
}

impl OnboardingService {
    pub fn new(repository: Arc<dyn OnboardingRepository>) -> Self {
        Self { repository }
    }

    /// Current progress. The first read of a company creates its row.
    pub async fn progress(&self, company_id: i64) -> Result<OnboardingProgress, OnboardingError> {
        match self.repository.find(company_id).await? {
            Some(progress) => Ok(progress),
            None => Ok(self.repository.insert_default(company_id).await?),
        }
    }

    pub async fn select_tech_stacks(
        &self,
        company_id: i64,
        stacks: Vec<TechStack>,
    ) -> Result<OnboardingProgress, OnboardingError> {
        if stacks.is_empty() {
            return Err(OnboardingError::NoStackSelected);
        }

        let mut state = self.progress(company_id).await?.state;
        state.select_stacks(stacks);
        self.store(company_id, state, None).await
    }

    pub async fn complete_step(
        &self,
        company_id: i64,
        stack: TechStack,
        step: &str,
    ) -> Result<StepOutcome, OnboardingError> {
        let current = self.progress(company_id).await?;
        let mut state = current.state.clone();

        let transition = state.mark_step(stack, step.trim());
        match transition {
            StepTransition::UnknownStep => {
                return Err(OnboardingError::UnknownStep {
                    stack,
                    step: step.to_string(),
                })
            }
            StepTransition::Applied => {
                tracing::info!(company_id, %stack, step, "onboarding step completed");
            }
            StepTransition::Blocked { waiting_on } => {
                tracing::debug!(company_id, %stack, step, waiting_on, "onboarding step blocked");
            }
            StepTransition::AlreadyComplete => {}
        }

        let progress = if transition.changed_state() {
            self.store(company_id, state, None).await?
        } else {
            current
        };

        Ok(StepOutcome {
            transition,
            progress,
        })
    }

    pub async fn set_last_screen(
        &self,
        company_id: i64,
        screen: &str,
    ) -> Result<OnboardingProgress, OnboardingError> {
        let screen = validate_screen(screen)?;

        let mut state = self.progress(company_id).await?.state;
        state.last_screen = Some(screen);
        self.store(company_id, state, None).await
    }

    /// Apply a client-submitted state. Steps are merged through the state
    /// machine, so the submission can never skip ahead or clear a step.
    /// `completed_override` is stored as given for this write only.
    pub async fn replace(
        &self,
        company_id: i64,
        mut incoming: OnboardingState,
        completed_override: Option<bool>,
    ) -> Result<OnboardingProgress, OnboardingError> {
        if incoming.selected_tech_stacks.is_empty() {
            return Err(OnboardingError::NoStackSelected);
        }
        if let Some(screen) = incoming.last_screen.as_deref() {
            incoming.last_screen = Some(validate_screen(screen)?);
        }

        let mut state = self.progress(company_id).await?.state;
        let applied = state.merge_from(&incoming);
        tracing::debug!(company_id, applied, "onboarding state merged");

        self.store(company_id, state, completed_override).await
    }

    /// Put the checklist back to all-false. This is the only path that
    /// clears a completed step.
    pub async fn reset(&self, company_id: i64) -> Result<OnboardingProgress, OnboardingError> {
        let state = OnboardingState::default();
        self.repository.save(company_id, &state, false).await?;
        tracing::info!(company_id, "onboarding reset");

        Ok(OnboardingProgress {
            state,
            completed: false,
        })
    }

    async fn store(
        &self,
        company_id: i64,
        mut state: OnboardingState,
        completed_override: Option<bool>,
    ) -> Result<OnboardingProgress, OnboardingError> {
        let completed = match completed_override {
            Some(forced) => {
                state.record_satisfied_stacks();
                forced
            }
            None => {
                let completed = compute_completion(&state);
                state.record_completion(completed);
                completed
            }
        };

        self.repository.save(company_id, &state, completed).await?;
        if completed {
            tracing::info!(company_id, "onboarding complete");
        }

        Ok(OnboardingProgress { state, completed })
    }
}

fn validate_screen(screen: &str) -> Result<String, OnboardingError> {
    let screen = screen.trim();
    if screen.is_empty()
        || screen.len() > MAX_SCREEN_LEN
        || !screen
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(OnboardingError::InvalidScreen);
    }
    Ok(screen.to_string())
}
