use super::{required, ApiJson, ApiResponse, ApiResult};
use crate::auth::{ensure_admin, ensure_member, AuthenticatedProfile};
use crate::error::AppError;
use crate::models::{OnboardingProgress, OnboardingState, TechStack};
use crate::services::StepOutcome;
use crate::AppState;
use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct ReplaceOnboardingBody {
    pub state: Option<OnboardingState>,
    pub completed: Option<bool>,
    /// Shortcut for selecting stacks without sending a whole state.
    #[serde(rename = "selectedTechStacks")]
    pub selected_tech_stacks: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
pub struct CompleteStepBody {
    pub stack: Option<String>,
    pub step: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ScreenBody {
    pub screen: Option<String>,
}

fn parse_stack(raw: &str) -> Result<TechStack, AppError> {
    raw.parse::<TechStack>().map_err(AppError::Validation)
}

pub async fn get_onboarding(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<OnboardingProgress> {
    ensure_member(&caller, company_id)?;
    let progress = state.onboarding_service.progress(company_id).await?;
    Ok(ApiResponse::ok(progress))
}

pub async fn replace_onboarding(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<ReplaceOnboardingBody>,
) -> ApiResult<OnboardingProgress> {
    ensure_admin(&caller, company_id)?;

    let progress = match (body.state, body.selected_tech_stacks) {
        (Some(incoming), _) => {
            state
                .onboarding_service
                .replace(company_id, incoming, body.completed)
                .await?
        }
        (None, Some(stacks)) => {
            let stacks = stacks
                .iter()
                .map(|s| parse_stack(s))
                .collect::<Result<Vec<_>, _>>()?;
            state
                .onboarding_service
                .select_tech_stacks(company_id, stacks)
                .await?
        }
        (None, None) => return Err(AppError::Validation("state is required".to_string())),
    };

    Ok(ApiResponse::ok(progress))
}

pub async fn complete_step(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<CompleteStepBody>,
) -> ApiResult<StepOutcome> {
    ensure_admin(&caller, company_id)?;
    let stack = parse_stack(required(&body.stack, "stack")?)?;
    let step = required(&body.step, "step")?;

    let outcome = state
        .onboarding_service
        .complete_step(company_id, stack, step)
        .await?;
    Ok(ApiResponse::ok(outcome))
}

pub async fn set_screen(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<ScreenBody>,
) -> ApiResult<OnboardingProgress> {
    ensure_admin(&caller, company_id)?;
    let screen = required(&body.screen, "screen")?;

    let progress = state
        .onboarding_service
        .set_last_screen(company_id, screen)
        .await?;
    Ok(ApiResponse::ok(progress))
}

pub async fn reset_onboarding(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<OnboardingProgress> {
    ensure_admin(&caller, company_id)?;
    let progress = state.onboarding_service.reset(company_id).await?;
    Ok(ApiResponse::ok(progress))
}
