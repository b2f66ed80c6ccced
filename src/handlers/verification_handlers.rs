use super::{required, ApiJson, ApiResponse, ApiResult};
use crate::auth::{ensure_admin, ensure_member, AuthenticatedProfile};
use crate::error::AppError;
use crate::models::VerificationSettings;
use crate::services::{DomainStatus, SenderRegistration, VerificationStatus};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Extension,
};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct CreateSenderBody {
    pub email: Option<String>,
    pub name: Option<String>,
}

/// `PUT /verification` carries either an OTP or a prevention step number.
#[derive(Debug, Deserialize)]
pub struct VerificationUpdateBody {
    pub otp: Option<String>,
    pub step: Option<u8>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmSenderUpdateBody {
    pub otp: Option<String>,
    pub email: Option<String>,
    pub name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BeginSenderUpdateBody {
    pub email: Option<String>,
    pub name: Option<String>,
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Deserialize)]
pub struct DomainBody {
    pub domain: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDomainBody {
    pub current_domain: Option<String>,
    pub domain: Option<String>,
}

pub async fn get_status(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<VerificationStatus> {
    ensure_member(&caller, company_id)?;
    let status = state.verification_service.status(company_id).await?;
    Ok(ApiResponse::ok(status))
}

pub async fn create_sender(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<CreateSenderBody>,
) -> ApiResult<SenderRegistration> {
    ensure_admin(&caller, company_id)?;
    let email = required(&body.email, "email")?;
    let name = required(&body.name, "name")?;

    let created = state
        .verification_service
        .create_sender(company_id, email, name)
        .await?;
    Ok(ApiResponse::ok(created))
}

pub async fn update_verification(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<VerificationUpdateBody>,
) -> ApiResult<VerificationSettings> {
    ensure_admin(&caller, company_id)?;

    let settings = match (&body.otp, body.step) {
        (Some(_), Some(_)) => {
            return Err(AppError::Validation(
                "Send either otp or step, not both".to_string(),
            ))
        }
        (Some(_), None) => {
            let otp = required(&body.otp, "otp")?;
            state
                .verification_service
                .validate_otp(company_id, otp)
                .await?
        }
        (None, Some(step)) => {
            state
                .verification_service
                .complete_prevention_step(company_id, step)
                .await?
        }
        (None, None) => return Err(AppError::Validation("otp or step is required".to_string())),
    };

    Ok(ApiResponse::ok(settings))
}

pub async fn confirm_sender_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<ConfirmSenderUpdateBody>,
) -> ApiResult<VerificationSettings> {
    ensure_admin(&caller, company_id)?;
    let otp = required(&body.otp, "otp")?;

    let settings = state
        .verification_service
        .confirm_sender_update(
            company_id,
            otp,
            body.email.as_deref(),
            body.name.as_deref(),
        )
        .await?;
    Ok(ApiResponse::ok(settings))
}

pub async fn begin_sender_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<BeginSenderUpdateBody>,
) -> ApiResult<SenderRegistration> {
    ensure_admin(&caller, company_id)?;
    let email = required(&body.email, "email")?;
    let name = required(&body.name, "name")?;

    let pending = state
        .verification_service
        .begin_sender_update(company_id, email, name, body.confirm)
        .await?;
    Ok(ApiResponse::ok(pending))
}

pub async fn cancel_sender_update(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<VerificationSettings> {
    ensure_admin(&caller, company_id)?;
    let settings = state
        .verification_service
        .cancel_sender_update(company_id)
        .await?;
    Ok(ApiResponse::ok(settings))
}

pub async fn setup_domain(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<DomainBody>,
) -> ApiResult<VerificationSettings> {
    ensure_admin(&caller, company_id)?;
    let domain = required(&body.domain, "domain")?;

    let settings = state
        .verification_service
        .setup_domain(company_id, domain)
        .await?;
    Ok(ApiResponse::ok(settings))
}

pub async fn check_domain(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<DomainStatus> {
    ensure_member(&caller, company_id)?;
    let status = state.verification_service.check_domain(company_id).await?;
    Ok(ApiResponse::ok(status))
}

pub async fn update_domain(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<UpdateDomainBody>,
) -> ApiResult<VerificationSettings> {
    ensure_admin(&caller, company_id)?;
    let current = required(&body.current_domain, "current_domain")?;
    let domain = required(&body.domain, "domain")?;

    let settings = state
        .verification_service
        .update_domain(company_id, current, domain)
        .await?;
    Ok(ApiResponse::ok(settings))
}

pub async fn authenticate_domain(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<DomainStatus> {
    ensure_admin(&caller, company_id)?;
    let status = state
        .verification_service
        .authenticate_domain(company_id)
        .await?;
    Ok(ApiResponse::ok(status))
}
