use super::{required, ApiJson, ApiResponse, ApiResult};
use crate::auth::{ensure_admin, ensure_member, AuthenticatedProfile};
use crate::error::AppError;
use crate::models::{Company, CompanyRole, Profile};
use crate::AppState;
use axum::{
    extract::{Path, State},
    Extension,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct CompanyView {
    #[serde(flatten)]
    pub company: Company,
    pub role: CompanyRole,
}

#[derive(Debug, Deserialize)]
pub struct AddMemberBody {
    pub email: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMemberBody {
    pub role: Option<String>,
}

fn parse_role(raw: Option<&str>) -> Result<CompanyRole, AppError> {
    match raw {
        None => Ok(CompanyRole::Member),
        Some(raw) => raw.parse().map_err(AppError::Validation),
    }
}

pub async fn get_company(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<CompanyView> {
    ensure_member(&caller, company_id)?;
    let company = state.company_service.company(company_id).await?;
    Ok(ApiResponse::ok(CompanyView {
        company,
        role: caller.role,
    }))
}

pub async fn list_members(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
) -> ApiResult<Vec<Profile>> {
    ensure_member(&caller, company_id)?;
    let members = state.company_service.members(company_id).await?;
    Ok(ApiResponse::ok(members))
}

pub async fn add_member(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path(company_id): Path<i64>,
    ApiJson(body): ApiJson<AddMemberBody>,
) -> ApiResult<Profile> {
    ensure_admin(&caller, company_id)?;
    let email = required(&body.email, "email")?;
    let role = parse_role(body.role.as_deref())?;

    let member = state
        .company_service
        .add_member(company_id, email, role)
        .await?;
    Ok(ApiResponse::ok(member))
}

pub async fn update_member(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path((company_id, profile_id)): Path<(i64, i64)>,
    ApiJson(body): ApiJson<UpdateMemberBody>,
) -> ApiResult<Profile> {
    ensure_admin(&caller, company_id)?;
    let role = parse_role(Some(required(&body.role, "role")?))?;

    let member = state
        .company_service
        .set_member_role(company_id, profile_id, role)
        .await?;
    Ok(ApiResponse::ok(member))
}

pub async fn remove_member(
    State(state): State<AppState>,
    Extension(caller): Extension<AuthenticatedProfile>,
    Path((company_id, profile_id)): Path<(i64, i64)>,
) -> ApiResult<()> {
    ensure_admin(&caller, company_id)?;
    state
        .company_service
        .remove_member(company_id, profile_id)
        .await?;
    Ok(ApiResponse::ok(()))
}
