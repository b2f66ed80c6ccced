use crate::models::company::{CompanyRole, Profile};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct ApiSession {
    pub id: i64,
    pub token_hash: String,
    pub profile_id: i64,
    pub expires_at: i64,
    pub last_used_at: Option<i64>,
    pub created_at: i64,
}

/// Caller identity resolved from a bearer session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedProfile {
    pub profile_id: i64,
    pub email: String,
    pub company_id: Option<i64>,
    pub role: CompanyRole,
}

impl AuthenticatedProfile {
    pub fn from_profile(profile: &Profile) -> Self {
        Self {
            profile_id: profile.id,
            email: profile.email.clone(),
            company_id: profile.company_id,
            role: profile.company_role,
        }
    }

    pub fn belongs_to(&self, company_id: i64) -> bool {
        self.company_id == Some(company_id)
    }

    pub fn is_admin_of(&self, company_id: i64) -> bool {
        self.belongs_to(company_id) && self.role == CompanyRole::Admin
    }
}
