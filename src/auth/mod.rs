//! Bearer sessions and tenant guards.
//!
//! Every `/api` route runs behind [`middleware::require_session`]. Handlers
//! then call [`ensure_member`] for reads and [`ensure_admin`] for writes on
//! the company named in the path.

pub mod middleware;

pub use crate::models::session::AuthenticatedProfile;
pub use middleware::{extract_bearer_token, require_session};

use crate::error::AppError;

pub fn ensure_member(caller: &AuthenticatedProfile, company_id: i64) -> Result<(), AppError> {
    if caller.belongs_to(company_id) {
        Ok(())
    } else {
        tracing::debug!(profile_id = caller.profile_id, company_id, "cross-tenant access denied");
        Err(AppError::Forbidden)
    }
}

pub fn ensure_admin(caller: &AuthenticatedProfile, company_id: i64) -> Result<(), AppError> {
    ensure_member(caller, company_id)?;
    if caller.is_admin_of(company_id) {
        Ok(())
    } else {
        Err(AppError::Forbidden)
    }
}
