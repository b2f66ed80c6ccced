use chrono::{Duration, Utc};
use sharewatch::{
    models::CompanyRole,
    repositories::SqliteCompanyRepository,
    services::{AuthError, AuthService},
    test_utils::test_helpers,
};
use std::sync::Arc;

async fn setup() -> (AuthService, sqlx::SqlitePool, i64, i64) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let company_id = test_helpers::insert_test_company(&pool, "Acme")
        .await
        .unwrap();
    let profile_id = test_helpers::insert_test_profile(
        &pool,
        "admin@acme.test",
        Some(company_id),
        CompanyRole::Admin,
    )
    .await
    .unwrap();

    let auth_service = AuthService::new(
        pool.clone(),
        Arc::new(SqliteCompanyRepository::new(pool.clone())),
    );
    (auth_service, pool, company_id, profile_id)
}

#[tokio::test]
async fn test_issued_session_validates() {
    let (auth_service, _pool, company_id, profile_id) = setup().await;

    let issued = auth_service
        .issue_session(profile_id, Duration::hours(1))
        .await
        .unwrap();
    assert_eq!(issued.token.len(), 64);
    assert!(issued.expires_at > Utc::now().timestamp());

    let caller = auth_service.validate_session(&issued.token).await.unwrap();
    assert_eq!(caller.profile_id, profile_id);
    assert_eq!(caller.email, "admin@acme.test");
    assert!(caller.is_admin_of(company_id));
}

#[tokio::test]
async fn test_only_token_hash_is_stored() {
    let (auth_service, pool, _, profile_id) = setup().await;
    let issued = auth_service
        .issue_session(profile_id, Duration::hours(1))
        .await
        .unwrap();

    let stored: String = sqlx::query_scalar("SELECT token_hash FROM api_sessions")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_ne!(stored, issued.token);
    assert_eq!(stored, AuthService::hash_token(&issued.token));
}

#[tokio::test]
async fn test_unknown_token_is_invalid() {
    let (auth_service, _, _, _) = setup().await;
    let result = auth_service.validate_session("not-a-token").await;
    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn test_expired_session_is_rejected_and_purged() {
    let (auth_service, pool, _, profile_id) = setup().await;
    let token = test_helpers::insert_test_session(&pool, profile_id, Utc::now().timestamp() - 60)
        .await
        .unwrap();

    let result = auth_service.validate_session(&token).await;
    assert!(matches!(result, Err(AuthError::Expired)));

    assert_eq!(auth_service.purge_expired().await.unwrap(), 1);
    let result = auth_service.validate_session(&token).await;
    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn test_revoked_session_stops_working() {
    let (auth_service, _, _, profile_id) = setup().await;
    let issued = auth_service
        .issue_session(profile_id, Duration::hours(1))
        .await
        .unwrap();

    assert!(auth_service.revoke_session(&issued.token).await.unwrap());
    assert!(!auth_service.revoke_session(&issued.token).await.unwrap());

    let result = auth_service.validate_session(&issued.token).await;
    assert!(matches!(result, Err(AuthError::InvalidToken)));
}

#[tokio::test]
async fn test_issue_rejects_bad_input() {
    let (auth_service, _, _, profile_id) = setup().await;

    let result = auth_service.issue_session(profile_id, Duration::zero()).await;
    assert!(matches!(result, Err(AuthError::InvalidTtl)));

    let result = auth_service.issue_session(9999, Duration::hours(1)).await;
    assert!(matches!(result, Err(AuthError::ProfileNotFound)));
}

#[tokio::test]
async fn test_role_changes_apply_to_live_sessions() {
    let (auth_service, pool, company_id, profile_id) = setup().await;
    let issued = auth_service
        .issue_session(profile_id, Duration::hours(1))
        .await
        .unwrap();

    sqlx::query("UPDATE profiles SET company_role = 'member' WHERE id = ?")
        .bind(profile_id)
        .execute(&pool)
        .await
        .unwrap();

    let caller = auth_service.validate_session(&issued.token).await.unwrap();
    assert!(caller.belongs_to(company_id));
    assert!(!caller.is_admin_of(company_id));
}
