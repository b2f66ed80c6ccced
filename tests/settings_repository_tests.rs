use sharewatch::{
    models::{DnsRecord, SettingsPatch},
    repositories::{
        RepositoryError, SqliteVerificationSettingsRepository, VerificationSettingsRepository,
    },
    test_utils::test_helpers,
};

async fn setup() -> (sqlx::SqlitePool, SqliteVerificationSettingsRepository, i64) {
    let pool = test_helpers::create_test_db().await.unwrap();
    let company_id = test_helpers::insert_test_company(&pool, "Acme")
        .await
        .unwrap();
    let repository = SqliteVerificationSettingsRepository::new(pool.clone());
    (pool, repository, company_id)
}

#[tokio::test]
async fn test_find_missing_row_is_none() {
    let (_pool, repository, company_id) = setup().await;
    assert!(repository.find(company_id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_merge_creates_row_on_first_write() {
    let (_pool, repository, company_id) = setup().await;

    let merged = repository
        .merge(company_id, SettingsPatch::new().step(3, true))
        .await
        .unwrap();
    assert!(merged.prevention_steps.step3);

    let stored = repository.find(company_id).await.unwrap().unwrap();
    assert_eq!(stored, merged);
    assert!(!stored.is_verified);
    assert!(stored.domain_dns_records.is_empty());
}

#[tokio::test]
async fn test_merge_keeps_fields_not_in_patch() {
    let (_pool, repository, company_id) = setup().await;

    repository
        .merge(
            company_id,
            SettingsPatch::new().sender("snd-1", "hello@acme.test", "Acme"),
        )
        .await
        .unwrap();

    let records = vec![DnsRecord {
        name: "dkim_record".to_string(),
        record_type: "TXT".to_string(),
        host_name: "mail._domainkey".to_string(),
        value: "k=rsa".to_string(),
        status: false,
    }];
    repository
        .merge(
            company_id,
            SettingsPatch::new().domain("acme.test", Some("7"), records.clone()),
        )
        .await
        .unwrap();

    let stored = repository.find(company_id).await.unwrap().unwrap();
    assert_eq!(stored.sender_id.as_deref(), Some("snd-1"));
    assert_eq!(stored.sender_email.as_deref(), Some("hello@acme.test"));
    assert_eq!(stored.domain.as_deref(), Some("acme.test"));
    assert_eq!(stored.domain_brevo_id.as_deref(), Some("7"));
    assert_eq!(stored.domain_dns_records, records);
}

#[tokio::test]
async fn test_merge_can_clear_nullable_fields() {
    let (_pool, repository, company_id) = setup().await;

    repository
        .merge(
            company_id,
            SettingsPatch::new()
                .sender("snd-1", "a@acme.test", "A")
                .verified()
                .pending_sender("snd-2", "b@acme.test", "B"),
        )
        .await
        .unwrap();
    repository
        .merge(company_id, SettingsPatch::new().clear_pending_sender())
        .await
        .unwrap();

    let stored = repository.find(company_id).await.unwrap().unwrap();
    assert_eq!(stored.pending_sender_id, None);
    assert_eq!(stored.pending_sender_email, None);
    assert_eq!(stored.sender_id.as_deref(), Some("snd-1"));
    assert!(stored.is_verified);
    assert!(stored.prevention_steps.step1);
}

#[tokio::test]
async fn test_merge_for_unknown_company_is_not_found() {
    let (_pool, repository, _company_id) = setup().await;

    let result = repository
        .merge(9999, SettingsPatch::new().step(3, true))
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn test_unknown_schema_version_is_rejected() {
    let (pool, repository, company_id) = setup().await;
    repository
        .merge(company_id, SettingsPatch::new().step(3, true))
        .await
        .unwrap();

    sqlx::query("UPDATE company_verification_settings SET schema_version = 2 WHERE company_id = ?")
        .bind(company_id)
        .execute(&pool)
        .await
        .unwrap();

    let result = repository.find(company_id).await;
    assert!(matches!(result, Err(RepositoryError::CorruptState(_))));
}

#[tokio::test]
async fn test_unknown_json_shape_is_rejected() {
    let (pool, repository, company_id) = setup().await;
    repository
        .merge(company_id, SettingsPatch::new().step(3, true))
        .await
        .unwrap();

    sqlx::query(
        "UPDATE company_verification_settings SET prevention_steps = ? WHERE company_id = ?",
    )
    .bind(r#"{"step1":true,"legacy_flag":1}"#)
    .bind(company_id)
    .execute(&pool)
    .await
    .unwrap();

    let result = repository.find(company_id).await;
    assert!(matches!(result, Err(RepositoryError::CorruptState(_))));
}

#[tokio::test]
async fn test_missing_step_keys_read_as_false() {
    let (pool, repository, company_id) = setup().await;
    repository
        .merge(company_id, SettingsPatch::new())
        .await
        .unwrap();

    sqlx::query(
        "UPDATE company_verification_settings SET prevention_steps = ? WHERE company_id = ?",
    )
    .bind(r#"{"step3":true}"#)
    .bind(company_id)
    .execute(&pool)
    .await
    .unwrap();

    let stored = repository.find(company_id).await.unwrap().unwrap();
    assert!(!stored.prevention_steps.step1);
    assert!(!stored.prevention_steps.step2);
    assert!(stored.prevention_steps.step3);
}

#[tokio::test]
async fn test_verified_row_always_reports_step1() {
    let (pool, repository, company_id) = setup().await;
    repository
        .merge(
            company_id,
            SettingsPatch::new().sender("snd-1", "a@acme.test", "A").verified(),
        )
        .await
        .unwrap();

    // A row written by an older client with the flags out of sync.
    sqlx::query(
        "UPDATE company_verification_settings SET prevention_steps = ? WHERE company_id = ?",
    )
    .bind(r#"{"step1":false,"step2":false,"step3":false}"#)
    .bind(company_id)
    .execute(&pool)
    .await
    .unwrap();

    let stored = repository.find(company_id).await.unwrap().unwrap();
    assert!(stored.prevention_steps.step1);
}

#[tokio::test]
async fn test_settings_are_removed_with_company() {
    let (pool, repository, company_id) = setup().await;
    repository
        .merge(company_id, SettingsPatch::new().step(3, true))
        .await
        .unwrap();

    sqlx::query("DELETE FROM companies WHERE id = ?")
        .bind(company_id)
        .execute(&pool)
        .await
        .unwrap();

    assert!(repository.find(company_id).await.unwrap().is_none());
}
