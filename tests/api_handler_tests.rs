use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use sharewatch::{
    routes,
    test_utils::{
        fakes::{FakeDomainGateway, FakeSenderGateway},
        test_helpers::{self, TestTenant},
    },
    AppState,
};
use std::sync::Arc;
use tower::ServiceExt;

struct TestApp {
    app: Router,
    acme: TestTenant,
    globex: TestTenant,
}

async fn test_app() -> TestApp {
    let pool = test_helpers::create_test_db().await.unwrap();
    let acme = test_helpers::create_test_tenant(&pool, "Acme").await.unwrap();
    let globex = test_helpers::create_test_tenant(&pool, "Globex")
        .await
        .unwrap();

    let state = AppState::with_gateways(
        pool,
        Arc::new(FakeSenderGateway::new("123456")),
        Arc::new(FakeDomainGateway::new()),
    );

    TestApp {
        app: routes::app(state, None),
        acme,
        globex,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request to build");

    let response = app.clone().oneshot(request).await.expect("router to respond");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body to be readable");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).expect("body to be JSON")
    };
    (status, json)
}

#[tokio::test]
async fn test_health_is_public() {
    let t = test_app().await;
    let (status, body) = send(&t.app, Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let t = test_app().await;
    let uri = format!("/api/companies/{}/verification", t.acme.company_id);

    let response = t
        .app
        .clone()
        .oneshot(Request::builder().uri(&uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(
        response.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let (status, body) = send(&t.app, Method::GET, &uri, Some("bogus"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_other_tenant_is_forbidden() {
    let t = test_app().await;
    let uri = format!("/api/companies/{}/verification", t.acme.company_id);

    let (status, body) = send(&t.app, Method::GET, &uri, Some(&t.globex.admin_token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);

    let (status, _) = send(
        &t.app,
        Method::POST,
        &uri,
        Some(&t.globex.admin_token),
        Some(json!({"email": "a@b.com", "name": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_can_read_but_not_write() {
    let t = test_app().await;
    let uri = format!("/api/companies/{}/verification", t.acme.company_id);

    let (status, body) = send(&t.app, Method::GET, &uri, Some(&t.acme.member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["settings"]["is_verified"], false);

    let (status, _) = send(
        &t.app,
        Method::POST,
        &uri,
        Some(&t.acme.member_token),
        Some(json!({"email": "a@b.com", "name": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_fields_use_error_envelope() {
    let t = test_app().await;
    let uri = format!("/api/companies/{}/verification", t.acme.company_id);

    let (status, body) = send(
        &t.app,
        Method::POST,
        &uri,
        Some(&t.acme.admin_token),
        Some(json!({"name": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"success": false, "error": "email is required"}));

    let (status, body) = send(
        &t.app,
        Method::PUT,
        &uri,
        Some(&t.acme.admin_token),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_sender_verification_over_http() {
    let t = test_app().await;
    let uri = format!("/api/companies/{}/verification", t.acme.company_id);
    let token = Some(t.acme.admin_token.as_str());

    let (status, body) = send(
        &t.app,
        Method::POST,
        &uri,
        token,
        Some(json!({"email": "a@b.com", "name": "A"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["settings"]["sender_email"], "a@b.com");

    let (status, body) = send(
        &t.app,
        Method::POST,
        &uri,
        token,
        Some(json!({"email": "c@d.com", "name": "C"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&t.app, Method::PUT, &uri, token, Some(json!({"otp": "000000"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid verification code");

    let (status, body) = send(&t.app, Method::PUT, &uri, token, Some(json!({"otp": "123456"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["is_verified"], true);
    assert_eq!(body["data"]["prevention_steps"]["step1"], true);
}

#[tokio::test]
async fn test_domain_confirmation_mismatch_over_http() {
    let t = test_app().await;
    let uri = format!("/api/companies/{}/verification/domain", t.acme.company_id);
    let token = Some(t.acme.admin_token.as_str());

    let (status, _) = send(&t.app, Method::POST, &uri, token, Some(json!({"domain": "a.com"}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(
        &t.app,
        Method::PUT,
        &uri,
        token,
        Some(json!({"current_domain": "wrong.com", "domain": "b.com"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    let (status, body) = send(&t.app, Method::GET, &uri, token, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["domain"], "a.com");
}

#[tokio::test]
async fn test_onboarding_defaults_and_steps() {
    let t = test_app().await;
    let base = format!("/api/companies/{}/onboarding", t.acme.company_id);
    let token = Some(t.acme.admin_token.as_str());

    let (status, body) = send(&t.app, Method::GET, &base, Some(&t.acme.member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let data = &body["data"];
    assert_eq!(data["selectedTechStacks"], json!([]));
    assert_eq!(data["nodejsSteps"]["credentials"], false);
    assert_eq!(data["nextjsSteps"]["install"], false);
    assert_eq!(data["completed"], false);

    let (status, _) = send(
        &t.app,
        Method::PUT,
        &base,
        token,
        Some(json!({"selectedTechStacks": ["nextjs"]})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let steps_uri = format!("{}/steps", base);
    let (status, body) = send(
        &t.app,
        Method::POST,
        &steps_uri,
        token,
        Some(json!({"stack": "nextjs", "step": "integrate"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["transition"]["outcome"], "blocked");

    for step in ["install", "integrate"] {
        let (status, _) = send(
            &t.app,
            Method::POST,
            &steps_uri,
            token,
            Some(json!({"stack": "nextjs", "step": step})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, body) = send(&t.app, Method::GET, &base, token, None).await;
    assert_eq!(body["data"]["completed"], true);
    assert_eq!(body["data"]["completedTechStacks"], json!(["nextjs"]));
}

#[tokio::test]
async fn test_member_listing_is_tenant_scoped() {
    let t = test_app().await;
    let uri = format!("/api/companies/{}/members", t.acme.company_id);

    let (status, body) = send(&t.app, Method::GET, &uri, Some(&t.acme.member_token), None).await;
    assert_eq!(status, StatusCode::OK);
    let emails: Vec<&str> = body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["email"].as_str().unwrap())
        .collect();
    assert!(emails.contains(&"admin@acme.test"));
    assert!(!emails.iter().any(|e| e.ends_with("globex.test")));

    let (status, _) = send(
        &t.app,
        Method::DELETE,
        &format!("{}/{}", uri, t.acme.admin_id),
        Some(&t.acme.member_token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_route_is_enveloped() {
    let t = test_app().await;
    let (status, body) = send(&t.app, Method::GET, "/nope", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
