use crate::{auth, handlers, AppState};
use axum::{
    body::Body,
    http::{header, HeaderValue, Method, Request},
    middleware::{self, Next},
    response::{IntoResponse, Json, Response},
    routing::{get, post, put},
    Router,
};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use uuid::Uuid;

/// Authenticated JSON API, nested under `/api`.
pub fn api_router(state: AppState) -> Router<AppState> {
    use handlers::{company_handlers as company, onboarding_handlers as onboarding};
    use handlers::verification_handlers as verification;

    Router::new()
        .route("/companies/{id}", get(company::get_company))
        .route(
            "/companies/{id}/members",
            get(company::list_members).post(company::add_member),
        )
        .route(
            "/companies/{id}/members/{profile_id}",
            put(company::update_member).delete(company::remove_member),
        )
        .route(
            "/companies/{id}/verification",
            get(verification::get_status)
                .post(verification::create_sender)
                .put(verification::update_verification)
                .patch(verification::confirm_sender_update),
        )
        .route(
            "/companies/{id}/verification/sender-update",
            post(verification::begin_sender_update).delete(verification::cancel_sender_update),
        )
        .route(
            "/companies/{id}/verification/domain",
            get(verification::check_domain)
                .post(verification::setup_domain)
                .put(verification::update_domain),
        )
        .route(
            "/companies/{id}/verification/domain/authenticate",
            put(verification::authenticate_domain),
        )
        .route(
            "/companies/{id}/onboarding",
            get(onboarding::get_onboarding).put(onboarding::replace_onboarding),
        )
        .route("/companies/{id}/onboarding/steps", post(onboarding::complete_step))
        .route("/companies/{id}/onboarding/screen", put(onboarding::set_screen))
        .route("/companies/{id}/onboarding/reset", post(onboarding::reset_onboarding))
        .layer(middleware::from_fn_with_state(state, auth::require_session))
}

/// Full application: `/api`, `/health`, tracing, CORS and security headers.
pub fn app(state: AppState, cors_origin: Option<&str>) -> Router {
    Router::new()
        .nest("/api", api_router(state.clone()))
        .route("/health", get(health))
        .fallback(not_found)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http().make_span_with(
                    |request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            id = %Uuid::new_v4(),
                            method = %request.method(),
                            uri = %request.uri(),
                        )
                    },
                ))
                .layer(cors_layer(cors_origin))
                .layer(middleware::from_fn(add_security_headers)),
        )
        .with_state(state)
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600));

    match origin.and_then(|o| HeaderValue::from_str(o).ok()) {
        Some(origin) => layer.allow_origin(origin),
        None => layer.allow_origin(Any),
    }
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "data": { "status": "ok" } }))
}

async fn not_found() -> Response {
    crate::error::AppError::NotFound("Route not found".to_string()).into_response()
}

async fn add_security_headers(request: Request<Body>, next: Next) -> Response {
    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert("X-Frame-Options", HeaderValue::from_static("DENY"));
    headers.insert(
        "X-Content-Type-Options",
        HeaderValue::from_static("nosniff"),
    );
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    response
}
