//! Tower middleware for the Debate Coach API

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue},
    middleware::Next,
    response::Response,
};
use std::time::Instant;
use tracing::Instrument;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;

/// Routes that reject requests without a valid token
const PROTECTED_PATHS: &[&str] = &["/api/practice/question", "/api/debates/history"];

/// Authentication middleware.
///
/// Protected paths require a valid bearer token. Everywhere else a valid
/// token is honoured and anything else acts as the demo user. Handlers read
/// the result as an [`AuthUser`] extension.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let required = PROTECTED_PATHS.contains(&request.uri().path());

    let header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok());

    let user = match header {
        Some(value) => match state.jwt_auth().authenticate(value) {
            Ok(user) => user,
            Err(e) if required => return Err(e),
            Err(e) => {
                tracing::debug!(error = %e, "Ignoring invalid token on optional-auth route");
                AuthUser::demo()
            }
        },
        None if required => {
            return Err(ApiError::Unauthorized("Missing Authorization header".to_string()));
        }
        None => AuthUser::demo(),
    };

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

/// Request tracing middleware
pub async fn tracing_middleware(request: Request, next: Next) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let request_id = request
        .extensions()
        .get::<RequestId>()
        .map(|id| id.0.clone())
        .unwrap_or_else(|| "unknown".to_string());

    let span = tracing::info_span!(
        "http_request",
        method = %method,
        path = %path,
        request_id = %request_id,
    );

    let response = next.run(request).instrument(span).await;

    tracing::info!(
        method = %method,
        path = %path,
        request_id = %request_id,
        status = %response.status().as_u16(),
        latency_ms = %start.elapsed().as_millis(),
        "Request completed"
    );

    response
}

/// Request ID middleware
pub async fn request_id_middleware(mut request: Request, next: Next) -> Response {
    let request_id = uuid::Uuid::new_v4().to_string();

    request
        .extensions_mut()
        .insert(RequestId(request_id.clone()));

    let mut response = next.run(request).await;

    if let Ok(value) = HeaderValue::from_str(&request_id) {
        response.headers_mut().insert("X-Request-ID", value);
    }

    response
}

/// Request ID wrapper
#[derive(Clone, Debug)]
pub struct RequestId(pub String);

/// CORS configuration helper.
///
/// Reads allowed origins from COACH_CORS_ORIGINS (comma-separated) and falls
/// back to localhost only.
pub fn cors_layer() -> tower_http::cors::CorsLayer {
    use tower_http::cors::{AllowOrigin, CorsLayer};

    let origins = std::env::var("COACH_CORS_ORIGINS").ok();
    let localhost = || AllowOrigin::exact(HeaderValue::from_static("http://localhost:8080"));

    let allow_origin = match origins {
        Some(origins_str) if !origins_str.is_empty() => {
            let origins: Vec<HeaderValue> = origins_str
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                tracing::warn!("COACH_CORS_ORIGINS is set but contains no valid origins, using localhost only");
                localhost()
            } else {
                tracing::info!("CORS configured for {} origin(s)", origins.len());
                AllowOrigin::list(origins)
            }
        }
        _ => {
            tracing::warn!("COACH_CORS_ORIGINS not set, using restrictive CORS (localhost only)");
            localhost()
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE, header::ACCEPT])
        .max_age(std::time::Duration::from_secs(3600))
}

/// Timeout layer helper
#[allow(deprecated)]
pub fn timeout_layer(duration: std::time::Duration) -> tower_http::timeout::TimeoutLayer {
    tower_http::timeout::TimeoutLayer::new(duration)
}

/// Request body size limit
pub fn body_limit_layer(limit: usize) -> tower_http::limit::RequestBodyLimitLayer {
    tower_http::limit::RequestBodyLimitLayer::new(limit)
}
