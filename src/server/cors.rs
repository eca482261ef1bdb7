//! CORS policy applied uniformly to every response.
//!
//! Origins on the configured allow-list are echoed back verbatim; anything
//! else falls back to the wildcard so unauthenticated tooling keeps working.
//! The wildcard fallback means credentialed cross-origin requests are not
//! supported; tighten the policy before relying on cookies across origins.

use axum::extract::{Request, State};
use axum::http::{header, HeaderMap, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};

use super::AppState;

const ALLOW_METHODS: &str = "GET,POST,PUT,PATCH,DELETE,OPTIONS";
const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const MAX_AGE_SECS: &str = "86400";

/// Compute the CORS header set for a request origin. Pure function of the
/// origin and the allow-list.
pub fn cors_headers(origin: Option<&str>, allowed_origins: &[String]) -> HeaderMap {
    let allow_origin = match origin {
        Some(origin) if allowed_origins.iter().any(|allowed| allowed == origin) => origin,
        _ => "*",
    };

    let mut headers = HeaderMap::new();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_str(allow_origin).unwrap_or_else(|_| HeaderValue::from_static("*")),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_HEADERS,
        HeaderValue::from_static(ALLOW_HEADERS),
    );
    headers.insert(
        header::ACCESS_CONTROL_MAX_AGE,
        HeaderValue::from_static(MAX_AGE_SECS),
    );
    headers
}

/// Middleware: answer preflights with an empty 204 and attach the CORS
/// header set to every other response, success or error.
pub async fn apply_cors(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let origin = req
        .headers()
        .get(header::ORIGIN)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let cors = cors_headers(origin.as_deref(), &state.settings.allowed_origins);

    let mut response = if req.method() == Method::OPTIONS {
        StatusCode::NO_CONTENT.into_response()
    } else {
        next.run(req).await
    };
    response.headers_mut().extend(cors);
    response
}
