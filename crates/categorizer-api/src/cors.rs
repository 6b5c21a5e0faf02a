//! Permissive CORS headers attached to every response.
//!
//! Browser clients call the endpoint directly with their own `apikey` and
//! `x-client-info` headers, so any origin is allowed and those headers are
//! listed explicitly. The set is applied by hand rather than through
//! `tower_http::cors::CorsLayer`: preflights must answer `200 ok` whether or
//! not the request carries `Origin`, and error envelopes need the same
//! headers.

use axum::http::{header, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use categorizer_core::defaults;

/// The two CORS headers.
pub fn cors_headers() -> [(HeaderName, HeaderValue); 2] {
    [
        (
            header::ACCESS_CONTROL_ALLOW_ORIGIN,
            HeaderValue::from_static(defaults::CORS_ALLOW_ORIGIN),
        ),
        (
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(defaults::CORS_ALLOW_HEADERS),
        ),
    ]
}

/// Answer a preflight: `200`, body `ok`, CORS headers.
pub async fn preflight() -> Response {
    (StatusCode::OK, cors_headers(), defaults::PREFLIGHT_BODY).into_response()
}
