use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderValue, Method};
use schoolgate_core::AppError;
use tower_http::cors::CorsLayer;

/// The frontend only reads access verdicts and posts sign-in requests.
pub(super) fn build_cors_layer(frontend_url: &str) -> Result<CorsLayer, AppError> {
    let origin = HeaderValue::from_str(frontend_url)
        .map_err(|error| AppError::Internal(format!("invalid FRONTEND_URL: {error}")))?;

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE]))
}
