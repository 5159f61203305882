use axum::http::{header, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};

const PREFLIGHT_MAX_AGE_SECS: u64 = 86400;

/// CORS for the ticketing front-ends. `origins` is a comma separated list;
/// an empty or fully invalid list allows any origin.
pub fn create_cors_layer(origins: &str) -> CorsLayer {
    let allowed = parse_allowed_origins(origins);
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            header::ACCEPT,
            header::ORIGIN,
            HeaderName::from_static("x-webhook-secret"),
        ])
        .expose_headers([header::CONTENT_LENGTH, header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(PREFLIGHT_MAX_AGE_SECS));

    if allowed.is_empty() {
        tracing::warn!("CORS: No valid origins configured, allowing any origin");
        layer.allow_origin(AllowOrigin::any())
    } else {
        tracing::info!("CORS: Configured with {} allowed origin(s)", allowed.len());
        layer
            .allow_origin(AllowOrigin::list(allowed))
            .allow_credentials(true)
    }
}

fn parse_allowed_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => {
                tracing::debug!("CORS: Allowing origin: {}", origin);
                Some(value)
            }
            Err(e) => {
                tracing::warn!("CORS: Invalid origin '{}': {}", origin, e);
                None
            }
        })
        .collect()
}
