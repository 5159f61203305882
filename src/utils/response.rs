use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Serialize)]
pub struct ApiErrorResponse {
    pub error: String,
    pub code: String,
    #[serde(flatten)]
    pub details: Option<Map<String, Value>>,
}

pub fn success<T>(data: T) -> Response
where
    T: Serialize,
{
    (StatusCode::OK, Json(data)).into_response()
}

pub fn created<T>(data: T) -> Response
where
    T: Serialize,
{
    (StatusCode::CREATED, Json(data)).into_response()
}

pub fn error(
    code: &str,
    message: impl Into<String>,
    details: Option<Map<String, Value>>,
    status: StatusCode,
) -> Response {
    let body = ApiErrorResponse {
        error: message.into(),
        code: code.to_string(),
        details,
    };

    (status, Json(body)).into_response()
}
