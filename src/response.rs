use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

pub type ApiResult<T> = Result<JsonApiResponse<T>, AppError>;

/// The `{ok, data, error, meta}` envelope every endpoint answers with.
#[derive(Debug, Serialize)]
pub struct JsonApiResponse<T: Serialize> {
    #[serde(skip)]
    pub status: StatusCode,
    pub ok: bool,
    pub data: Option<T>,
    pub error: Option<ErrorBody>,
    pub meta: Meta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub request_id: String,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Meta {
    fn now(message: Option<String>) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            message,
        }
    }
}

impl<T: Serialize> JsonApiResponse<T> {
    pub fn ok(data: T) -> ApiResult<T> {
        Ok(Self::success(StatusCode::OK, None, data))
    }

    pub fn created(message: impl Into<String>, data: T) -> ApiResult<T> {
        Ok(Self::success(StatusCode::CREATED, Some(message.into()), data))
    }

    pub fn with_message(status: StatusCode, message: impl Into<String>, data: T) -> ApiResult<T> {
        Ok(Self::success(status, Some(message.into()), data))
    }

    fn success(status: StatusCode, message: Option<String>, data: T) -> Self {
        Self {
            status,
            ok: true,
            data: Some(data),
            error: None,
            meta: Meta::now(message),
        }
    }
}

impl JsonApiResponse<serde_json::Value> {
    pub(crate) fn from_error(err: &AppError) -> Self {
        let details = err
            .detail()
            .filter(|_| cfg!(debug_assertions))
            .map(|detail| serde_json::json!({ "cause": detail }));

        Self {
            status: err.status(),
            ok: false,
            data: None,
            error: Some(ErrorBody {
                code: err.code().to_string(),
                message: err.message().to_string(),
                details,
            }),
            meta: Meta::now(None),
        }
    }
}

pub(crate) fn log_app_error(err: &AppError) {
    match err {
        AppError::Internal { detail, .. } => tracing::error!(
            code = err.code(),
            message = err.message(),
            detail = detail.as_deref().unwrap_or(""),
            "request failed"
        ),
        AppError::Configuration(_) => {
            tracing::error!(code = err.code(), message = err.message(), "server misconfigured")
        }
        _ => tracing::debug!(code = err.code(), message = err.message(), "request rejected"),
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        log_app_error(&self);
        JsonApiResponse::from_error(&self).into_response()
    }
}

impl<T: Serialize> IntoResponse for JsonApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}
