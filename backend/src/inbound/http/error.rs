//! HTTP error envelope.
//!
//! Maps [`crate::domain::Error`] onto status codes and a stable JSON body of
//! the shape `{ "code", "message", "traceId", "details"? }`. Internal errors
//! are redacted before leaving the process; the trace identifier lets an
//! operator correlate the redacted response with server logs.

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::domain::{Error, ErrorCode};
use crate::middleware::TraceId;

/// Result alias used by HTTP handlers.
pub type ApiResult<T> = Result<T, ApiError>;

/// Error envelope serialised to API clients.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    code: ErrorCode,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    trace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<Value>,
}

impl ApiError {
    /// Stable machine-readable code.
    pub fn code(&self) -> ErrorCode {
        self.code
    }

    /// Human-readable message as serialised to the client.
    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> Self {
        let trace_id = TraceId::current().map(|id| id.to_string());
        // Internal details never leave the process.
        let (message, details) = match err.code() {
            ErrorCode::InternalError => {
                error!(
                    code = ?err.code(),
                    message = %err.message(),
                    trace_id = trace_id.as_deref().unwrap_or("-"),
                    "internal error surfaced to client"
                );
                ("internal error".to_owned(), None)
            }
            _ => (err.message().to_owned(), err.details().cloned()),
        };
        Self {
            code: err.code(),
            message,
            trace_id,
            details,
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self.code {
            ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
            ErrorCode::Unauthorized => StatusCode::UNAUTHORIZED,
            ErrorCode::Forbidden => StatusCode::FORBIDDEN,
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Configuration => StatusCode::SERVICE_UNAVAILABLE,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case(Error::invalid_request("bad"), StatusCode::BAD_REQUEST)]
    #[case(Error::unauthorized("token required"), StatusCode::UNAUTHORIZED)]
    #[case(Error::forbidden("invalid token"), StatusCode::FORBIDDEN)]
    #[case(Error::not_found("missing"), StatusCode::NOT_FOUND)]
    #[case(Error::configuration("no store"), StatusCode::SERVICE_UNAVAILABLE)]
    #[case(Error::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR)]
    fn maps_codes_to_statuses(#[case] err: Error, #[case] expected: StatusCode) {
        let api: ApiError = err.into();
        assert_eq!(api.status_code(), expected);
    }

    #[test]
    fn internal_errors_are_redacted() {
        let api: ApiError = Error::internal("database credentials leaked").into();
        assert_eq!(api.message(), "internal error");
        assert!(api.details.is_none());
    }

    #[test]
    fn client_errors_keep_message_and_details() {
        let api: ApiError = Error::invalid_request("missing field")
            .with_details(json!({ "field": "filename" }))
            .into();
        assert_eq!(api.message(), "missing field");
        assert_eq!(api.details, Some(json!({ "field": "filename" })));
    }

    #[test]
    fn serialises_camel_case_envelope() {
        let api: ApiError = Error::not_found("invitation not found").into();
        let value = serde_json::to_value(&api).expect("serialise");
        assert_eq!(value["code"], json!("not_found"));
        assert_eq!(value["message"], json!("invitation not found"));
        assert!(value.get("details").is_none());
    }
}
