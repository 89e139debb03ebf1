//! Responses handed back to the transport layer.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::error;

/// Protocol-level outcome of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    /// 200
    Ok,
    /// 201
    Created,
    /// 204
    NoContent,
    /// 400
    BadRequest,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// 500
    InternalServerError,
}

impl Status {
    /// Numeric HTTP status code.
    pub fn code(self) -> u16 {
        match self {
            Status::Ok => 200,
            Status::Created => 201,
            Status::NoContent => 204,
            Status::BadRequest => 400,
            Status::NotFound => 404,
            Status::Conflict => 409,
            Status::InternalServerError => 500,
        }
    }
}

/// One entry of an error body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorMessage {
    /// When the error was produced
    pub timestamp: DateTime<Utc>,
    /// Numeric status code
    pub error_code: u16,
    /// Human-readable reason
    pub message: String,
}

/// Error body: `{"errors": [...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorEnvelope {
    /// Every problem found with the request
    pub errors: Vec<ErrorMessage>,
}

/// Status plus optional body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    /// Outcome
    pub status: Status,
    /// JSON or plain-text body
    pub body: Option<String>,
}

impl ApiResponse {
    /// Status with no body.
    pub fn empty(status: Status) -> Self {
        Self { status, body: None }
    }

    /// Status with a plain-text body.
    pub fn text(status: Status, body: impl Into<String>) -> Self {
        Self { status, body: Some(body.into()) }
    }

    /// Status with a JSON body. Falls back to an empty 500 if encoding fails.
    pub fn json<T: Serialize>(status: Status, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body: Some(body) },
            Err(e) => {
                error!(error = %e, "failed to encode response body");
                Self::empty(Status::InternalServerError)
            }
        }
    }

    /// Error body listing `messages`, all stamped with `now`.
    pub fn errors(status: Status, messages: Vec<String>, now: DateTime<Utc>) -> Self {
        let envelope = ErrorEnvelope {
            errors: messages
                .into_iter()
                .map(|message| ErrorMessage {
                    timestamp: now,
                    error_code: status.code(),
                    message,
                })
                .collect(),
        };
        Self::json(status, &envelope)
    }
}
