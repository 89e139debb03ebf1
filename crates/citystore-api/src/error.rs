//! Adapter-level errors and their status mapping.

use citystore_core::CityError;
use thiserror::Error;

use crate::response::Status;

/// Message returned for a date that does not parse.
pub const BAD_DATE_MESSAGE: &str = "Date must match format yyyy-MM-dd or epoch timestamp";

/// Message returned for a founding date after today.
pub const FUTURE_DATE_MESSAGE: &str = "Date must be in the present or the past";

/// Message returned when the body is not a JSON city object.
pub const BAD_BODY_MESSAGE: &str = "Invalid Request Body";

/// Why a request could not be served.
#[derive(Error, Debug)]
pub enum ApiError {
    /// The body is not valid JSON for a city
    #[error("invalid request body: {0}")]
    Body(#[from] serde_json::Error),

    /// One or more request fields failed validation
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// The store rejected the operation
    #[error(transparent)]
    Store(#[from] CityError),
}

impl ApiError {
    /// Status this error is reported with.
    pub fn status(&self) -> Status {
        match self {
            ApiError::Body(_) | ApiError::Validation(_) => Status::BadRequest,
            ApiError::Store(err) => match err {
                CityError::AlreadyExists { .. } => Status::Conflict,
                CityError::NotFound { .. } => Status::NotFound,
                CityError::EmptyResult => Status::NoContent,
                CityError::InvalidDate { .. } | CityError::InvalidRecord { .. } => Status::BadRequest,
                CityError::InvalidConfig(_) | CityError::BrokenHierarchy { .. } => {
                    Status::InternalServerError
                }
            },
        }
    }

    /// Messages for the `errors` body, or `None` when the status says
    /// everything.
    pub fn messages(&self) -> Option<Vec<String>> {
        match self {
            ApiError::Body(_) => Some(vec![BAD_BODY_MESSAGE.to_string()]),
            ApiError::Validation(messages) => Some(messages.clone()),
            ApiError::Store(CityError::InvalidDate { .. }) => Some(vec![BAD_DATE_MESSAGE.to_string()]),
            ApiError::Store(err @ CityError::InvalidRecord { .. }) => Some(vec![err.to_string()]),
            ApiError::Store(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_error_status() {
        let conflict = ApiError::from(CityError::AlreadyExists {
            name: "a".into(),
            state: "b".into(),
            country: "c".into(),
        });
        assert_eq!(conflict.status(), Status::Conflict);
        assert!(conflict.messages().is_none());

        assert_eq!(ApiError::from(CityError::EmptyResult).status(), Status::NoContent);

        let defect = ApiError::from(CityError::BrokenHierarchy { country: "c".into(), state: "s".into() });
        assert_eq!(defect.status(), Status::InternalServerError);
    }

    #[test]
    fn test_invalid_date_message() {
        let err = ApiError::from(CityError::InvalidDate { input: "x".into(), reason: "bad".into() });
        assert_eq!(err.status(), Status::BadRequest);
        assert_eq!(err.messages(), Some(vec![BAD_DATE_MESSAGE.to_string()]));
    }

    #[test]
    fn test_validation_display() {
        let err = ApiError::Validation(vec!["name is required".into(), "state is required".into()]);
        assert_eq!(err.to_string(), "validation failed: name is required; state is required");
    }
}
