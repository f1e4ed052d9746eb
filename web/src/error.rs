use std::error::Error as StdError;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use domain::error::{DomainErrorKind, Error as DomainError};

pub type Result<T> = core::result::Result<T, Error>;

/// Request-local failures, each answered with a status code and a one-line plaintext body.
///
/// Messages from the token verifier and the JSON decoder are returned to the client as-is.
#[derive(Debug, PartialEq)]
pub enum Error {
    MethodNotAllowed,
    BadContentType,
    Unauthorized(String),
    MalformedBody(String),
}

impl StdError for Error {}

impl std::fmt::Display for Error {
    fn fmt(&self, fmt: &mut std::fmt::Formatter) -> core::result::Result<(), std::fmt::Error> {
        match self {
            Error::MethodNotAllowed => write!(fmt, "Method not allowed"),
            Error::BadContentType => write!(fmt, "Content-Type must be application/json"),
            Error::Unauthorized(message) | Error::MalformedBody(message) => {
                write!(fmt, "{message}")
            }
        }
    }
}

impl Error {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Error::BadContentType | Error::MalformedBody(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        (self.status_code(), self.to_string()).into_response()
    }
}

// This is where domain errors are translated into the HTTP taxonomy.
impl From<DomainError> for Error {
    fn from(err: DomainError) -> Self {
        match err.error_kind {
            DomainErrorKind::Unauthorized(_) => Error::Unauthorized(err.to_string()),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::MalformedBody(err.to_string())
    }
}

impl From<sse::message::InvalidEventName> for Error {
    fn from(err: sse::message::InvalidEventName) -> Self {
        Error::MalformedBody(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_follow_taxonomy() {
        assert_eq!(
            Error::MethodNotAllowed.status_code(),
            StatusCode::METHOD_NOT_ALLOWED
        );
        assert_eq!(Error::BadContentType.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            Error::Unauthorized("x".to_string()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            Error::MalformedBody("x".to_string()).status_code(),
            StatusCode::BAD_REQUEST
        );
    }

    #[test]
    fn test_missing_token_maps_to_unauthorized_with_fixed_message() {
        let error = Error::from(DomainError::missing_token());
        assert_eq!(
            error,
            Error::Unauthorized("Authorization header is missing".to_string())
        );
    }
}
