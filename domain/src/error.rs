//! Error types for the `domain` layer.
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
///
/// Like the other layers, the error is a root struct holding an `error_kind` tree plus the
/// original error in `source`. `web` matches on `error_kind` to pick a status code and
/// uses the `Display` output as the response body, so `Display` must stay a single line
/// that is safe to hand to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Unauthorized(UnauthorizedKind),
}

/// The reasons a consumer session can be refused.
#[derive(Debug, PartialEq)]
pub enum UnauthorizedKind {
    /// Neither the `Authorization` header nor the `jwt` query parameter carried a token.
    MissingToken,
    /// The token failed verification. Holds the verifier's message verbatim.
    InvalidToken(String),
}

impl Error {
    pub fn missing_token() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Unauthorized(UnauthorizedKind::MissingToken),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.error_kind {
            DomainErrorKind::Unauthorized(UnauthorizedKind::MissingToken) => {
                write!(f, "Authorization header is missing")
            }
            DomainErrorKind::Unauthorized(UnauthorizedKind::InvalidToken(message)) => {
                write!(f, "{message}")
            }
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error {
            error_kind: DomainErrorKind::Unauthorized(UnauthorizedKind::InvalidToken(
                err.to_string(),
            )),
            source: Some(Box::new(err)),
        }
    }
}
