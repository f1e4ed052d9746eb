//! Per-connection authorization for the event stream.
//!
//! Each new stream connection is described by a [`Session`] and handed exactly once to a
//! [`SessionAuthorizer`]. A successful authorization yields the [`Subscription`] the
//! transport registers; a failure carries the reason the `web` layer reports with a 401
//! before any stream framing is written.
//!
//! # Token source precedence
//!
//! The `Authorization` header is consulted first and the `jwt` query parameter second.
//! Browsers' `EventSource` cannot set custom headers, so browser consumers pass their
//! token as `?jwt=<token>`. A header value of the form `Bearer <token>` is accepted as
//! well as the bare token. Empty values count as absent.

use crate::error::Error;
use crate::jwt::{self, Claims};
use log::*;
use service::config::Config;
use std::fmt;
use std::net::SocketAddr;

const BEARER_PREFIX: &str = "Bearer ";

/// A consumer connection awaiting authorization.
#[derive(Clone)]
pub struct Session {
    /// Peer address, used for logging only.
    pub remote_addr: SocketAddr,
    /// Raw value of the `Authorization` header, if any.
    pub authorization: Option<String>,
    /// Raw value of the `jwt` query parameter, if any.
    pub jwt_query: Option<String>,
    /// Value of the `Last-Event-ID` header; empty when the client sent none.
    pub last_event_id: String,
}

impl Session {
    pub fn new(remote_addr: SocketAddr) -> Self {
        Self {
            remote_addr,
            authorization: None,
            jwt_query: None,
            last_event_id: String::new(),
        }
    }

    pub fn with_authorization(mut self, authorization: impl Into<String>) -> Self {
        self.authorization = Some(authorization.into());
        self
    }

    pub fn with_jwt_query(mut self, jwt: impl Into<String>) -> Self {
        self.jwt_query = Some(jwt.into());
        self
    }

    pub fn with_last_event_id(mut self, last_event_id: impl Into<String>) -> Self {
        self.last_event_id = last_event_id.into();
        self
    }

    /// The token this session presents: the header when non-empty, otherwise the query
    /// parameter when non-empty.
    pub fn token(&self) -> Option<&str> {
        let from_header = self
            .authorization
            .as_deref()
            .map(|value| value.strip_prefix(BEARER_PREFIX).unwrap_or(value))
            .filter(|token| !token.is_empty());

        from_header.or_else(|| self.jwt_query.as_deref().filter(|token| !token.is_empty()))
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("remote_addr", &self.remote_addr)
            .field("has_authorization", &self.authorization.is_some())
            .field("has_jwt_query", &self.jwt_query.is_some())
            .field("last_event_id", &self.last_event_id)
            .finish()
    }
}

/// The outcome of a successful authorization.
#[derive(Debug, Clone)]
pub struct Subscription {
    pub client: Session,
    /// The last event id the client has seen, passed through for replay.
    pub resume_from: String,
    /// Configured topics followed by the default topic. Duplicates are kept.
    pub topics: Vec<String>,
    pub claims: Claims,
}

/// Decides whether a new stream connection may proceed and what it subscribes to.
///
/// Implementations are called concurrently for independent connections and must not
/// hold mutable shared state.
pub trait SessionAuthorizer: Send + Sync {
    fn authorize(&self, session: Session) -> Result<Subscription, Error>;
}

/// Authorizes sessions presenting a token signed with the configured secret and
/// subscribes them to the configured topics plus the default topic.
#[derive(Clone)]
pub struct TokenSessionAuthorizer {
    secret: String,
    topics: Vec<String>,
}

impl TokenSessionAuthorizer {
    pub fn new(config: &Config, default_topic: &str) -> Self {
        let mut topics = config.topics.clone();
        topics.push(default_topic.to_string());

        Self {
            secret: config.jwt_secret_key().to_string(),
            topics,
        }
    }
}

impl SessionAuthorizer for TokenSessionAuthorizer {
    fn authorize(&self, session: Session) -> Result<Subscription, Error> {
        let Some(token) = session.token() else {
            warn!("Unauthorized session: {}", session.remote_addr);
            return Err(Error::missing_token());
        };

        let claims = jwt::check_token(token, &self.secret).inspect_err(|e| {
            warn!("Invalid JWT from {}: {e}", session.remote_addr);
        })?;

        info!("New session: {}", session.remote_addr);

        Ok(Subscription {
            resume_from: session.last_event_id.clone(),
            topics: self.topics.clone(),
            client: session,
            claims,
        })
    }
}

impl fmt::Debug for TokenSessionAuthorizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenSessionAuthorizer")
            .field("topics", &self.topics)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, UnauthorizedKind};
    use clap::Parser;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "supersecret";
    const DEFAULT_TOPIC: &str = "";

    fn config(topics: &[&str]) -> Config {
        let mut argv = vec!["sse_relay".to_string()];
        if !topics.is_empty() {
            argv.push("--topics".to_string());
            argv.push(topics.join(","));
        }
        Config::parse_from(argv).set_jwt_secret_key(SECRET)
    }

    fn token(secret: &str) -> String {
        encode(
            &Header::default(),
            &json!({ "sub": "consumer" }),
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn session() -> Session {
        Session::new("127.0.0.1:50000".parse().unwrap())
    }

    fn authorizer(topics: &[&str]) -> TokenSessionAuthorizer {
        TokenSessionAuthorizer::new(&config(topics), DEFAULT_TOPIC)
    }

    #[test]
    fn test_missing_token_is_rejected() {
        let error = authorizer(&[]).authorize(session()).unwrap_err();

        assert_eq!(
            error.error_kind,
            DomainErrorKind::Unauthorized(UnauthorizedKind::MissingToken)
        );
        assert_eq!(error.to_string(), "Authorization header is missing");
    }

    #[test]
    fn test_empty_header_and_query_count_as_missing() {
        let session = session().with_authorization("").with_jwt_query("");
        let error = authorizer(&[]).authorize(session).unwrap_err();

        assert_eq!(error.to_string(), "Authorization header is missing");
    }

    #[test]
    fn test_invalid_token_is_rejected_with_verifier_message() {
        let session = session().with_authorization(token("wrong-secret"));
        let error = authorizer(&[]).authorize(session).unwrap_err();

        assert!(matches!(
            error.error_kind,
            DomainErrorKind::Unauthorized(UnauthorizedKind::InvalidToken(_))
        ));
        assert!(!error.to_string().is_empty());
    }

    #[test]
    fn test_garbage_token_is_rejected() {
        let session = session().with_jwt_query("garbage");
        assert!(authorizer(&[]).authorize(session).is_err());
    }

    #[test]
    fn test_valid_header_token_subscribes_to_configured_and_default_topics() {
        let session = session().with_authorization(token(SECRET));
        let subscription = authorizer(&["test"]).authorize(session).unwrap();

        assert_eq!(subscription.topics, vec!["test", DEFAULT_TOPIC]);
        assert_eq!(subscription.claims.subject(), Some("consumer"));
    }

    #[test]
    fn test_empty_topic_configuration_still_yields_default_topic() {
        let session = session().with_authorization(token(SECRET));
        let subscription = authorizer(&[]).authorize(session).unwrap();

        assert_eq!(subscription.topics, vec![DEFAULT_TOPIC]);
    }

    #[test]
    fn test_duplicate_topics_are_kept() {
        let session = session().with_authorization(token(SECRET));
        let subscription = authorizer(&["a", "a"]).authorize(session).unwrap();

        assert_eq!(subscription.topics, vec!["a", "a", DEFAULT_TOPIC]);
    }

    #[test]
    fn test_query_token_is_used_when_header_absent() {
        let session = session().with_jwt_query(token(SECRET));
        assert!(authorizer(&[]).authorize(session).is_ok());
    }

    #[test]
    fn test_header_takes_precedence_over_query() {
        let session = session()
            .with_authorization(token("wrong-secret"))
            .with_jwt_query(token(SECRET));

        assert!(authorizer(&[]).authorize(session).is_err());
    }

    #[test]
    fn test_bearer_prefix_is_stripped() {
        let session = session().with_authorization(format!("Bearer {}", token(SECRET)));
        assert!(authorizer(&[]).authorize(session).is_ok());
    }

    #[test]
    fn test_resume_identifier_is_carried_into_subscription() {
        let session = session()
            .with_authorization(token(SECRET))
            .with_last_event_id("42");
        let subscription = authorizer(&[]).authorize(session).unwrap();

        assert_eq!(subscription.resume_from, "42");
        assert_eq!(subscription.client.last_event_id, "42");
    }

    #[test]
    fn test_session_debug_does_not_leak_tokens() {
        let session = session().with_authorization("secret-token");
        assert!(!format!("{session:?}").contains("secret-token"));
    }
}
