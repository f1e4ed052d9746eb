//! Consumer authentication by signed token.
//!
//! Tokens are JWTs signed with the shared `JWT_SECRET_KEY` using one of the HMAC
//! algorithms. Verification checks the signature and, when the token carries them,
//! the `exp` and `nbf` time claims. No other claim is required or inspected; what a
//! token grants is decided by whoever holds the secret, not by this module.
//!
//! # Example
//!
//! ```rust
//! use domain::jwt::check_token;
//! use jsonwebtoken::{encode, EncodingKey, Header};
//! use serde_json::json;
//!
//! let token = encode(
//!     &Header::default(),
//!     &json!({ "sub": "consumer-1" }),
//!     &EncodingKey::from_secret(b"supersecret"),
//! )
//! .unwrap();
//!
//! let claims = check_token(&token, "supersecret").unwrap();
//! assert_eq!(claims.subject(), Some("consumer-1"));
//! ```

use crate::error::Error;
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};

pub use claims::Claims;

pub(crate) mod claims;

/// The algorithms accepted for consumer tokens. All share the symmetric secret.
const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// Verifies `token` against `secret` and returns its decoded claims.
///
/// Fails with an `Unauthorized(InvalidToken)` error carrying the verifier's message when
/// the token is empty or malformed, is signed with another secret or a non-HMAC
/// algorithm, or has expired.
pub fn check_token(token: &str, secret: &str) -> Result<Claims, Error> {
    let token_data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )?;

    Ok(token_data.claims)
}

fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
    // Signature integrity is the only requirement; `exp` is checked only when present.
    validation.required_spec_claims.clear();
    validation.validate_aud = false;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{DomainErrorKind, UnauthorizedKind};
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde_json::json;
    use std::time::{SystemTime, UNIX_EPOCH};

    const SECRET: &str = "supersecret";

    fn sign(claims: serde_json::Value, algorithm: Algorithm, secret: &str) -> String {
        encode(
            &Header::new(algorithm),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn now() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_secs()
    }

    fn assert_invalid_token(result: Result<Claims, Error>) {
        let error = result.expect_err("token should be rejected");
        match error.error_kind {
            DomainErrorKind::Unauthorized(UnauthorizedKind::InvalidToken(ref message)) => {
                assert!(!message.is_empty(), "error message should not be empty");
            }
            ref other => panic!("unexpected error kind: {other:?}"),
        }
    }

    #[test]
    fn test_valid_token_without_expiry_is_accepted() {
        let token = sign(
            json!({ "sub": "1234567890", "name": "John Doe", "iat": 1516239022 }),
            Algorithm::HS256,
            SECRET,
        );

        let claims = check_token(&token, SECRET).unwrap();

        assert_eq!(claims.subject(), Some("1234567890"));
        assert_eq!(claims.get("name"), Some(&json!("John Doe")));
    }

    #[test]
    fn test_empty_claim_set_is_accepted() {
        let token = sign(json!({}), Algorithm::HS256, SECRET);
        assert_eq!(check_token(&token, SECRET).unwrap(), Claims::default());
    }

    #[test]
    fn test_all_hmac_algorithms_are_accepted() {
        for algorithm in ACCEPTED_ALGORITHMS {
            let token = sign(json!({ "sub": "c" }), algorithm, SECRET);
            assert!(
                check_token(&token, SECRET).is_ok(),
                "{algorithm:?} should be accepted"
            );
        }
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = sign(json!({ "sub": "c" }), Algorithm::HS256, "another-secret");
        assert_invalid_token(check_token(&token, SECRET));
    }

    #[test]
    fn test_tampered_payload_is_rejected() {
        let token = sign(json!({ "sub": "c" }), Algorithm::HS256, SECRET);
        let forged = sign(json!({ "sub": "admin" }), Algorithm::HS256, "x");

        let mut parts: Vec<&str> = token.split('.').collect();
        let forged_parts: Vec<&str> = forged.split('.').collect();
        parts[1] = forged_parts[1];

        assert_invalid_token(check_token(&parts.join("."), SECRET));
    }

    #[test]
    fn test_malformed_and_empty_tokens_are_rejected() {
        assert_invalid_token(check_token("", SECRET));
        assert_invalid_token(check_token("not-a-token", SECRET));
        assert_invalid_token(check_token("a.b.c", SECRET));
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = sign(
            json!({ "sub": "c", "exp": now() - 3600 }),
            Algorithm::HS256,
            SECRET,
        );
        assert_invalid_token(check_token(&token, SECRET));
    }

    #[test]
    fn test_unexpired_token_is_accepted() {
        let token = sign(
            json!({ "sub": "c", "exp": now() + 3600 }),
            Algorithm::HS256,
            SECRET,
        );
        assert!(check_token(&token, SECRET).is_ok());
    }
}
