use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// Errors that can occur while verifying a bearer token
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing bearer token")]
    MissingToken,

    #[error("Invalid or expired token: {0}")]
    InvalidToken(#[from] jsonwebtoken::errors::Error),

    #[error("Unsupported algorithm: {0}")]
    UnsupportedAlgorithm(String),
}

/// Claims issued by the identity service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Verifies HMAC-signed session tokens issued by the identity service
#[derive(Clone)]
pub struct TokenVerifier {
    key: DecodingKey,
    validation: Validation,
}

impl TokenVerifier {
    pub fn new(secret: &str, algorithm: &str) -> Result<Self, AuthError> {
        let algorithm = Algorithm::from_str(algorithm)
            .map_err(|_| AuthError::UnsupportedAlgorithm(algorithm.to_string()))?;
        if !matches!(algorithm, Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512) {
            return Err(AuthError::UnsupportedAlgorithm(format!("{:?}", algorithm)));
        }

        Ok(Self {
            key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(algorithm),
        })
    }

    /// Verify a raw token and return the user it was issued to
    pub fn verify(&self, token: &str) -> Result<String, AuthError> {
        let data = decode::<Claims>(token, &self.key, &self.validation)?;
        Ok(data.claims.sub)
    }

    /// Verify an `Authorization` header value of the form `Bearer <token>`
    pub fn verify_header(&self, header: Option<&str>) -> Result<String, AuthError> {
        let token = header
            .and_then(|h| h.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(AuthError::MissingToken)?;
        self.verify(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token(secret: &str, sub: &str, exp: usize) -> String {
        encode(
            &Header::default(),
            &Claims { sub: sub.to_string(), exp },
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future_exp() -> usize {
        (chrono::Utc::now().timestamp() + 3600) as usize
    }

    #[test]
    fn test_verify_valid_token() {
        let verifier = TokenVerifier::new("secret", "HS256").unwrap();
        let header = format!("Bearer {}", token("secret", "alice", future_exp()));
        assert_eq!(verifier.verify_header(Some(&header)).unwrap(), "alice");
    }

    #[test]
    fn test_wrong_secret_rejected() {
        let verifier = TokenVerifier::new("secret", "HS256").unwrap();
        let bad = token("other", "alice", future_exp());
        assert!(matches!(verifier.verify(&bad), Err(AuthError::InvalidToken(_))));
    }

    #[test]
    fn test_expired_token_rejected() {
        let verifier = TokenVerifier::new("secret", "HS256").unwrap();
        let expired = token("secret", "alice", 1000);
        assert!(verifier.verify(&expired).is_err());
    }

    #[test]
    fn test_missing_header() {
        let verifier = TokenVerifier::new("secret", "HS256").unwrap();
        assert!(matches!(verifier.verify_header(None), Err(AuthError::MissingToken)));
        assert!(matches!(
            verifier.verify_header(Some("Basic abc")),
            Err(AuthError::MissingToken)
        ));
    }

    #[test]
    fn test_asymmetric_algorithm_rejected() {
        assert!(matches!(
            TokenVerifier::new("secret", "RS256"),
            Err(AuthError::UnsupportedAlgorithm(_))
        ));
    }
}
