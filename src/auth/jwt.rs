/// JWT Token Generation and Validation
///
/// `TokenSigner` issues HS256-signed access and refresh tokens from the shared
/// secret and verifies access tokens. It holds no mutable state.

use chrono::{DateTime, Duration, SubsecRound, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};

use crate::auth::claims::{Claims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::{AppError, AuthError};

const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// A freshly signed token together with the instants encoded in it.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct TokenSigner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    issuer: String,
    access_ttl: Duration,
    refresh_ttl: Duration,
}

impl TokenSigner {
    pub fn new(config: &JwtSettings) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            issuer: config.issuer.clone(),
            access_ttl: Duration::seconds(config.access_token_expiry),
            refresh_ttl: Duration::seconds(config.refresh_token_expiry),
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.access_ttl
    }

    pub fn refresh_ttl(&self) -> Duration {
        self.refresh_ttl
    }

    /// Issue an access token for a user
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails
    pub fn issue_access_token(&self, user_id: &str, email: &str) -> Result<IssuedToken, AppError> {
        let issued_at = now();
        let claims = Claims::new(user_id, email, issued_at, self.access_ttl, &self.issuer);
        let token = self.sign(&claims)?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at: issued_at + self.access_ttl,
        })
    }

    /// Issue a refresh token for a user
    ///
    /// The returned `expires_at` is exactly the signed `exp`, so the ledger
    /// entry saved with it expires together with the token.
    ///
    /// # Errors
    /// Returns `AppError::Internal` if signing fails
    pub fn issue_refresh_token(&self, user_id: &str) -> Result<IssuedToken, AppError> {
        let issued_at = now();
        let claims = RefreshClaims::new(user_id, issued_at, self.refresh_ttl, &self.issuer);
        let token = self.sign(&claims)?;

        Ok(IssuedToken {
            token,
            issued_at,
            expires_at: issued_at + self.refresh_ttl,
        })
    }

    /// Validate an access token and extract its claims
    ///
    /// # Errors
    /// Returns `AuthError::InvalidToken` if the token is malformed, signed
    /// with another key or algorithm, issued by someone else, or expired
    pub fn verify_access_token(&self, token: &str) -> Result<Claims, AuthError> {
        self.verify_access_token_at(token, Utc::now())
    }

    /// Same as [`verify_access_token`](Self::verify_access_token) with an explicit clock.
    pub fn verify_access_token_at(
        &self,
        token: &str,
        now: DateTime<Utc>,
    ) -> Result<Claims, AuthError> {
        // Only HS256 is accepted; `none` and every other algorithm fail here.
        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.set_issuer(&[&self.issuer]);
        validation.set_required_spec_claims(&["exp", "iat", "iss", "sub"]);
        validation.leeway = 0;

        let claims = decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("JWT validation error: {}", e);
                AuthError::InvalidToken
            })?;

        if claims.is_expired_at(now) {
            tracing::debug!(user_id = %claims.sub, "Access token expired");
            return Err(AuthError::InvalidToken);
        }

        Ok(claims)
    }

    fn sign<T: serde::Serialize>(&self, claims: &T) -> Result<String, AppError> {
        encode(&Header::new(SIGNING_ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}

// JWT timestamps have whole-second precision.
fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_test_config() -> JwtSettings {
        JwtSettings {
            secret: "test-secret-key-at-least-32-characters-long".to_string(),
            access_token_expiry: 900,
            refresh_token_expiry: 604800,
            issuer: "test".to_string(),
        }
    }

    #[test]
    fn test_issue_and_verify_token() {
        let signer = TokenSigner::new(&get_test_config());

        let issued = signer
            .issue_access_token("user-1", "test@example.com")
            .expect("Failed to generate token");
        let claims = signer
            .verify_access_token(&issued.token)
            .expect("Failed to validate token");

        assert_eq!(claims.sub, "user-1");
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.iss, "test");
        assert_eq!(claims.iat, issued.issued_at.timestamp());
        assert_eq!(claims.exp, issued.expires_at.timestamp());
    }

    #[test]
    fn test_token_valid_until_ttl_elapses() {
        let signer = TokenSigner::new(&get_test_config());
        let issued = signer
            .issue_access_token("user-1", "test@example.com")
            .unwrap();
        let ttl = signer.access_ttl();

        assert!(signer
            .verify_access_token_at(&issued.token, issued.issued_at)
            .is_ok());
        assert!(signer
            .verify_access_token_at(&issued.token, issued.issued_at + ttl - Duration::seconds(1))
            .is_ok());
        assert_eq!(
            signer.verify_access_token_at(&issued.token, issued.issued_at + ttl),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_zero_ttl_token_is_immediately_expired() {
        let mut config = get_test_config();
        config.access_token_expiry = 0;
        let signer = TokenSigner::new(&config);

        let issued = signer
            .issue_access_token("user-1", "test@example.com")
            .unwrap();

        assert!(signer.verify_access_token(&issued.token).is_err());
    }

    #[test]
    fn test_invalid_token() {
        let signer = TokenSigner::new(&get_test_config());
        assert!(signer.verify_access_token("invalid.token.here").is_err());
        assert!(signer.verify_access_token("").is_err());
    }

    #[test]
    fn test_tampered_token() {
        let signer = TokenSigner::new(&get_test_config());
        let issued = signer
            .issue_access_token("user-1", "test@example.com")
            .unwrap();

        let tampered = format!("{}X", issued.token);
        assert!(signer.verify_access_token(&tampered).is_err());
    }

    #[test]
    fn test_wrong_secret() {
        let signer = TokenSigner::new(&get_test_config());
        let mut other = get_test_config();
        other.secret = "a-completely-different-secret-of-enough-length".to_string();
        let other_signer = TokenSigner::new(&other);

        let issued = other_signer
            .issue_access_token("user-1", "test@example.com")
            .unwrap();
        assert!(signer.verify_access_token(&issued.token).is_err());
    }

    #[test]
    fn test_wrong_issuer() {
        let signer = TokenSigner::new(&get_test_config());
        let issued = signer
            .issue_access_token("user-1", "test@example.com")
            .unwrap();

        let mut config = get_test_config();
        config.issuer = "wrong-issuer".to_string();
        let verifier = TokenSigner::new(&config);

        assert!(verifier.verify_access_token(&issued.token).is_err());
    }

    #[test]
    fn test_other_algorithm_rejected() {
        let config = get_test_config();
        let signer = TokenSigner::new(&config);
        let claims = Claims::new(
            "user-1",
            "test@example.com",
            now(),
            Duration::minutes(15),
            &config.issuer,
        );

        // Same secret, different HMAC algorithm.
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(config.secret.as_bytes()),
        )
        .unwrap();

        assert_eq!(
            signer.verify_access_token(&token),
            Err(AuthError::InvalidToken)
        );
    }

    #[test]
    fn test_unsigned_token_rejected() {
        let signer = TokenSigner::new(&get_test_config());
        let issued = signer
            .issue_access_token("user-1", "test@example.com")
            .unwrap();

        // Keep the payload, replace the header with alg=none, drop the signature.
        let payload = issued.token.split('.').nth(1).unwrap();
        let unsigned = format!("eyJhbGciOiJub25lIiwidHlwIjoiSldUIn0.{}.", payload);

        assert!(signer.verify_access_token(&unsigned).is_err());
    }

    #[test]
    fn test_refresh_token_is_not_an_access_token() {
        let signer = TokenSigner::new(&get_test_config());
        let refresh = signer.issue_refresh_token("user-1").unwrap();

        assert!(signer.verify_access_token(&refresh.token).is_err());
    }

    #[test]
    fn test_refresh_token_expiry_matches_ttl() {
        let signer = TokenSigner::new(&get_test_config());
        let refresh = signer.issue_refresh_token("user-1").unwrap();

        assert_eq!(refresh.expires_at - refresh.issued_at, signer.refresh_ttl());
    }

    #[test]
    fn test_tokens_are_unique() {
        let signer = TokenSigner::new(&get_test_config());
        let a = signer.issue_access_token("user-1", "test@example.com").unwrap();
        let b = signer.issue_access_token("user-1", "test@example.com").unwrap();
        let c = signer.issue_refresh_token("user-1").unwrap();
        let d = signer.issue_refresh_token("user-1").unwrap();

        assert_ne!(a.token, b.token);
        assert_ne!(c.token, d.token);
    }
}
