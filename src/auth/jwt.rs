//! JWT token issuance and verification
//! Stateless HS256 session tokens carrying the account id

use crate::{auth::error::AuthError, config::SecurityConfig};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Serialize};

/// Algorithm used when signing
pub const SIGNING_ALGORITHM: Algorithm = Algorithm::HS256;

/// Algorithms accepted in a token header. Anything outside the HMAC family is
/// rejected before the signature is checked.
pub const ACCEPTED_ALGORITHMS: [Algorithm; 3] = [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];

/// JWT claims
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Account ID
    pub user_id: i64,

    /// Issued at
    pub iat: i64,

    /// Not before
    pub nbf: i64,

    /// Expiration
    pub exp: i64,
}

struct SigningKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

/// Token service
///
/// Keys are derived once at construction. A service built without a secret
/// still exists but refuses every operation with [`AuthError::MissingSecret`].
pub struct TokenService {
    keys: Option<SigningKeys>,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: Option<&Secret<String>>) -> Self {
        let keys = secret.map(|s| {
            let bytes = s.expose_secret().as_bytes();
            SigningKeys {
                encoding: EncodingKey::from_secret(bytes),
                decoding: DecodingKey::from_secret(bytes),
            }
        });

        if keys.is_none() {
            tracing::warn!("Token service created without a signing secret");
        }

        let mut validation = Validation::new(SIGNING_ALGORITHM);
        validation.algorithms = ACCEPTED_ALGORITHMS.to_vec();
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf"]);

        Self { keys, validation }
    }

    /// Create token service from config
    pub fn from_config(config: &SecurityConfig) -> Self {
        Self::new(config.jwt_secret.as_ref())
    }

    fn keys(&self) -> Result<&SigningKeys, AuthError> {
        self.keys.as_ref().ok_or(AuthError::MissingSecret)
    }

    /// Issue a token for `user_id` valid for `ttl_hours`
    pub fn issue(&self, user_id: i64, ttl_hours: i64) -> Result<String, AuthError> {
        let keys = self.keys()?;

        let now = Utc::now();
        let expires_at = Duration::try_hours(ttl_hours)
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or_else(|| {
                tracing::error!(ttl_hours, "Token lifetime out of range");
                AuthError::Signing
            })?;

        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            nbf: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        encode(&Header::new(SIGNING_ALGORITHM), &claims, &keys.encoding).map_err(|e| {
            tracing::error!("Failed to encode token: {:?}", e);
            AuthError::Signing
        })
    }

    /// Verify a token and return its decoded claims
    pub fn claims(&self, token: &str) -> Result<Claims, AuthError> {
        let keys = self.keys()?;

        decode::<Claims>(token, &keys.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token validation failed: {:?}", e);
                AuthError::from(e)
            })
    }

    /// Verify a token and return the account id it was issued for
    pub fn verify(&self, token: &str) -> Result<i64, AuthError> {
        self.claims(token).map(|claims| claims.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret() -> Secret<String> {
        Secret::new("test_secret_key_32_characters_long!".to_string())
    }

    #[test]
    fn test_issue_and_verify() {
        let service = TokenService::new(Some(&secret()));

        let token = service.issue(42, 24).unwrap();
        assert_eq!(service.verify(&token).unwrap(), 42);
    }

    #[test]
    fn test_claim_timestamps() {
        let service = TokenService::new(Some(&secret()));

        let token = service.issue(7, 24).unwrap();
        let claims = service.claims(&token).unwrap();
        assert_eq!(claims.iat, claims.nbf);
        assert_eq!(claims.exp - claims.iat, 24 * 3600);
    }

    #[test]
    fn test_missing_secret() {
        let service = TokenService::new(None);

        assert_eq!(service.issue(1, 24), Err(AuthError::MissingSecret));
        assert_eq!(service.verify("a.b.c"), Err(AuthError::MissingSecret));
    }

    #[test]
    fn test_out_of_range_lifetime_is_an_error() {
        let service = TokenService::new(Some(&secret()));

        assert_eq!(service.issue(1, i64::MAX), Err(AuthError::Signing));
        assert_eq!(service.issue(1, 1_000_000_000_000), Err(AuthError::Signing));
    }

    #[test]
    fn test_invalid_token_fails() {
        let service = TokenService::new(Some(&secret()));
        assert_eq!(service.verify("invalid_token"), Err(AuthError::Malformed));
    }
}
