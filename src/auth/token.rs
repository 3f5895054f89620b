/// JWT Token Service
///
/// Issues, verifies and refreshes HS512-signed tokens whose payload is
/// `{sub, created, exp}`. Expiry is judged against an injected [`Clock`]
/// rather than inside the JWT library, so every failure comes back as a
/// distinct [`TokenError`] and tests can move time explicitly.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use std::sync::Arc;

use crate::auth::claims::{Claims, RawClaims};
use crate::auth::clock::{Clock, SystemClock};
use crate::configuration::JwtSettings;
use crate::error::{AppError, TokenError, ValidationError};

const ALGORITHM: Algorithm = Algorithm::HS512;

/// Stateless token lifecycle policy. Cheap to clone; share one per process.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    expiration: i64,
    clock: Arc<dyn Clock>,
}

impl TokenService {
    pub fn new(settings: &JwtSettings) -> Self {
        Self::with_clock(settings, Arc::new(SystemClock))
    }

    pub fn with_clock(settings: &JwtSettings, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(ALGORITHM);
        // exp is checked against `clock`, and missing claims are reported
        // as ClaimsMissing after decoding
        validation.validate_exp = false;
        validation.required_spec_claims.clear();

        Self {
            encoding_key: EncodingKey::from_secret(settings.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(settings.secret.as_bytes()),
            validation,
            expiration: settings.expiration,
            clock,
        }
    }

    /// Token lifetime in seconds
    pub fn expires_in(&self) -> i64 {
        self.expiration
    }

    /// Sign a fresh token for `username`.
    ///
    /// # Errors
    /// Validation error for an empty username, internal error if signing fails
    pub fn issue(&self, username: &str) -> Result<String, AppError> {
        if username.trim().is_empty() {
            return Err(ValidationError::EmptyField("username".to_string()).into());
        }
        let claims = Claims::new(username, self.clock.now(), self.expiration);
        self.sign(&claims)
    }

    /// Decode and signature-check `token`. Expiry is not considered.
    pub fn claims(&self, token: &str) -> Result<Claims, TokenError> {
        let data = decode::<RawClaims>(token, &self.decoding_key, &self.validation)?;
        Claims::try_from(data.claims)
    }

    /// Username carried by a correctly signed token.
    pub fn verify(&self, token: &str) -> Result<String, TokenError> {
        self.claims(token).map(|claims| claims.sub)
    }

    pub fn is_expired(&self, token: &str) -> Result<bool, TokenError> {
        let claims = self.claims(token)?;
        Ok(claims.is_expired_at(self.clock.now()))
    }

    pub fn can_refresh(&self, token: &str) -> Result<bool, TokenError> {
        self.is_expired(token).map(|expired| !expired)
    }

    /// Re-issue `token` with a new issue time and expiration.
    ///
    /// # Errors
    /// - any [`TokenError`] from decoding
    /// - `TokenError::Expired` if the token is no longer valid
    pub fn refresh(&self, token: &str) -> Result<String, AppError> {
        let claims = self.claims(token)?;
        let now = self.clock.now();
        if claims.is_expired_at(now) {
            return Err(TokenError::Expired.into());
        }
        self.sign(&claims.renewed(now, self.expiration))
    }

    /// True iff the token belongs to `expected_username` and has not expired.
    pub fn validate(&self, token: &str, expected_username: &str) -> Result<bool, TokenError> {
        let claims = self.claims(token)?;
        Ok(claims.sub == expected_username && !claims.is_expired_at(self.clock.now()))
    }

    fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(ALGORITHM), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
    }
}
