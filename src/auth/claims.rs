/// JWT Claims structure
///
/// Payload carried inside every issued token: the username as `sub`,
/// the issue instant as `created` (Unix milliseconds) and the standard
/// `exp` (Unix seconds).

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::TokenError;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issue instant, Unix milliseconds
    pub created: i64,
    /// Expiration time, Unix seconds
    pub exp: i64,
}

impl Claims {
    /// Create claims for `username` issued at `issued_at`, valid for `ttl_seconds`.
    pub fn new(username: impl Into<String>, issued_at: DateTime<Utc>, ttl_seconds: i64) -> Self {
        Self {
            sub: username.into(),
            created: issued_at.timestamp_millis(),
            exp: ceil_seconds(issued_at + Duration::seconds(ttl_seconds)),
        }
    }

    /// Same subject, new issue time and an expiration strictly later than
    /// the current one, even when renewed within the same second.
    pub fn renewed(&self, issued_at: DateTime<Utc>, ttl_seconds: i64) -> Self {
        let mut renewed = Self::new(self.sub.clone(), issued_at, ttl_seconds);
        renewed.exp = renewed.exp.max(self.exp + 1);
        renewed
    }

    /// A token is valid while `now < exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.created)
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// `exp` is whole seconds; round up so a token never lives shorter than its TTL.
fn ceil_seconds(at: DateTime<Utc>) -> i64 {
    let millis = at.timestamp_millis();
    millis.div_euclid(1000) + i64::from(millis.rem_euclid(1000) != 0)
}

/// Payload as it comes off the wire, before required claims are checked.
#[derive(Debug, Deserialize)]
pub(crate) struct RawClaims {
    pub sub: Option<String>,
    pub created: Option<i64>,
    pub exp: Option<i64>,
}

impl TryFrom<RawClaims> for Claims {
    type Error = TokenError;

    fn try_from(raw: RawClaims) -> Result<Self, Self::Error> {
        let sub = raw
            .sub
            .filter(|s| !s.is_empty())
            .ok_or(TokenError::ClaimsMissing)?;
        let exp = raw.exp.ok_or(TokenError::ClaimsMissing)?;
        Ok(Self {
            sub,
            // informational only, absent reads as the epoch
            created: raw.created.unwrap_or(0),
            exp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    #[test]
    fn test_claims_creation() {
        let claims = Claims::new("admin", at(1_650_000_000), 3600);

        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.created, 1_650_000_000_000);
        assert_eq!(claims.exp, 1_650_003_600);
        assert_eq!(claims.issued_at(), Some(at(1_650_000_000)));
        assert_eq!(claims.expires_at(), Some(at(1_650_003_600)));
    }

    #[test]
    fn test_expiry_boundary() {
        let claims = Claims::new("admin", at(1_000), 60);

        assert!(!claims.is_expired_at(at(1_000)));
        assert!(!claims.is_expired_at(at(1_059)));
        assert!(claims.is_expired_at(at(1_060)));
        assert!(claims.is_expired_at(at(5_000)));
    }

    #[test]
    fn test_renewed_keeps_subject() {
        let original = Claims::new("admin", at(1_000), 60);
        let renewed = original.renewed(at(1_030), 60);

        assert_eq!(renewed.sub, original.sub);
        assert!(renewed.exp > original.exp);
        assert!(renewed.created > original.created);
    }

    #[test]
    fn test_renewed_within_same_second_still_extends() {
        let original = Claims::new("admin", at(1_650_000_000), 3600);

        let same_instant = original.renewed(at(1_650_000_000), 3600);
        assert!(same_instant.exp > original.exp);

        let half_second_later = original.renewed(
            DateTime::from_timestamp_millis(1_650_000_000_500).unwrap(),
            3600,
        );
        assert!(half_second_later.exp > original.exp);
        assert!(half_second_later.created > original.created);

        let twice = same_instant.renewed(at(1_650_000_000), 3600);
        assert!(twice.exp > same_instant.exp);
    }

    #[test]
    fn test_expiration_rounds_up_to_full_ttl() {
        let issued = DateTime::from_timestamp_millis(1_000_900).unwrap();
        let claims = Claims::new("admin", issued, 60);

        assert_eq!(claims.exp, 1_061);
        assert!(!claims.is_expired_at(DateTime::from_timestamp_millis(1_060_100).unwrap()));
        assert!(!claims.is_expired_at(DateTime::from_timestamp_millis(1_060_900).unwrap()));
        assert!(claims.is_expired_at(at(1_061)));
    }

    #[test]
    fn test_raw_claims_without_subject() {
        let raw = RawClaims { sub: None, created: Some(1), exp: Some(2) };
        assert_eq!(Claims::try_from(raw), Err(TokenError::ClaimsMissing));

        let empty = RawClaims { sub: Some(String::new()), created: Some(1), exp: Some(2) };
        assert_eq!(Claims::try_from(empty), Err(TokenError::ClaimsMissing));
    }

    #[test]
    fn test_raw_claims_without_expiration() {
        let raw = RawClaims { sub: Some("admin".to_string()), created: Some(1), exp: None };
        assert_eq!(Claims::try_from(raw), Err(TokenError::ClaimsMissing));
    }

    #[test]
    fn test_wire_field_names() {
        let claims = Claims::new("admin", at(1_000), 60);
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["sub"], "admin");
        assert_eq!(json["created"], 1_000_000);
        assert_eq!(json["exp"], 1_060);
    }
}
