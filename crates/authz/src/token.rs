//! HS256 JWT issuing and verification

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use time::{Duration, OffsetDateTime};

use bookshelf_kernel::settings::AuthSettings;

use crate::error::AuthError;

const MAX_TTL_MINUTES: i64 = i64::MAX / 60;

/// JWT payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    /// Issued at, seconds since epoch
    pub iat: i64,
    /// Expiry, seconds since epoch
    pub exp: i64,
}

/// A freshly signed token and what it encodes
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub claims: Claims,
}

/// Signs and verifies bearer tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is exact, no leeway.
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    /// Build from configuration. The lifetime must be at least one minute and
    /// fit in a `time::Duration`.
    pub fn from_settings(settings: &AuthSettings) -> anyhow::Result<Self> {
        let minutes = i64::try_from(settings.token_ttl_minutes)
            .ok()
            .filter(|minutes| (1..=MAX_TTL_MINUTES).contains(minutes))
            .ok_or_else(|| {
                anyhow::anyhow!(
                    "auth.token_ttl_minutes must be between 1 and {MAX_TTL_MINUTES}, got {}",
                    settings.token_ttl_minutes
                )
            })?;

        Ok(Self::new(settings.secret.as_bytes(), Duration::minutes(minutes)))
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issue a token for `subject` valid from now
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, AuthError> {
        self.issue_at(subject, OffsetDateTime::now_utc())
    }

    /// Issue a token for `subject` as if signed at `issued_at`
    pub fn issue_at(
        &self,
        subject: &str,
        issued_at: OffsetDateTime,
    ) -> Result<IssuedToken, AuthError> {
        let expires_at = issued_at.saturating_add(self.ttl);
        let claims = Claims {
            sub: subject.to_string(),
            iat: issued_at.unix_timestamp(),
            exp: expires_at.unix_timestamp(),
        };

        let access_token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(AuthError::Signing)?;

        tracing::debug!(subject, exp = claims.exp, "issued access token");

        Ok(IssuedToken {
            access_token,
            expires_in: self.ttl.whole_seconds(),
            claims,
        })
    }

    /// Check signature and expiry, returning the decoded claims
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|err| match err.kind() {
                ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::InvalidToken,
            })
    }
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}
