//! Signed session tokens.

use chrono::{DateTime, Duration, Utc};
use derive_getters::Getters;
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::auth::AuthError;

/// Claims carried by a session token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct Claims {
    /// Account id.
    sub: i32,
    username: String,
    iat: i64,
    exp: i64,
}

/// Outcome of verifying a token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    /// Signature and expiry check out.
    Valid(Claims),
    /// Signature checks out but the token has expired.
    Expired,
    /// Not a token we issued.
    Malformed,
}

impl TokenVerdict {
    /// Converts the verdict into the claims or the matching [`AuthError`].
    pub fn into_result(self) -> Result<Claims, AuthError> {
        match self {
            Self::Valid(claims) => Ok(claims),
            Self::Expired => Err(AuthError::ExpiredToken),
            Self::Malformed => Err(AuthError::MalformedToken),
        }
    }
}

/// Issues and verifies HS256 session tokens.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    /// Creates a service signing with `secret`; tokens live for `ttl`.
    #[instrument(skip(secret))]
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
            ttl,
        }
    }

    /// Token lifetime.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for an account, valid from now.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Signing`] if encoding fails.
    #[instrument(skip(self))]
    pub fn issue(&self, user_id: i32, username: &str) -> Result<String, AuthError> {
        self.issue_at(user_id, username, Utc::now())
    }

    /// Issues a token as if the current time were `issued_at`.
    #[instrument(skip(self))]
    pub fn issue_at(
        &self,
        user_id: i32,
        username: &str,
        issued_at: DateTime<Utc>,
    ) -> Result<String, AuthError> {
        let claims = Claims {
            sub: user_id,
            username: username.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + self.ttl).timestamp(),
        };
        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AuthError::Signing(e.to_string()))?;
        debug!(user_id, exp = claims.exp, "Token issued");
        Ok(token)
    }

    /// Verifies a token.
    #[instrument(skip_all)]
    pub fn verify(&self, token: &str) -> TokenVerdict {
        match decode::<Claims>(token, &self.decoding, &self.validation) {
            Ok(data) => TokenVerdict::Valid(data.claims),
            Err(e) => match e.kind() {
                ErrorKind::ExpiredSignature => {
                    debug!("Token expired");
                    TokenVerdict::Expired
                }
                other => {
                    warn!(error = ?other, "Token rejected");
                    TokenVerdict::Malformed
                }
            },
        }
    }
}

/// Extracts the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(header: &str) -> Option<&str> {
    header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
