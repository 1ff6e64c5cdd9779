//! Authentication errors.

/// Authentication failure.
///
/// Credential failures deliberately don't say which field was wrong.
#[derive(Debug, Clone, PartialEq, Eq, derive_more::Display)]
pub enum AuthError {
    /// No bearer token was supplied.
    #[display("Missing or malformed Authorization header")]
    MissingToken,

    /// The token's signature was valid but it has expired.
    #[display("Invalid or expired token")]
    ExpiredToken,

    /// The token could not be decoded or its signature didn't match.
    #[display("Invalid or expired token")]
    MalformedToken,

    /// Unknown username or wrong password.
    #[display("Invalid credentials")]
    InvalidCredentials,

    /// The hashing primitive failed.
    #[display("Password hashing failed: {}", _0)]
    Hashing(String),

    /// The token could not be signed.
    #[display("Token signing failed: {}", _0)]
    Signing(String),
}

impl std::error::Error for AuthError {}

impl AuthError {
    /// Whether the caller is at fault (as opposed to a server-side failure).
    pub fn is_rejection(&self) -> bool {
        !matches!(self, Self::Hashing(_) | Self::Signing(_))
    }
}
