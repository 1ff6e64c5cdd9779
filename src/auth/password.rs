//! Password hashing.

use tracing::{debug, instrument, warn};

use crate::auth::AuthError;

/// bcrypt cost used when none is configured.
pub const DEFAULT_BCRYPT_COST: u32 = 10;

/// Hashes and verifies passwords with bcrypt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PasswordHasher {
    cost: u32,
}

impl PasswordHasher {
    /// Creates a hasher with the given bcrypt cost.
    #[instrument]
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }

    /// bcrypt cost factor.
    pub fn cost(&self) -> u32 {
        self.cost
    }

    /// Hashes a plaintext password.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hashing`] if the cost is out of range.
    #[instrument(skip(self, plaintext), fields(cost = self.cost))]
    pub fn hash(&self, plaintext: &str) -> Result<String, AuthError> {
        debug!("Hashing password");
        bcrypt::hash(plaintext, self.cost).map_err(|e| AuthError::Hashing(e.to_string()))
    }

    /// Checks a plaintext password against a stored digest.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::Hashing`] if the digest is not a bcrypt hash.
    #[instrument(skip_all)]
    pub fn verify(&self, plaintext: &str, digest: &str) -> Result<bool, AuthError> {
        bcrypt::verify(plaintext, digest).map_err(|e| {
            warn!(error = %e, "Stored password digest is unreadable");
            AuthError::Hashing(e.to_string())
        })
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new(DEFAULT_BCRYPT_COST)
    }
}
