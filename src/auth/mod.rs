//! Authentication primitives: password hashing and session tokens.

mod error;
mod password;
mod token;

pub use error::AuthError;
pub use password::{DEFAULT_BCRYPT_COST, PasswordHasher};
pub use token::{Claims, TokenService, TokenVerdict, bearer_token};
