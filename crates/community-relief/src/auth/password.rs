//! Operator password hashing with bcrypt.
//!
//! Stored values are modular-crypt strings (`$2b$12$...`), so hashes written by earlier
//! deployments under the `$2a$` and `$2y$` prefixes keep verifying.

pub use bcrypt::BcryptError;

/// Work factor for newly hashed passwords.
pub const HASH_COST: u32 = 12;

pub fn hash_password(password: &str) -> Result<String, BcryptError> {
    bcrypt::hash(password, HASH_COST)
}

/// A stored value that is not a bcrypt hash never verifies.
pub fn verify_password(password: &str, stored: &str) -> bool {
    match bcrypt::verify(password, stored) {
        Ok(matches) => matches,
        Err(error) => {
            tracing::warn!(%error, "stored password hash is unreadable");
            false
        }
    }
}
