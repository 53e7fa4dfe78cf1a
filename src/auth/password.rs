use crate::error::AppError;
use bcrypt::{hash, verify};

/// Cost factor for bcrypt. Deliberately slow so brute-forcing stored digests
/// stays computationally expensive.
const HASHING_COST: u32 = 12;

/// Hashes a plaintext password for storage.
///
/// A failure inside the hashing library propagates as an error; it is never
/// masked into an empty digest. Hashing is CPU-bound, so handlers run this
/// through `web::block` rather than on the request reactor.
pub fn hash_password(password: &str) -> Result<String, AppError> {
    hash(password, HASHING_COST)
        .map_err(|e| AppError::InternalServerError(format!("Failed to hash password: {}", e)))
}

/// Compares a plaintext password against a stored digest.
///
/// Returns `false` on any mismatch or malformed digest. A wrong password is a
/// boolean result, not an error.
pub fn verify_password(password: &str, hashed_password: &str) -> bool {
    verify(password, hashed_password).unwrap_or(false)
}
