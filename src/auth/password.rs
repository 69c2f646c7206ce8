//! Password hashing and verification

use crate::error::Result;
use std::sync::LazyLock;

/// Pre-computed hash used when the looked-up user does not exist, so the
/// unknown-email path costs roughly the same as a real verification and
/// login timing does not reveal which emails are registered.
static DUMMY_HASH: LazyLock<String> = LazyLock::new(|| {
    bcrypt::hash("pitcrew-dummy-password", bcrypt::DEFAULT_COST)
        .unwrap_or_else(|_| "$2b$12$CvRnl5qqxLXJL7hiCGLyPOBFXbz29SzAVt5pr1pYrnBb6MsNpFfha".to_string())
});

/// Hash a plaintext password with bcrypt
pub fn hash_password(plain: &str) -> Result<String> {
    Ok(bcrypt::hash(plain, bcrypt::DEFAULT_COST)?)
}

/// Verify a plaintext password against a stored hash.
///
/// Returns false on mismatch; errors only for malformed stored hashes.
pub fn verify_password(plain: &str, hash: &str) -> Result<bool> {
    Ok(bcrypt::verify(plain, hash)?)
}

/// Burn a verification against the dummy hash. Used on the unknown-email
/// login path; the result is discarded.
pub fn verify_dummy(plain: &str) {
    let _ = bcrypt::verify(plain, &DUMMY_HASH);
}
