//! PBKDF2-SHA256 password hashing (PHC string format)

use pbkdf2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use once_cell::sync::Lazy;
use pbkdf2::{Params, Pbkdf2};
use rand_core::OsRng;

use super::AuthError;

/// Iteration count for new hashes. Verification reads the count stored in
/// each hash, so raising this only affects passwords hashed afterwards.
const HASH_ROUNDS: u32 = 29_000;

/// Derived key length in bytes
const HASH_OUTPUT_LEN: usize = 32;

/// Hash a plaintext password with a fresh random salt.
pub fn hash_password(plain: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let params = Params {
        rounds: HASH_ROUNDS,
        output_length: HASH_OUTPUT_LEN,
    };

    let hash = Pbkdf2
        .hash_password_customized(plain.as_bytes(), None, None, params, &salt)
        .map_err(|e| AuthError::Hash(e.to_string()))?;

    Ok(hash.to_string())
}

/// Compare a plaintext password against a stored hash.
///
/// A stored value that is not a parseable hash never matches.
pub fn verify_password(plain: &str, stored: &str) -> bool {
    match PasswordHash::new(stored) {
        Ok(hash) => Pbkdf2.verify_password(plain.as_bytes(), &hash).is_ok(),
        Err(_) => false,
    }
}

/// Hash checked when a login names an unknown account, so that path costs
/// the same PBKDF2 work as a wrong password.
static DUMMY_HASH: Lazy<Option<String>> = Lazy::new(|| hash_password("studydesk-unknown-account").ok());

/// Spend one full verification on a throwaway hash. Always false.
pub fn verify_dummy(plain: &str) -> bool {
    if let Some(hash) = DUMMY_HASH.as_deref() {
        let _ = verify_password(plain, hash);
    }
    false
}

/// Whether a stored password is already a PBKDF2 PHC hash (vs. legacy plaintext).
pub fn is_password_hash(stored: &str) -> bool {
    stored.starts_with("$pbkdf2") && PasswordHash::new(stored).is_ok()
}
