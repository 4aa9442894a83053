use argon2::{
    Argon2,
    password_hash::{
        self, PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use super::error::CryptResult;

/// Hashes `password` into a PHC string with a fresh random salt.
pub fn hash_password(password: &str) -> CryptResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Returns `Ok(false)` on mismatch; `Err` only when `hash` is not a valid PHC string.
pub fn verify_password(hash: &str, password: &str) -> CryptResult<bool> {
    let parsed = PasswordHash::new(hash)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}
