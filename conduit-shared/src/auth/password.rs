/// Password hashing using Argon2id
///
/// Stored digests are PHC strings, so the parameters travel with each hash
/// and verification never needs to know how a password was hashed.
///
/// # Parameters
///
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3
/// - **Parallelism**: 4 lanes
/// - **Output**: 32 bytes
///
/// # Example
///
/// ```
/// use conduit_shared::auth::password::{hash_password, verify_password};
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let digest = hash_password("jake-password")?;
/// assert!(verify_password("jake-password", &digest)?);
/// assert!(!verify_password("not-jake", &digest)?);
/// # Ok(())
/// # }
/// ```

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash password
    #[error("Failed to hash password: {0}")]
    HashError(String),

    /// Failed to verify password
    #[error("Failed to verify password: {0}")]
    VerifyError(String),

    /// Stored digest is not a PHC string
    #[error("Invalid password hash format: {0}")]
    InvalidHash(String),
}

fn hasher() -> Result<Argon2<'static>, PasswordError> {
    let params = ParamsBuilder::new()
        .m_cost(65536)
        .t_cost(3)
        .p_cost(4)
        .output_len(32)
        .build()
        .map_err(|e| PasswordError::HashError(format!("Invalid parameters: {}", e)))?;

    Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
}

/// Hashes a plaintext password with a fresh random salt
///
/// # Errors
///
/// Returns `PasswordError::HashError` if hashing fails
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let digest = hasher()?
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashError(format!("Hash generation failed: {}", e)))?;

    Ok(digest.to_string())
}

/// Compares a plaintext password against a stored digest
///
/// Returns `Ok(false)` on mismatch; errors are reserved for digests that
/// cannot be parsed or verified at all.
pub fn verify_password(password: &str, digest: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(digest)
        .map_err(|e| PasswordError::InvalidHash(format!("Failed to parse hash: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerifyError(format!("Verification failed: {}", e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_password_uses_argon2id() {
        let digest = hash_password("jake-password").expect("Hash should succeed");

        assert!(digest.starts_with("$argon2id$"));
        assert!(digest.contains("v=19"));
        assert!(digest.contains("m=65536"));
        assert!(digest.contains("t=3"));
        assert!(digest.contains("p=4"));
    }

    #[test]
    fn test_same_password_gets_different_salts() {
        let first = hash_password("same").expect("Hash 1 should succeed");
        let second = hash_password("same").expect("Hash 2 should succeed");

        assert_ne!(first, second);
    }

    #[test]
    fn test_verify_password() {
        let digest = hash_password("correct horse").expect("Hash should succeed");

        assert!(verify_password("correct horse", &digest).unwrap());
        assert!(!verify_password("battery staple", &digest).unwrap());
        assert!(!verify_password("", &digest).unwrap());
    }

    #[test]
    fn test_verify_password_garbage_digest_never_matches() {
        assert!(verify_password("password", "not-a-phc-string").is_err());
        assert!(!matches!(
            verify_password("password", "$argon2id$invalid"),
            Ok(true)
        ));
    }
}
