/// Credential collaborator handed to the service layer
///
/// Bundles the three operations the handlers need from the outside world:
/// hashing a password, comparing a password against a digest, and signing
/// a session token for a user. Verification is here as well so the HTTP
/// middleware and the handlers agree on one secret.
///
/// # Example
///
/// ```
/// use conduit_shared::auth::Credentials;
/// use uuid::Uuid;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new("your-secret-key-at-least-32-bytes");
///
/// let digest = credentials.hash("hunter22")?;
/// assert!(credentials.compare("hunter22", &digest)?);
///
/// let user_id = Uuid::new_v4();
/// let token = credentials.sign(user_id)?;
/// assert_eq!(credentials.verify(&token)?, user_id);
/// # Ok(())
/// # }
/// ```

use chrono::Duration;
use uuid::Uuid;

use super::jwt::{self, Claims, JwtError};
use super::password::{self, PasswordError};

/// Password hashing and session token signing
#[derive(Clone)]
pub struct Credentials {
    secret: String,
    token_ttl: Duration,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl Credentials {
    /// Creates credentials with the default token lifetime
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            token_ttl: Claims::default_expiration(),
        }
    }

    /// Overrides the token lifetime
    pub fn with_token_ttl(mut self, token_ttl: Duration) -> Self {
        self.token_ttl = token_ttl;
        self
    }

    /// Hashes a plaintext password
    pub fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        password::hash_password(plaintext)
    }

    /// Compares a plaintext password against a stored digest
    pub fn compare(&self, plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
        password::verify_password(plaintext, digest)
    }

    /// Issues a session token bound to `user_id`
    pub fn sign(&self, user_id: Uuid) -> Result<String, JwtError> {
        jwt::create_token(&Claims::with_expiration(user_id, self.token_ttl), &self.secret)
    }

    /// Verifies a session token and returns the user it was issued to
    pub fn verify(&self, token: &str) -> Result<Uuid, JwtError> {
        Ok(jwt::validate_token(token, &self.secret)?.sub)
    }
}
