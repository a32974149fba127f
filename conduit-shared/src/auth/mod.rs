/// Authentication utilities
///
/// # Modules
///
/// - [`password`]: Argon2id password hashing and verification
/// - [`jwt`]: Session token generation and validation
/// - [`credentials`]: The hash/compare/sign collaborator used by handlers
/// - [`middleware`]: Caller resolution from the `Authorization` header
///
/// # Example
///
/// ```no_run
/// use conduit_shared::auth::Credentials;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let credentials = Credentials::new(std::env::var("JWT_SECRET")?);
/// let digest = credentials.hash("user_password")?;
/// assert!(credentials.compare("user_password", &digest)?);
/// # Ok(())
/// # }
/// ```

pub mod credentials;
pub mod jwt;
pub mod middleware;
pub mod password;

pub use credentials::Credentials;
