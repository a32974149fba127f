/// Account handlers: sign-up, sign-in, current user
///
/// Every successful call returns the user with a freshly signed session
/// token, so clients can refresh a token simply by reading `/api/user`.

use serde::Deserialize;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

use super::{not_blank, require_caller, required, required_secret, Created};
use crate::auth::Credentials;
use crate::error::{DomainError, DomainResult};
use crate::models::user::{CreateUser, UpdateUser, User, UserView};
use crate::store::Store;

/// Payload of `POST /api/users`
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct Registration {
    pub username: Option<String>,

    #[validate(email(message = "is invalid"))]
    pub email: Option<String>,

    pub password: Option<String>,
}

/// Payload of `POST /api/users/login`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Login {
    pub email: Option<String>,
    pub password: Option<String>,
}

/// Payload of `PUT /api/user`; absent fields are left unchanged and an
/// empty `bio` or `image` clears it
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct UserChanges {
    pub username: Option<String>,

    #[validate(email(message = "is invalid"))]
    pub email: Option<String>,

    pub password: Option<String>,
    pub bio: Option<String>,
    pub image: Option<String>,
}

/// First failed validator rule as a domain error
fn check(input: &impl Validate) -> DomainResult<()> {
    input.validate().map_err(|errors| {
        errors
            .field_errors()
            .into_iter()
            .next()
            .map(|(field, errors)| {
                let message = errors
                    .first()
                    .and_then(|e| e.message.as_ref())
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| "is invalid".to_string());
                DomainError::validation(field.to_string(), message)
            })
            .unwrap_or_else(|| DomainError::validation("user", "is invalid"))
    })
}

fn with_token(credentials: &Credentials, user: User) -> DomainResult<UserView> {
    let token = credentials.sign(user.id)?;
    Ok(UserView::new(user, token))
}

async fn find_caller(store: &dyn Store, caller: Option<Uuid>) -> DomainResult<User> {
    let user_id = require_caller(caller)?;
    store
        .find_user_by_id(user_id)
        .await?
        .ok_or(DomainError::NotFound("user"))
}

/// Registers a new account
pub async fn sign_up(
    store: &dyn Store,
    credentials: &Credentials,
    input: Registration,
) -> DomainResult<Created<UserView>> {
    let username = required(input.username.as_deref(), "username")?;
    let email = required(input.email.as_deref(), "email")?;
    let password = required_secret(input.password.as_deref(), "password")?;
    check(&input)?;

    if store.find_user_by_email(email).await?.is_some() {
        return Err(DomainError::AlreadyTaken("email"));
    }
    if store.find_user_by_username(username).await?.is_some() {
        return Err(DomainError::AlreadyTaken("username"));
    }

    let password_hash = credentials.hash(password)?;
    let user = store
        .create_user(CreateUser {
            username: username.to_string(),
            email: email.to_string(),
            password_hash,
        })
        .await?;

    info!(user_id = %user.id, username = %user.username, "User registered");

    with_token(credentials, user).map(Created)
}

/// Exchanges an email and password for a session token
pub async fn sign_in(
    store: &dyn Store,
    credentials: &Credentials,
    input: Login,
) -> DomainResult<UserView> {
    let email = required(input.email.as_deref(), "email")?;
    let password = required_secret(input.password.as_deref(), "password")?;

    let user = store
        .find_user_by_email(email)
        .await?
        .ok_or(DomainError::NotFound("user"))?;

    if !credentials.compare(password, &user.password_hash)? {
        return Err(DomainError::validation("email or password", "is invalid"));
    }

    info!(user_id = %user.id, "User signed in");
    with_token(credentials, user)
}

/// The caller's own account
pub async fn current_user(
    store: &dyn Store,
    credentials: &Credentials,
    caller: Option<Uuid>,
) -> DomainResult<UserView> {
    let user = find_caller(store, caller).await?;
    with_token(credentials, user)
}

/// Overwrites the provided fields of the caller's account
pub async fn update_user(
    store: &dyn Store,
    credentials: &Credentials,
    caller: Option<Uuid>,
    changes: UserChanges,
) -> DomainResult<UserView> {
    let user = find_caller(store, caller).await?;

    not_blank(changes.username.as_deref(), "username")?;
    not_blank(changes.email.as_deref(), "email")?;
    not_blank(changes.password.as_deref(), "password")?;
    check(&changes)?;

    let username = changes.username.map(|u| u.trim().to_string());
    let email = changes.email.map(|e| e.trim().to_string());

    if let Some(email) = email.as_deref() {
        if let Some(other) = store.find_user_by_email(email).await? {
            if other.id != user.id {
                return Err(DomainError::AlreadyTaken("email"));
            }
        }
    }
    if let Some(username) = username.as_deref() {
        if let Some(other) = store.find_user_by_username(username).await? {
            if other.id != user.id {
                return Err(DomainError::AlreadyTaken("username"));
            }
        }
    }

    let password_hash = match changes.password.as_deref() {
        Some(password) => Some(credentials.hash(password)?),
        None => None,
    };

    let update = UpdateUser {
        username,
        email,
        password_hash,
        bio: changes.bio.map(clearable),
        image: changes.image.map(clearable),
    };
    if update.is_empty() {
        return with_token(credentials, user);
    }

    let updated = store
        .update_user(user.id, update)
        .await?
        .ok_or(DomainError::NotFound("user"))?;

    info!(user_id = %updated.id, "User updated");
    with_token(credentials, updated)
}

/// An empty string clears an optional column
fn clearable(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
