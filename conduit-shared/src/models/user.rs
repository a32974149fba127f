/// User model, follow relation and public representations
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
///     username TEXT NOT NULL UNIQUE,
///     email TEXT NOT NULL UNIQUE,
///     password_hash TEXT NOT NULL,
///     bio TEXT,
///     image TEXT,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
///     updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
///
/// CREATE TABLE follows (
///     follower_id UUID NOT NULL REFERENCES users(id),
///     followed_id UUID NOT NULL REFERENCES users(id),
///     PRIMARY KEY (follower_id, followed_id)
/// );
/// ```
///
/// # Example
///
/// ```no_run
/// use conduit_shared::models::user::{CreateUser, User};
/// use sqlx::PgPool;
///
/// # async fn example(pool: PgPool) -> Result<(), sqlx::Error> {
/// let user = User::create(
///     &pool,
///     CreateUser {
///         username: "jake".to_string(),
///         email: "jake@jake.jake".to_string(),
///         password_hash: "$argon2id$...".to_string(),
///     },
/// )
/// .await?;
///
/// let found = User::find_by_username(&pool, "jake").await?;
/// assert_eq!(found.map(|u| u.id), Some(user.id));
/// # Ok(())
/// # }
/// ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

/// User account
///
/// The password is stored as an Argon2id digest and never serialised.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID
    pub id: Uuid,

    /// Public handle, unique across users
    pub username: String,

    /// Login address, unique across users
    pub email: String,

    /// Argon2id password digest
    #[serde(skip_serializing)]
    pub password_hash: String,

    /// Optional biography
    pub bio: Option<String>,

    /// Optional avatar URL
    pub image: Option<String>,

    /// When the account was created
    pub created_at: DateTime<Utc>,

    /// When the account was last updated
    pub updated_at: DateTime<Utc>,
}

/// Input for creating a user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateUser {
    pub username: String,
    pub email: String,

    /// Digest, never the plaintext password
    pub password_hash: String,
}

/// Input for updating a user
///
/// Only non-None fields are written. `bio` and `image` use `Some(None)` to
/// clear the column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUser {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password_hash: Option<String>,
    pub bio: Option<Option<String>>,
    pub image: Option<Option<String>>,
}

impl UpdateUser {
    /// Whether the update would write anything
    pub fn is_empty(&self) -> bool {
        self.username.is_none()
            && self.email.is_none()
            && self.password_hash.is_none()
            && self.bio.is_none()
            && self.image.is_none()
    }

    /// Applies the update to an in-memory user
    pub fn apply_to(self, user: &mut User) {
        if let Some(username) = self.username {
            user.username = username;
        }
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(password_hash) = self.password_hash {
            user.password_hash = password_hash;
        }
        if let Some(bio) = self.bio {
            user.bio = bio;
        }
        if let Some(image) = self.image {
            user.image = image;
        }
    }
}

/// Authenticated user representation, returned with a session token
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserView {
    pub email: String,
    pub token: String,
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
}

impl UserView {
    pub fn new(user: User, token: String) -> Self {
        Self {
            email: user.email,
            token,
            username: user.username,
            bio: user.bio,
            image: user.image,
        }
    }
}

/// Public representation of a user as seen by a (possibly anonymous) caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub username: String,
    pub bio: Option<String>,
    pub image: Option<String>,
    pub following: bool,
}

impl Profile {
    pub fn new(user: User, following: bool) -> Self {
        Self {
            username: user.username,
            bio: user.bio,
            image: user.image,
            following,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, password_hash, bio, image, created_at, updated_at";

impl User {
    /// Inserts a new user
    ///
    /// # Errors
    ///
    /// Fails on unique violations of `username` or `email`
    pub async fn create(pool: &PgPool, data: CreateUser) -> Result<Self, sqlx::Error> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, email, password_hash)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(data.username)
        .bind(data.email)
        .bind(data.password_hash)
        .fetch_one(pool)
        .await?;

        Ok(user)
    }

    /// Finds a user by ID
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by email address
    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(pool)
            .await
    }

    /// Finds a user by username
    pub async fn find_by_username(
        pool: &PgPool,
        username: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE username = $1"
        ))
        .bind(username)
        .fetch_optional(pool)
        .await
    }

    /// Updates an existing user
    ///
    /// Only non-None fields in `data` are written; `updated_at` is always
    /// refreshed. Returns None if the user does not exist.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        data: UpdateUser,
    ) -> Result<Option<Self>, sqlx::Error> {
        let mut query = String::from("UPDATE users SET updated_at = NOW()");
        let mut bind_count = 1;

        for (column, present) in [
            ("username", data.username.is_some()),
            ("email", data.email.is_some()),
            ("password_hash", data.password_hash.is_some()),
            ("bio", data.bio.is_some()),
            ("image", data.image.is_some()),
        ] {
            if present {
                bind_count += 1;
                query.push_str(&format!(", {} = ${}", column, bind_count));
            }
        }

        query.push_str(&format!(" WHERE id = $1 RETURNING {USER_COLUMNS}"));

        let mut q = sqlx::query_as::<_, User>(&query).bind(id);

        if let Some(username) = data.username {
            q = q.bind(username);
        }
        if let Some(email) = data.email {
            q = q.bind(email);
        }
        if let Some(password_hash) = data.password_hash {
            q = q.bind(password_hash);
        }
        if let Some(bio) = data.bio {
            q = q.bind(bio);
        }
        if let Some(image) = data.image {
            q = q.bind(image);
        }

        q.fetch_optional(pool).await
    }

    /// Whether `follower` follows `followed`
    pub async fn is_following(
        pool: &PgPool,
        follower: Uuid,
        followed: Uuid,
    ) -> Result<bool, sqlx::Error> {
        let (exists,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM follows WHERE follower_id = $1 AND followed_id = $2)",
        )
        .bind(follower)
        .bind(followed)
        .fetch_one(pool)
        .await?;

        Ok(exists)
    }

    /// Adds a follow edge; a no-op if it already exists
    pub async fn follow(pool: &PgPool, follower: Uuid, followed: Uuid) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO follows (follower_id, followed_id)
            VALUES ($1, $2)
            ON CONFLICT (follower_id, followed_id) DO NOTHING
            "#,
        )
        .bind(follower)
        .bind(followed)
        .execute(pool)
        .await?;

        Ok(())
    }

    /// Removes a follow edge; a no-op if it does not exist
    pub async fn unfollow(
        pool: &PgPool,
        follower: Uuid,
        followed: Uuid,
    ) -> Result<(), sqlx::Error> {
        sqlx::query("DELETE FROM follows WHERE follower_id = $1 AND followed_id = $2")
            .bind(follower)
            .bind(followed)
            .execute(pool)
            .await?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jake() -> User {
        User {
            id: Uuid::new_v4(),
            username: "jake".to_string(),
            email: "jake@jake.jake".to_string(),
            password_hash: "$argon2id$digest".to_string(),
            bio: Some("I work at statefarm".to_string()),
            image: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_update_user_default_is_empty() {
        assert!(UpdateUser::default().is_empty());
    }

    #[test]
    fn test_apply_to_overwrites_only_provided_fields() {
        let mut user = jake();
        UpdateUser {
            email: Some("jake@statefarm.com".to_string()),
            bio: Some(None),
            ..Default::default()
        }
        .apply_to(&mut user);

        assert_eq!(user.email, "jake@statefarm.com");
        assert_eq!(user.username, "jake");
        assert_eq!(user.bio, None);
    }

    #[test]
    fn test_password_hash_never_serialised() {
        let json = serde_json::to_value(jake()).unwrap();
        assert!(json.get("password_hash").is_none());
    }

    #[test]
    fn test_profile_drops_private_fields() {
        let profile = Profile::new(jake(), true);
        let json = serde_json::to_value(&profile).unwrap();

        assert_eq!(json["username"], "jake");
        assert_eq!(json["following"], true);
        assert!(json.get("email").is_none());
    }
}
