/// Public profiles

use uuid::Uuid;

use super::profile_of;
use crate::error::{DomainError, DomainResult};
use crate::models::user::Profile;
use crate::store::Store;

/// Profile of `username` as the caller sees it; anonymous callers never
/// follow anyone
pub async fn get_profile(
    store: &dyn Store,
    caller: Option<Uuid>,
    username: &str,
) -> DomainResult<Profile> {
    let user = store
        .find_user_by_username(username)
        .await?
        .ok_or(DomainError::NotFound("profile"))?;

    profile_of(store, caller, user).await
}
