/// Ownership-gated mutation
///
/// Update and delete of articles and comments share one procedure:
///
/// 1. no caller: `Unauthorized`
/// 2. resource does not load: `NotFound`
/// 3. caller is not the owner: `Forbidden`
/// 4. run the action with the loaded resource
///
/// The steps run strictly in that order, so an anonymous request never
/// learns whether a key exists and a non-owner never reaches the action.

use std::future::Future;

use uuid::Uuid;

use super::require_caller;
use crate::error::{DomainError, DomainResult};

/// Runs `act` on the resource returned by `load` if `caller` owns it
///
/// `resource` names the resource kind in `NotFound`/`Forbidden` errors.
/// `load` may be a store lookup or a handler-level loader that fails with a
/// more specific `NotFound` (a comment whose article is missing, for
/// example).
pub async fn mutate_owned<R, T, E, L, LF, O, A, AF>(
    caller: Option<Uuid>,
    resource: &'static str,
    load: L,
    owner: O,
    act: A,
) -> DomainResult<T>
where
    L: FnOnce() -> LF,
    LF: Future<Output = Result<Option<R>, E>>,
    DomainError: From<E>,
    O: FnOnce(&R) -> Uuid,
    A: FnOnce(Uuid, R) -> AF,
    AF: Future<Output = DomainResult<T>>,
{
    let caller = require_caller(caller)?;

    let target = load().await?.ok_or(DomainError::NotFound(resource))?;

    if owner(&target) != caller {
        return Err(DomainError::Forbidden(resource));
    }

    act(caller, target).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};

    struct Note {
        owner: Uuid,
    }

    async fn run(
        caller: Option<Uuid>,
        stored: Option<Uuid>,
        acted: &AtomicBool,
    ) -> DomainResult<&'static str> {
        mutate_owned(
            caller,
            "note",
            || async move { Ok::<_, DomainError>(stored.map(|owner| Note { owner })) },
            |note: &Note| note.owner,
            |_, _| async move {
                acted.store(true, Ordering::SeqCst);
                Ok("done")
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_unauthorized_even_for_missing_key() {
        let acted = AtomicBool::new(false);
        let result = run(None, None, &acted).await;

        assert!(matches!(result, Err(DomainError::Unauthorized)));
        assert!(!acted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_missing_resource_is_not_found() {
        let acted = AtomicBool::new(false);
        let result = run(Some(Uuid::new_v4()), None, &acted).await;

        assert!(matches!(result, Err(DomainError::NotFound("note"))));
    }

    #[tokio::test]
    async fn test_non_owner_is_forbidden_before_action() {
        let acted = AtomicBool::new(false);
        let result = run(Some(Uuid::new_v4()), Some(Uuid::new_v4()), &acted).await;

        assert!(matches!(result, Err(DomainError::Forbidden("note"))));
        assert!(!acted.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_owner_runs_action() {
        let acted = AtomicBool::new(false);
        let owner = Uuid::new_v4();
        let result = run(Some(owner), Some(owner), &acted).await;

        assert_eq!(result.unwrap(), "done");
        assert!(acted.load(Ordering::SeqCst));
    }
}
