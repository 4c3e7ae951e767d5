//! Effective claim expansion.

use warden_core::UserId;

use crate::{AuthError, ClaimSet, PermissionStore};

/// Compute the effective claim set of a user from its current role memberships.
///
/// The result is the deduplicated union of every claim attached to every role
/// the user holds, recomputed on every call. A user with no roles gets an empty
/// set. If any lookup fails, the whole expansion fails; a partial set is never
/// returned.
pub async fn expand_effective_claims(
    store: &dyn PermissionStore,
    user_id: UserId,
) -> Result<ClaimSet, AuthError> {
    if store.find_user_by_id(user_id).await?.is_none() {
        return Err(AuthError::NotFound(format!("user {user_id}")));
    }

    let roles = store.roles_for_user(user_id).await?;

    let mut effective = ClaimSet::new();
    for role in &roles {
        effective.extend(store.claims_for_role(role).await?);
    }

    Ok(effective)
}
