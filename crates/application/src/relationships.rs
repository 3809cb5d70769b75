//! Lookups shared by services running inside one identity transaction.

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{Permission, PermissionId, Role, RoleId, UserId};

use crate::{
    IdentityTransaction, PermissionDetails, RoleDetails, StoredUser, UserDetails,
};

pub(crate) async fn require_user(
    transaction: &mut dyn IdentityTransaction,
    user_id: UserId,
) -> AppResult<StoredUser> {
    transaction
        .find_user(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("user '{user_id}' does not exist")))
}

pub(crate) async fn require_role(
    transaction: &mut dyn IdentityTransaction,
    role_id: RoleId,
) -> AppResult<Role> {
    transaction
        .find_role(role_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("role '{role_id}' does not exist")))
}

pub(crate) async fn require_permission(
    transaction: &mut dyn IdentityTransaction,
    permission_id: PermissionId,
) -> AppResult<Permission> {
    transaction
        .find_permission(permission_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("permission '{permission_id}' does not exist")))
}

/// Deduplicates `permission_ids` and fails when any of them is unknown.
pub(crate) async fn require_permissions(
    transaction: &mut dyn IdentityTransaction,
    permission_ids: &[PermissionId],
) -> AppResult<Vec<PermissionId>> {
    let mut requested = permission_ids.to_vec();
    requested.sort_unstable();
    requested.dedup();

    let found: Vec<PermissionId> = transaction
        .permissions_by_ids(&requested)
        .await?
        .iter()
        .map(Permission::id)
        .collect();

    let missing: Vec<String> = requested
        .iter()
        .filter(|permission_id| !found.contains(permission_id))
        .map(ToString::to_string)
        .collect();
    if !missing.is_empty() {
        return Err(AppError::NotFound(format!(
            "permissions do not exist: {}",
            missing.join(", ")
        )));
    }

    Ok(requested)
}

pub(crate) fn permission_ids(permissions: &[Permission]) -> Vec<PermissionId> {
    permissions.iter().map(Permission::id).collect()
}

pub(crate) async fn user_details(
    transaction: &mut dyn IdentityTransaction,
    user_id: UserId,
) -> AppResult<UserDetails> {
    let stored = require_user(transaction, user_id).await?;
    let roles = transaction.roles_of_user(user_id).await?;
    let permissions = transaction.permissions_of_user(user_id).await?;

    Ok(UserDetails {
        user: stored.user,
        roles,
        permissions,
    })
}

pub(crate) async fn role_details(
    transaction: &mut dyn IdentityTransaction,
    role: Role,
) -> AppResult<RoleDetails> {
    let permissions = transaction.permissions_of_role(role.id()).await?;
    let user_ids = transaction.users_with_role(role.id()).await?;

    Ok(RoleDetails {
        role,
        permissions,
        user_ids,
    })
}

pub(crate) async fn permission_details(
    transaction: &mut dyn IdentityTransaction,
    permission: Permission,
) -> AppResult<PermissionDetails> {
    let role_ids = transaction.roles_with_permission(permission.id()).await?;
    let user_ids = transaction.users_with_permission(permission.id()).await?;

    Ok(PermissionDetails {
        permission,
        role_ids,
        user_ids,
    })
}
