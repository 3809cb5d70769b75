//! Role and permission assignment with propagation onto users.
//!
//! Users carry materialized permissions: assigning a role copies its
//! permissions onto the user, and linking a permission to a role copies it
//! onto every holder. Each operation runs in one identity transaction, so a
//! failure leaves no partial state behind.

use std::collections::BTreeSet;
use std::str::FromStr;
use std::sync::Arc;

use rolegate_core::{AppError, AppResult};
use rolegate_domain::{PermissionId, Role, RoleId, UserId};
use tracing::{error, info};

use crate::relationships::{
    permission_ids, require_permission, require_permissions, require_role, require_user,
    role_details, user_details,
};
use crate::{IdentityStore, IdentityTransaction, RoleDetails, UserDetails};

/// What happens to a user's permissions when one of their roles is removed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RoleRevocation {
    /// Remove every permission of the role, even ones another held role grants.
    #[default]
    Cascade,
    /// Keep permissions still conferred by another role the user holds.
    KeepShared,
}

impl RoleRevocation {
    /// Returns the configuration string.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cascade => "cascade",
            Self::KeepShared => "keep_shared",
        }
    }
}

impl FromStr for RoleRevocation {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "cascade" => Ok(Self::Cascade),
            "keep_shared" => Ok(Self::KeepShared),
            other => Err(AppError::Validation(format!(
                "unknown role revocation policy '{other}'"
            ))),
        }
    }
}

/// Application service keeping role, permission and user links consistent.
#[derive(Clone)]
pub struct SyncService {
    store: Arc<dyn IdentityStore>,
    revocation: RoleRevocation,
}

impl SyncService {
    /// Creates a new synchronizer.
    #[must_use]
    pub fn new(store: Arc<dyn IdentityStore>, revocation: RoleRevocation) -> Self {
        Self { store, revocation }
    }

    /// Returns the active role revocation policy.
    #[must_use]
    pub fn revocation(&self) -> RoleRevocation {
        self.revocation
    }

    // -----------------------------------------------------------------------
    // User permissions
    // -----------------------------------------------------------------------

    /// Grants a permission directly to a user. Idempotent.
    pub async fn assign_permission_to_user(
        &self,
        permission_id: PermissionId,
        user_id: UserId,
    ) -> AppResult<UserDetails> {
        let context = format!("permission {permission_id}, user {user_id}");
        let result: AppResult<(UserDetails, u64)> = async {
            let mut transaction = self.store.begin().await?;
            require_permission(transaction.as_mut(), permission_id).await?;
            require_user(transaction.as_mut(), user_id).await?;

            let granted = transaction
                .link_user_permissions(user_id, &[permission_id])
                .await?;
            finish_with_user(transaction, user_id).await.map(|details| (details, granted))
        }
        .await;

        let (details, granted) = sync_failure("assign permission to user", &context, result)?;
        info!(%permission_id, %user_id, granted, "permission assigned to user");
        Ok(details)
    }

    /// Revokes a directly held permission. Idempotent, including after the
    /// permission itself was deleted.
    pub async fn unassign_permission_from_user(
        &self,
        permission_id: PermissionId,
        user_id: UserId,
    ) -> AppResult<UserDetails> {
        let context = format!("permission {permission_id}, user {user_id}");
        let result: AppResult<(UserDetails, u64)> = async {
            let mut transaction = self.store.begin().await?;
            require_user(transaction.as_mut(), user_id).await?;

            let revoked = transaction
                .unlink_user_permissions(user_id, &[permission_id])
                .await?;
            finish_with_user(transaction, user_id).await.map(|details| (details, revoked))
        }
        .await;

        let (details, revoked) = sync_failure("unassign permission from user", &context, result)?;
        info!(%permission_id, %user_id, revoked, "permission unassigned from user");
        Ok(details)
    }

    /// Replaces a user's permission set with exactly `permission_ids`.
    pub async fn sync_permissions_to_user(
        &self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<UserDetails> {
        let context = format!("user {user_id}");
        let result: AppResult<(UserDetails, usize)> = async {
            let mut transaction = self.store.begin().await?;
            require_user(transaction.as_mut(), user_id).await?;
            let wanted = require_permissions(transaction.as_mut(), permission_ids).await?;

            transaction.clear_user_permissions(user_id).await?;
            transaction.link_user_permissions(user_id, &wanted).await?;
            let count = wanted.len();
            finish_with_user(transaction, user_id).await.map(|details| (details, count))
        }
        .await;

        let (details, count) = sync_failure("sync permissions to user", &context, result)?;
        info!(%user_id, permissions = count, "user permissions replaced");
        Ok(details)
    }

    // -----------------------------------------------------------------------
    // User roles
    // -----------------------------------------------------------------------

    /// Assigns a role to a user and grants the role's missing permissions.
    /// Idempotent.
    pub async fn assign_role_to_user(
        &self,
        role_id: RoleId,
        user_id: UserId,
    ) -> AppResult<UserDetails> {
        let context = format!("role {role_id}, user {user_id}");
        let result: AppResult<(UserDetails, u64)> = async {
            let mut transaction = self.store.begin().await?;
            require_role(transaction.as_mut(), role_id).await?;
            require_user(transaction.as_mut(), user_id).await?;
            let granted = grant_role(transaction.as_mut(), role_id, user_id).await?;
            finish_with_user(transaction, user_id).await.map(|details| (details, granted))
        }
        .await;

        let (details, granted) = sync_failure("assign role to user", &context, result)?;
        info!(%role_id, %user_id, granted, "role assigned to user");
        Ok(details)
    }

    /// Assigns the role called `role_name` to a user.
    pub async fn assign_role_to_user_by_name(
        &self,
        role_name: &str,
        user_id: UserId,
    ) -> AppResult<UserDetails> {
        let context = format!("role '{role_name}', user {user_id}");
        let result: AppResult<(UserDetails, RoleId, u64)> = async {
            let mut transaction = self.store.begin().await?;
            let role = transaction
                .find_role_by_name(role_name.trim())
                .await?
                .ok_or_else(|| {
                    AppError::NotFound(format!("role '{}' does not exist", role_name.trim()))
                })?;
            require_user(transaction.as_mut(), user_id).await?;
            let granted = grant_role(transaction.as_mut(), role.id(), user_id).await?;
            finish_with_user(transaction, user_id)
                .await
                .map(|details| (details, role.id(), granted))
        }
        .await;

        let (details, role_id, granted) =
            sync_failure("assign role to user by name", &context, result)?;
        info!(%role_id, %user_id, granted, "role assigned to user");
        Ok(details)
    }

    /// Removes a role from a user along with the permissions it conferred.
    /// No-op when the user does not hold the role or the role is gone.
    pub async fn unassign_role_from_user(
        &self,
        role_id: RoleId,
        user_id: UserId,
    ) -> AppResult<UserDetails> {
        let context = format!("role {role_id}, user {user_id}");
        let revocation = self.revocation;
        let result: AppResult<(UserDetails, u64)> = async {
            let mut transaction = self.store.begin().await?;
            require_user(transaction.as_mut(), user_id).await?;

            let mut revoked = 0;
            if transaction.unlink_user_role(user_id, role_id).await? {
                let to_revoke =
                    revocable_permissions(transaction.as_mut(), role_id, user_id, revocation)
                        .await?;
                revoked = transaction
                    .unlink_user_permissions(user_id, &to_revoke)
                    .await?;
            }
            finish_with_user(transaction, user_id).await.map(|details| (details, revoked))
        }
        .await;

        let (details, revoked) = sync_failure("unassign role from user", &context, result)?;
        info!(
            %role_id,
            %user_id,
            revoked,
            policy = revocation.as_str(),
            "role unassigned from user"
        );
        Ok(details)
    }

    // -----------------------------------------------------------------------
    // Role permissions
    // -----------------------------------------------------------------------

    /// Links a permission to a role and propagates it to every holder.
    /// Idempotent.
    pub async fn assign_permission_to_role(
        &self,
        permission_id: PermissionId,
        role_id: RoleId,
    ) -> AppResult<RoleDetails> {
        let context = format!("permission {permission_id}, role {role_id}");
        let result: AppResult<(RoleDetails, u64)> = async {
            let mut transaction = self.store.begin().await?;
            require_permission(transaction.as_mut(), permission_id).await?;
            let role = require_role(transaction.as_mut(), role_id).await?;

            transaction
                .link_role_permissions(role_id, &[permission_id])
                .await?;
            let propagated = propagate(transaction.as_mut(), role_id, &[permission_id]).await?;
            finish_with_role(transaction, role).await.map(|details| (details, propagated))
        }
        .await;

        let (details, propagated) = sync_failure("assign permission to role", &context, result)?;
        info!(%permission_id, %role_id, propagated, "permission assigned to role");
        Ok(details)
    }

    /// Unlinks a permission from a role. Users keep grants they already
    /// received through the role.
    pub async fn unassign_permission_from_role(
        &self,
        permission_id: PermissionId,
        role_id: RoleId,
    ) -> AppResult<RoleDetails> {
        let context = format!("permission {permission_id}, role {role_id}");
        let result: AppResult<RoleDetails> = async {
            let mut transaction = self.store.begin().await?;
            require_permission(transaction.as_mut(), permission_id).await?;
            let role = require_role(transaction.as_mut(), role_id).await?;

            transaction
                .unlink_role_permission(role_id, permission_id)
                .await?;
            finish_with_role(transaction, role).await
        }
        .await;

        let details = sync_failure("unassign permission from role", &context, result)?;
        info!(%permission_id, %role_id, "permission unassigned from role");
        Ok(details)
    }

    /// Replaces a role's permission set, then propagates the new set to
    /// every holder.
    pub async fn sync_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<RoleDetails> {
        let context = format!("role {role_id}");
        let result: AppResult<(RoleDetails, u64)> = async {
            let mut transaction = self.store.begin().await?;
            let role = require_role(transaction.as_mut(), role_id).await?;
            let wanted = require_permissions(transaction.as_mut(), permission_ids).await?;

            transaction.clear_role_permissions(role_id).await?;
            transaction.link_role_permissions(role_id, &wanted).await?;
            let propagated = propagate(transaction.as_mut(), role_id, &wanted).await?;
            finish_with_role(transaction, role).await.map(|details| (details, propagated))
        }
        .await;

        let (details, propagated) = sync_failure("sync role permissions", &context, result)?;
        info!(%role_id, propagated, "role permissions replaced");
        Ok(details)
    }

    /// Grants `permission_ids` to every user holding the role. Additive only.
    pub async fn propagate_role_permissions(
        &self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let context = format!("role {role_id}");
        let result: AppResult<u64> = async {
            let mut transaction = self.store.begin().await?;
            require_role(transaction.as_mut(), role_id).await?;
            let wanted = require_permissions(transaction.as_mut(), permission_ids).await?;
            let propagated = propagate(transaction.as_mut(), role_id, &wanted).await?;
            transaction.commit().await?;
            Ok(propagated)
        }
        .await;

        let propagated = sync_failure("propagate role permissions", &context, result)?;
        info!(%role_id, propagated, "role permissions propagated");
        Ok(propagated)
    }
}

/// Inserts the role's permissions the user lacks, then the role link.
async fn grant_role(
    transaction: &mut dyn IdentityTransaction,
    role_id: RoleId,
    user_id: UserId,
) -> AppResult<u64> {
    let held: BTreeSet<PermissionId> =
        permission_ids(&transaction.permissions_of_user(user_id).await?)
            .into_iter()
            .collect();
    let missing: Vec<PermissionId> = permission_ids(&transaction.permissions_of_role(role_id).await?)
        .into_iter()
        .filter(|permission_id| !held.contains(permission_id))
        .collect();

    let granted = transaction
        .link_user_permissions(user_id, &missing)
        .await?;
    transaction.link_user_role(user_id, role_id).await?;
    Ok(granted)
}

/// Permissions to strip from a user who just lost `role_id`.
async fn revocable_permissions(
    transaction: &mut dyn IdentityTransaction,
    role_id: RoleId,
    user_id: UserId,
    revocation: RoleRevocation,
) -> AppResult<Vec<PermissionId>> {
    let conferred = permission_ids(&transaction.permissions_of_role(role_id).await?);
    if revocation == RoleRevocation::Cascade {
        return Ok(conferred);
    }

    let mut retained = BTreeSet::new();
    for role in transaction.roles_of_user(user_id).await? {
        retained.extend(permission_ids(
            &transaction.permissions_of_role(role.id()).await?,
        ));
    }

    Ok(conferred
        .into_iter()
        .filter(|permission_id| !retained.contains(permission_id))
        .collect())
}

async fn propagate(
    transaction: &mut dyn IdentityTransaction,
    role_id: RoleId,
    permission_ids: &[PermissionId],
) -> AppResult<u64> {
    let holders = transaction.users_with_role(role_id).await?;
    if holders.is_empty() || permission_ids.is_empty() {
        return Ok(0);
    }

    transaction
        .link_permissions_to_users(&holders, permission_ids)
        .await
}

async fn finish_with_user(
    mut transaction: Box<dyn IdentityTransaction>,
    user_id: UserId,
) -> AppResult<UserDetails> {
    let details = user_details(transaction.as_mut(), user_id).await?;
    transaction.commit().await?;
    Ok(details)
}

async fn finish_with_role(
    mut transaction: Box<dyn IdentityTransaction>,
    role: Role,
) -> AppResult<RoleDetails> {
    let details = role_details(transaction.as_mut(), role).await?;
    transaction.commit().await?;
    Ok(details)
}

/// Passes caller errors through and wraps storage failures as `Sync`.
fn sync_failure<T>(operation: &str, context: &str, result: AppResult<T>) -> AppResult<T> {
    result.map_err(|failure| {
        if failure.is_client_error() {
            return failure;
        }

        error!(operation, context, error = %failure, "synchronization failed");
        AppError::Sync(format!("{operation} failed for {context}: {failure}"))
    })
}

#[cfg(test)]
mod tests;
