//! Persistence ports for users, roles, permissions and their links.

use async_trait::async_trait;

use rolegate_core::AppResult;
use rolegate_domain::{
    EmailAddress, Permission, PermissionId, PersonName, Role, RoleId, User, UserId,
};

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// User row together with its credential state.
#[derive(Debug, Clone)]
pub struct StoredUser {
    /// Validated user entity.
    pub user: User,
    /// Argon2id password hash.
    pub password_hash: String,
    /// Bearer token of the current session, if logged in.
    pub session_token: Option<String>,
}

/// Values for a user row about to be inserted.
#[derive(Debug, Clone)]
pub struct NewUserRecord {
    /// Normalized email address.
    pub email: EmailAddress,
    /// First name.
    pub firstname: PersonName,
    /// Last name.
    pub lastname: PersonName,
    /// Argon2id password hash.
    pub password_hash: String,
}

/// User with its relationship collections populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserDetails {
    /// User entity.
    pub user: User,
    /// Roles held by the user.
    pub roles: Vec<Role>,
    /// Materialized effective permissions of the user.
    pub permissions: Vec<Permission>,
}

/// Role with its relationship collections populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleDetails {
    /// Role entity.
    pub role: Role,
    /// Permissions conferred by the role.
    pub permissions: Vec<Permission>,
    /// Users currently holding the role.
    pub user_ids: Vec<UserId>,
}

/// Permission with its relationship collections populated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionDetails {
    /// Permission entity.
    pub permission: Permission,
    /// Roles conferring the permission.
    pub role_ids: Vec<RoleId>,
    /// Users holding the permission.
    pub user_ids: Vec<UserId>,
}

// ---------------------------------------------------------------------------
// Ports
// ---------------------------------------------------------------------------

/// Factory for identity transactions.
#[async_trait]
pub trait IdentityStore: Send + Sync {
    /// Opens a new transaction. Dropping it without [`IdentityTransaction::commit`]
    /// discards every write made through it.
    async fn begin(&self) -> AppResult<Box<dyn IdentityTransaction>>;
}

/// Unit of work over the identity tables.
///
/// Link inserts are insert-or-ignore on the composite key and report how many
/// rows were actually written.
#[async_trait]
pub trait IdentityTransaction: Send {
    /// Inserts a user. Duplicate email is a conflict.
    async fn insert_user(&mut self, record: &NewUserRecord) -> AppResult<User>;

    /// Finds a user by id.
    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<StoredUser>>;

    /// Finds a user by normalized email.
    async fn find_user_by_email(&mut self, email: &EmailAddress)
    -> AppResult<Option<StoredUser>>;

    /// Lists all users ordered by id.
    async fn list_users(&mut self) -> AppResult<Vec<User>>;

    /// Overwrites profile fields of an existing user. Duplicate email is a conflict.
    async fn update_user(&mut self, user: &User) -> AppResult<()>;

    /// Replaces the stored password hash.
    async fn set_password_hash(&mut self, user_id: UserId, password_hash: &str) -> AppResult<()>;

    /// Replaces or clears the current session token.
    async fn set_session_token(
        &mut self,
        user_id: UserId,
        session_token: Option<&str>,
    ) -> AppResult<()>;

    /// Deletes a user and every link row referencing it.
    async fn delete_user(&mut self, user_id: UserId) -> AppResult<bool>;

    /// Inserts a role. Duplicate name is a conflict.
    async fn insert_role(&mut self, name: &str, description: Option<&str>) -> AppResult<Role>;

    /// Finds a role by id.
    async fn find_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>>;

    /// Finds a role by exact name.
    async fn find_role_by_name(&mut self, name: &str) -> AppResult<Option<Role>>;

    /// Lists all roles ordered by id.
    async fn list_roles(&mut self) -> AppResult<Vec<Role>>;

    /// Overwrites name and description. Duplicate name is a conflict.
    async fn update_role(&mut self, role: &Role) -> AppResult<()>;

    /// Deletes a role row. Links must be stripped beforehand.
    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<bool>;

    /// Resolves role names to ids, skipping unknown names.
    async fn role_ids_by_names(&mut self, names: &[String]) -> AppResult<Vec<RoleId>>;

    /// Inserts a permission. Duplicate name is a conflict.
    async fn insert_permission(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission>;

    /// Finds a permission by id.
    async fn find_permission(&mut self, permission_id: PermissionId)
    -> AppResult<Option<Permission>>;

    /// Finds a permission by exact name.
    async fn find_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>>;

    /// Lists all permissions ordered by id.
    async fn list_permissions(&mut self) -> AppResult<Vec<Permission>>;

    /// Returns the permissions among `permission_ids` that exist.
    async fn permissions_by_ids(
        &mut self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>>;

    /// Overwrites name and description. Duplicate name is a conflict.
    async fn update_permission(&mut self, permission: &Permission) -> AppResult<()>;

    /// Deletes a permission row. Links must be stripped beforehand.
    async fn delete_permission(&mut self, permission_id: PermissionId) -> AppResult<bool>;

    /// Resolves permission names to ids, skipping unknown names.
    async fn permission_ids_by_names(&mut self, names: &[String])
    -> AppResult<Vec<PermissionId>>;

    /// Lists roles held by a user.
    async fn roles_of_user(&mut self, user_id: UserId) -> AppResult<Vec<Role>>;

    /// Lists users holding a role.
    async fn users_with_role(&mut self, role_id: RoleId) -> AppResult<Vec<UserId>>;

    /// Links a user to a role. Returns whether a row was written.
    async fn link_user_role(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Unlinks a user from a role. Returns whether a row was removed.
    async fn unlink_user_role(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool>;

    /// Removes a role from every user holding it.
    async fn unlink_role_from_all_users(&mut self, role_id: RoleId) -> AppResult<u64>;

    /// Lists the materialized permissions of a user.
    async fn permissions_of_user(&mut self, user_id: UserId) -> AppResult<Vec<Permission>>;

    /// Lists users holding a permission.
    async fn users_with_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<UserId>>;

    /// Grants permissions to a user.
    async fn link_user_permissions(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>;

    /// Revokes permissions from a user.
    async fn unlink_user_permissions(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>;

    /// Revokes every permission of a user.
    async fn clear_user_permissions(&mut self, user_id: UserId) -> AppResult<u64>;

    /// Revokes a permission from every user holding it.
    async fn unlink_permission_from_all_users(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64>;

    /// Lists the permissions conferred by a role.
    async fn permissions_of_role(&mut self, role_id: RoleId) -> AppResult<Vec<Permission>>;

    /// Lists roles conferring a permission.
    async fn roles_with_permission(&mut self, permission_id: PermissionId)
    -> AppResult<Vec<RoleId>>;

    /// Links permissions to a role.
    async fn link_role_permissions(
        &mut self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>;

    /// Unlinks one permission from a role. Returns whether a row was removed.
    async fn unlink_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool>;

    /// Unlinks every permission from a role.
    async fn clear_role_permissions(&mut self, role_id: RoleId) -> AppResult<u64>;

    /// Unlinks a permission from every role conferring it.
    async fn unlink_permission_from_all_roles(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64>;

    /// Grants every permission in `permission_ids` to every user in `user_ids`
    /// in one batch.
    async fn link_permissions_to_users(
        &mut self,
        user_ids: &[UserId],
        permission_ids: &[PermissionId],
    ) -> AppResult<u64>;

    /// Makes every write of this transaction durable.
    async fn commit(self: Box<Self>) -> AppResult<()>;
}
