//! PostgreSQL-backed identity store.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};

use rolegate_application::{IdentityStore, IdentityTransaction, NewUserRecord, StoredUser};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EmailAddress, Permission, PermissionId, Role, RoleId, User, UserId};

mod links;
mod permissions;
mod roles;
mod users;

#[cfg(test)]
mod tests;

/// PostgreSQL implementation of the identity store port.
#[derive(Clone)]
pub struct PostgresIdentityStore {
    pool: PgPool,
}

impl PostgresIdentityStore {
    /// Creates a store with the provided connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for PostgresIdentityStore {
    async fn begin(&self) -> AppResult<Box<dyn IdentityTransaction>> {
        let transaction = self
            .pool
            .begin()
            .await
            .map_err(|error| storage_error(error, "begin transaction"))?;

        Ok(Box::new(PostgresIdentityTransaction { transaction }))
    }
}

/// One database transaction over the identity tables.
pub struct PostgresIdentityTransaction {
    transaction: Transaction<'static, Postgres>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    firstname: String,
    lastname: String,
    password_hash: String,
    session_token: Option<String>,
}

impl UserRow {
    fn into_stored(self) -> AppResult<StoredUser> {
        Ok(StoredUser {
            user: User::new(UserId::new(self.id), self.email, self.firstname, self.lastname)?,
            password_hash: self.password_hash,
            session_token: self.session_token,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct NamedRow {
    id: i64,
    name: String,
    description: Option<String>,
}

impl NamedRow {
    fn into_role(self) -> AppResult<Role> {
        Role::new(RoleId::new(self.id), self.name, self.description)
    }

    fn into_permission(self) -> AppResult<Permission> {
        Permission::new(PermissionId::new(self.id), self.name, self.description)
    }
}

fn storage_error(error: sqlx::Error, operation: &str) -> AppError {
    AppError::Persistence(format!("failed to {operation}: {error}"))
}

fn conflict_or_storage(error: sqlx::Error, conflict: String, operation: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.code().as_deref() == Some("23505")
    {
        return AppError::Conflict(conflict);
    }

    storage_error(error, operation)
}

fn raw_ids<T>(ids: &[T], as_i64: fn(&T) -> i64) -> Vec<i64> {
    ids.iter().map(as_i64).collect()
}

#[async_trait]
impl IdentityTransaction for PostgresIdentityTransaction {
    async fn insert_user(&mut self, record: &NewUserRecord) -> AppResult<User> {
        self.insert_user_impl(record).await
    }

    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<StoredUser>> {
        self.find_user_impl(user_id).await
    }

    async fn find_user_by_email(
        &mut self,
        email: &EmailAddress,
    ) -> AppResult<Option<StoredUser>> {
        self.find_user_by_email_impl(email).await
    }

    async fn list_users(&mut self) -> AppResult<Vec<User>> {
        self.list_users_impl().await
    }

    async fn update_user(&mut self, user: &User) -> AppResult<()> {
        self.update_user_impl(user).await
    }

    async fn set_password_hash(&mut self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        self.set_password_hash_impl(user_id, password_hash).await
    }

    async fn set_session_token(
        &mut self,
        user_id: UserId,
        session_token: Option<&str>,
    ) -> AppResult<()> {
        self.set_session_token_impl(user_id, session_token).await
    }

    async fn delete_user(&mut self, user_id: UserId) -> AppResult<bool> {
        self.delete_user_impl(user_id).await
    }

    async fn insert_role(&mut self, name: &str, description: Option<&str>) -> AppResult<Role> {
        self.insert_role_impl(name, description).await
    }

    async fn find_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        self.find_role_impl(role_id).await
    }

    async fn find_role_by_name(&mut self, name: &str) -> AppResult<Option<Role>> {
        self.find_role_by_name_impl(name).await
    }

    async fn list_roles(&mut self) -> AppResult<Vec<Role>> {
        self.list_roles_impl().await
    }

    async fn update_role(&mut self, role: &Role) -> AppResult<()> {
        self.update_role_impl(role).await
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<bool> {
        self.delete_role_impl(role_id).await
    }

    async fn role_ids_by_names(&mut self, names: &[String]) -> AppResult<Vec<RoleId>> {
        self.role_ids_by_names_impl(names).await
    }

    async fn insert_permission(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        self.insert_permission_impl(name, description).await
    }

    async fn find_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        self.find_permission_impl(permission_id).await
    }

    async fn find_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>> {
        self.find_permission_by_name_impl(name).await
    }

    async fn list_permissions(&mut self) -> AppResult<Vec<Permission>> {
        self.list_permissions_impl().await
    }

    async fn permissions_by_ids(
        &mut self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        self.permissions_by_ids_impl(permission_ids).await
    }

    async fn update_permission(&mut self, permission: &Permission) -> AppResult<()> {
        self.update_permission_impl(permission).await
    }

    async fn delete_permission(&mut self, permission_id: PermissionId) -> AppResult<bool> {
        self.delete_permission_impl(permission_id).await
    }

    async fn permission_ids_by_names(
        &mut self,
        names: &[String],
    ) -> AppResult<Vec<PermissionId>> {
        self.permission_ids_by_names_impl(names).await
    }

    async fn roles_of_user(&mut self, user_id: UserId) -> AppResult<Vec<Role>> {
        self.roles_of_user_impl(user_id).await
    }

    async fn users_with_role(&mut self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        self.users_with_role_impl(role_id).await
    }

    async fn link_user_role(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        self.link_user_role_impl(user_id, role_id).await
    }

    async fn unlink_user_role(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        self.unlink_user_role_impl(user_id, role_id).await
    }

    async fn unlink_role_from_all_users(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.unlink_role_from_all_users_impl(role_id).await
    }

    async fn permissions_of_user(&mut self, user_id: UserId) -> AppResult<Vec<Permission>> {
        self.permissions_of_user_impl(user_id).await
    }

    async fn users_with_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<UserId>> {
        self.users_with_permission_impl(permission_id).await
    }

    async fn link_user_permissions(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        self.link_user_permissions_impl(user_id, permission_ids)
            .await
    }

    async fn unlink_user_permissions(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        self.unlink_user_permissions_impl(user_id, permission_ids)
            .await
    }

    async fn clear_user_permissions(&mut self, user_id: UserId) -> AppResult<u64> {
        self.clear_user_permissions_impl(user_id).await
    }

    async fn unlink_permission_from_all_users(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        self.unlink_permission_from_all_users_impl(permission_id)
            .await
    }

    async fn permissions_of_role(&mut self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        self.permissions_of_role_impl(role_id).await
    }

    async fn roles_with_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>> {
        self.roles_with_permission_impl(permission_id).await
    }

    async fn link_role_permissions(
        &mut self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        self.link_role_permissions_impl(role_id, permission_ids)
            .await
    }

    async fn unlink_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        self.unlink_role_permission_impl(role_id, permission_id)
            .await
    }

    async fn clear_role_permissions(&mut self, role_id: RoleId) -> AppResult<u64> {
        self.clear_role_permissions_impl(role_id).await
    }

    async fn unlink_permission_from_all_roles(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        self.unlink_permission_from_all_roles_impl(permission_id)
            .await
    }

    async fn link_permissions_to_users(
        &mut self,
        user_ids: &[UserId],
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        self.link_permissions_to_users_impl(user_ids, permission_ids)
            .await
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        self.transaction
            .commit()
            .await
            .map_err(|error| storage_error(error, "commit transaction"))
    }
}
