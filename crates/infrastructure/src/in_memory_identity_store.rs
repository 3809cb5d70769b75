use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use rolegate_application::{IdentityStore, IdentityTransaction, NewUserRecord, StoredUser};
use rolegate_core::{AppError, AppResult};
use rolegate_domain::{EmailAddress, Permission, PermissionId, Role, RoleId, User, UserId};
use tokio::sync::{Mutex, OwnedMutexGuard};

/// In-memory identity store.
///
/// Transactions are serialized: each holds the store lock, mutates a working
/// copy, and publishes it on commit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryIdentityStore {
    state: Arc<Mutex<IdentityState>>,
}

impl InMemoryIdentityStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
struct IdentityState {
    last_user_id: i64,
    last_role_id: i64,
    last_permission_id: i64,
    users: BTreeMap<UserId, StoredUser>,
    roles: BTreeMap<RoleId, Role>,
    permissions: BTreeMap<PermissionId, Permission>,
    user_roles: BTreeSet<(UserId, RoleId)>,
    user_permissions: BTreeSet<(UserId, PermissionId)>,
    role_permissions: BTreeSet<(RoleId, PermissionId)>,
}

impl IdentityState {
    fn ensure_user(&self, user_id: UserId) -> AppResult<()> {
        if self.users.contains_key(&user_id) {
            return Ok(());
        }
        Err(missing_reference("user", user_id))
    }

    fn ensure_role(&self, role_id: RoleId) -> AppResult<()> {
        if self.roles.contains_key(&role_id) {
            return Ok(());
        }
        Err(missing_reference("role", role_id))
    }

    fn ensure_permissions(&self, permission_ids: &[PermissionId]) -> AppResult<()> {
        match permission_ids
            .iter()
            .find(|permission_id| !self.permissions.contains_key(permission_id))
        {
            Some(permission_id) => Err(missing_reference("permission", permission_id)),
            None => Ok(()),
        }
    }

    fn email_taken(&self, email: &EmailAddress, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|stored| stored.user.email() == email && Some(stored.user.id()) != except)
    }
}

fn missing_reference(entity: &str, id: impl std::fmt::Display) -> AppError {
    AppError::Persistence(format!("foreign key violation: {entity} '{id}' does not exist"))
}

fn still_referenced(entity: &str, id: impl std::fmt::Display) -> AppError {
    AppError::Persistence(format!("foreign key violation: {entity} '{id}' is still referenced"))
}

fn count(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}

#[async_trait]
impl IdentityStore for InMemoryIdentityStore {
    async fn begin(&self) -> AppResult<Box<dyn IdentityTransaction>> {
        let guard = self.state.clone().lock_owned().await;
        let working = guard.clone();
        Ok(Box::new(InMemoryIdentityTransaction { guard, working }))
    }
}

struct InMemoryIdentityTransaction {
    guard: OwnedMutexGuard<IdentityState>,
    working: IdentityState,
}

#[async_trait]
impl IdentityTransaction for InMemoryIdentityTransaction {
    async fn insert_user(&mut self, record: &NewUserRecord) -> AppResult<User> {
        if self.working.email_taken(&record.email, None) {
            return Err(AppError::Conflict(format!(
                "an account with email '{}' already exists",
                record.email.as_str()
            )));
        }

        self.working.last_user_id += 1;
        let user = User::new(
            UserId::new(self.working.last_user_id),
            record.email.as_str(),
            record.firstname.as_str(),
            record.lastname.as_str(),
        )?;
        self.working.users.insert(
            user.id(),
            StoredUser {
                user: user.clone(),
                password_hash: record.password_hash.clone(),
                session_token: None,
            },
        );
        Ok(user)
    }

    async fn find_user(&mut self, user_id: UserId) -> AppResult<Option<StoredUser>> {
        Ok(self.working.users.get(&user_id).cloned())
    }

    async fn find_user_by_email(
        &mut self,
        email: &EmailAddress,
    ) -> AppResult<Option<StoredUser>> {
        Ok(self
            .working
            .users
            .values()
            .find(|stored| stored.user.email() == email)
            .cloned())
    }

    async fn list_users(&mut self) -> AppResult<Vec<User>> {
        Ok(self
            .working
            .users
            .values()
            .map(|stored| stored.user.clone())
            .collect())
    }

    async fn update_user(&mut self, user: &User) -> AppResult<()> {
        if self.working.email_taken(user.email(), Some(user.id())) {
            return Err(AppError::Conflict(format!(
                "an account with email '{}' already exists",
                user.email().as_str()
            )));
        }

        if let Some(stored) = self.working.users.get_mut(&user.id()) {
            stored.user = user.clone();
        }
        Ok(())
    }

    async fn set_password_hash(&mut self, user_id: UserId, password_hash: &str) -> AppResult<()> {
        if let Some(stored) = self.working.users.get_mut(&user_id) {
            stored.password_hash = password_hash.to_owned();
        }
        Ok(())
    }

    async fn set_session_token(
        &mut self,
        user_id: UserId,
        session_token: Option<&str>,
    ) -> AppResult<()> {
        if let Some(stored) = self.working.users.get_mut(&user_id) {
            stored.session_token = session_token.map(str::to_owned);
        }
        Ok(())
    }

    async fn delete_user(&mut self, user_id: UserId) -> AppResult<bool> {
        let removed = self.working.users.remove(&user_id).is_some();
        self.working
            .user_roles
            .retain(|(holder, _)| *holder != user_id);
        self.working
            .user_permissions
            .retain(|(holder, _)| *holder != user_id);
        Ok(removed)
    }

    async fn insert_role(&mut self, name: &str, description: Option<&str>) -> AppResult<Role> {
        if self
            .working
            .roles
            .values()
            .any(|role| role.name().as_str() == name)
        {
            return Err(AppError::Conflict(format!("role '{name}' already exists")));
        }

        self.working.last_role_id += 1;
        let role = Role::new(
            RoleId::new(self.working.last_role_id),
            name,
            description.map(str::to_owned),
        )?;
        self.working.roles.insert(role.id(), role.clone());
        Ok(role)
    }

    async fn find_role(&mut self, role_id: RoleId) -> AppResult<Option<Role>> {
        Ok(self.working.roles.get(&role_id).cloned())
    }

    async fn find_role_by_name(&mut self, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .working
            .roles
            .values()
            .find(|role| role.name().as_str() == name)
            .cloned())
    }

    async fn list_roles(&mut self) -> AppResult<Vec<Role>> {
        Ok(self.working.roles.values().cloned().collect())
    }

    async fn update_role(&mut self, role: &Role) -> AppResult<()> {
        if self
            .working
            .roles
            .values()
            .any(|other| other.id() != role.id() && other.name() == role.name())
        {
            return Err(AppError::Conflict(format!(
                "role '{}' already exists",
                role.name().as_str()
            )));
        }

        if let Some(stored) = self.working.roles.get_mut(&role.id()) {
            *stored = role.clone();
        }
        Ok(())
    }

    async fn delete_role(&mut self, role_id: RoleId) -> AppResult<bool> {
        let referenced = self
            .working
            .user_roles
            .iter()
            .any(|(_, held)| *held == role_id)
            || self
                .working
                .role_permissions
                .iter()
                .any(|(owner, _)| *owner == role_id);
        if referenced {
            return Err(still_referenced("role", role_id));
        }

        Ok(self.working.roles.remove(&role_id).is_some())
    }

    async fn role_ids_by_names(&mut self, names: &[String]) -> AppResult<Vec<RoleId>> {
        Ok(self
            .working
            .roles
            .values()
            .filter(|role| names.iter().any(|name| name == role.name().as_str()))
            .map(Role::id)
            .collect())
    }

    async fn insert_permission(
        &mut self,
        name: &str,
        description: Option<&str>,
    ) -> AppResult<Permission> {
        if self
            .working
            .permissions
            .values()
            .any(|permission| permission.name().as_str() == name)
        {
            return Err(AppError::Conflict(format!(
                "permission '{name}' already exists"
            )));
        }

        self.working.last_permission_id += 1;
        let permission = Permission::new(
            PermissionId::new(self.working.last_permission_id),
            name,
            description.map(str::to_owned),
        )?;
        self.working
            .permissions
            .insert(permission.id(), permission.clone());
        Ok(permission)
    }

    async fn find_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Option<Permission>> {
        Ok(self.working.permissions.get(&permission_id).cloned())
    }

    async fn find_permission_by_name(&mut self, name: &str) -> AppResult<Option<Permission>> {
        Ok(self
            .working
            .permissions
            .values()
            .find(|permission| permission.name().as_str() == name)
            .cloned())
    }

    async fn list_permissions(&mut self) -> AppResult<Vec<Permission>> {
        Ok(self.working.permissions.values().cloned().collect())
    }

    async fn permissions_by_ids(
        &mut self,
        permission_ids: &[PermissionId],
    ) -> AppResult<Vec<Permission>> {
        Ok(self
            .working
            .permissions
            .values()
            .filter(|permission| permission_ids.contains(&permission.id()))
            .cloned()
            .collect())
    }

    async fn update_permission(&mut self, permission: &Permission) -> AppResult<()> {
        if self
            .working
            .permissions
            .values()
            .any(|other| other.id() != permission.id() && other.name() == permission.name())
        {
            return Err(AppError::Conflict(format!(
                "permission '{}' already exists",
                permission.name().as_str()
            )));
        }

        if let Some(stored) = self.working.permissions.get_mut(&permission.id()) {
            *stored = permission.clone();
        }
        Ok(())
    }

    async fn delete_permission(&mut self, permission_id: PermissionId) -> AppResult<bool> {
        let referenced = self
            .working
            .user_permissions
            .iter()
            .any(|(_, held)| *held == permission_id)
            || self
                .working
                .role_permissions
                .iter()
                .any(|(_, conferred)| *conferred == permission_id);
        if referenced {
            return Err(still_referenced("permission", permission_id));
        }

        Ok(self.working.permissions.remove(&permission_id).is_some())
    }

    async fn permission_ids_by_names(
        &mut self,
        names: &[String],
    ) -> AppResult<Vec<PermissionId>> {
        Ok(self
            .working
            .permissions
            .values()
            .filter(|permission| names.iter().any(|name| name == permission.name().as_str()))
            .map(Permission::id)
            .collect())
    }

    async fn roles_of_user(&mut self, user_id: UserId) -> AppResult<Vec<Role>> {
        Ok(self
            .working
            .user_roles
            .iter()
            .filter(|(holder, _)| *holder == user_id)
            .filter_map(|(_, role_id)| self.working.roles.get(role_id).cloned())
            .collect())
    }

    async fn users_with_role(&mut self, role_id: RoleId) -> AppResult<Vec<UserId>> {
        Ok(self
            .working
            .user_roles
            .iter()
            .filter(|(_, held)| *held == role_id)
            .map(|(user_id, _)| *user_id)
            .collect())
    }

    async fn link_user_role(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        self.working.ensure_user(user_id)?;
        self.working.ensure_role(role_id)?;
        Ok(self.working.user_roles.insert((user_id, role_id)))
    }

    async fn unlink_user_role(&mut self, user_id: UserId, role_id: RoleId) -> AppResult<bool> {
        Ok(self.working.user_roles.remove(&(user_id, role_id)))
    }

    async fn unlink_role_from_all_users(&mut self, role_id: RoleId) -> AppResult<u64> {
        let before = self.working.user_roles.len();
        self.working.user_roles.retain(|(_, held)| *held != role_id);
        Ok(count(before - self.working.user_roles.len()))
    }

    async fn permissions_of_user(&mut self, user_id: UserId) -> AppResult<Vec<Permission>> {
        Ok(self
            .working
            .user_permissions
            .iter()
            .filter(|(holder, _)| *holder == user_id)
            .filter_map(|(_, permission_id)| self.working.permissions.get(permission_id).cloned())
            .collect())
    }

    async fn users_with_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<UserId>> {
        Ok(self
            .working
            .user_permissions
            .iter()
            .filter(|(_, held)| *held == permission_id)
            .map(|(user_id, _)| *user_id)
            .collect())
    }

    async fn link_user_permissions(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        if permission_ids.is_empty() {
            return Ok(0);
        }
        self.working.ensure_user(user_id)?;
        self.working.ensure_permissions(permission_ids)?;

        let inserted = permission_ids
            .iter()
            .filter(|permission_id| {
                self.working
                    .user_permissions
                    .insert((user_id, **permission_id))
            })
            .count();
        Ok(count(inserted))
    }

    async fn unlink_user_permissions(
        &mut self,
        user_id: UserId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let removed = permission_ids
            .iter()
            .filter(|permission_id| {
                self.working
                    .user_permissions
                    .remove(&(user_id, **permission_id))
            })
            .count();
        Ok(count(removed))
    }

    async fn clear_user_permissions(&mut self, user_id: UserId) -> AppResult<u64> {
        let before = self.working.user_permissions.len();
        self.working
            .user_permissions
            .retain(|(holder, _)| *holder != user_id);
        Ok(count(before - self.working.user_permissions.len()))
    }

    async fn unlink_permission_from_all_users(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        let before = self.working.user_permissions.len();
        self.working
            .user_permissions
            .retain(|(_, held)| *held != permission_id);
        Ok(count(before - self.working.user_permissions.len()))
    }

    async fn permissions_of_role(&mut self, role_id: RoleId) -> AppResult<Vec<Permission>> {
        Ok(self
            .working
            .role_permissions
            .iter()
            .filter(|(owner, _)| *owner == role_id)
            .filter_map(|(_, permission_id)| self.working.permissions.get(permission_id).cloned())
            .collect())
    }

    async fn roles_with_permission(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<Vec<RoleId>> {
        Ok(self
            .working
            .role_permissions
            .iter()
            .filter(|(_, conferred)| *conferred == permission_id)
            .map(|(role_id, _)| *role_id)
            .collect())
    }

    async fn link_role_permissions(
        &mut self,
        role_id: RoleId,
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        if permission_ids.is_empty() {
            return Ok(0);
        }
        self.working.ensure_role(role_id)?;
        self.working.ensure_permissions(permission_ids)?;

        let inserted = permission_ids
            .iter()
            .filter(|permission_id| {
                self.working
                    .role_permissions
                    .insert((role_id, **permission_id))
            })
            .count();
        Ok(count(inserted))
    }

    async fn unlink_role_permission(
        &mut self,
        role_id: RoleId,
        permission_id: PermissionId,
    ) -> AppResult<bool> {
        Ok(self
            .working
            .role_permissions
            .remove(&(role_id, permission_id)))
    }

    async fn clear_role_permissions(&mut self, role_id: RoleId) -> AppResult<u64> {
        let before = self.working.role_permissions.len();
        self.working
            .role_permissions
            .retain(|(owner, _)| *owner != role_id);
        Ok(count(before - self.working.role_permissions.len()))
    }

    async fn unlink_permission_from_all_roles(
        &mut self,
        permission_id: PermissionId,
    ) -> AppResult<u64> {
        let before = self.working.role_permissions.len();
        self.working
            .role_permissions
            .retain(|(_, conferred)| *conferred != permission_id);
        Ok(count(before - self.working.role_permissions.len()))
    }

    async fn link_permissions_to_users(
        &mut self,
        user_ids: &[UserId],
        permission_ids: &[PermissionId],
    ) -> AppResult<u64> {
        let mut inserted = 0;
        for user_id in user_ids {
            inserted += self.link_user_permissions(*user_id, permission_ids).await?;
        }
        Ok(inserted)
    }

    async fn commit(self: Box<Self>) -> AppResult<()> {
        let Self { mut guard, working } = *self;
        *guard = working;
        Ok(())
    }
}
