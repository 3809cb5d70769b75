//! User, role and permission lifecycle.

use std::sync::Arc;

use rolegate_core::{AppError, AppResult, NonEmptyString};
use rolegate_domain::{
    EmailAddress, Permission, PermissionId, PersonName, Role, RoleId, User, UserId,
    validate_password,
};
use tracing::info;

use crate::relationships::{
    permission_details, permission_ids, require_permission, require_role, require_user,
    role_details, user_details,
};
use crate::{
    IdentityStore, NewUserRecord, PermissionDetails, RoleDetails, UserDetails,
};

/// Port for password hashing operations.
pub trait PasswordHasher: Send + Sync {
    /// Hashes a plaintext password.
    fn hash_password(&self, password: &str) -> AppResult<String>;

    /// Verifies a plaintext password against a stored hash.
    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool>;
}

/// Input for creating a user account.
#[derive(Debug, Clone)]
pub struct CreateUserInput {
    /// Email address, normalized on validation.
    pub email: String,
    /// First name.
    pub firstname: String,
    /// Last name.
    pub lastname: String,
    /// Plaintext password.
    pub password: String,
}

/// Partial user update. Absent fields stay unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateUserInput {
    /// New email address.
    pub email: Option<String>,
    /// New first name.
    pub firstname: Option<String>,
    /// New last name.
    pub lastname: Option<String>,
    /// New plaintext password, re-hashed before storage.
    pub password: Option<String>,
}

/// Name and description for a role or permission.
#[derive(Debug, Clone)]
pub struct NamedEntityInput {
    /// Unique name.
    pub name: String,
    /// Optional description.
    pub description: Option<String>,
}

/// Application service owning identity records.
#[derive(Clone)]
pub struct IdentityService {
    store: Arc<dyn IdentityStore>,
    password_hasher: Arc<dyn PasswordHasher>,
    default_role_name: String,
}

impl IdentityService {
    /// Creates a new identity service. New users receive `default_role_name`.
    #[must_use]
    pub fn new(
        store: Arc<dyn IdentityStore>,
        password_hasher: Arc<dyn PasswordHasher>,
        default_role_name: impl Into<String>,
    ) -> Self {
        Self {
            store,
            password_hasher,
            default_role_name: default_role_name.into(),
        }
    }

    /// Returns the role name assigned to every new user.
    #[must_use]
    pub fn default_role_name(&self) -> &str {
        &self.default_role_name
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Creates a user holding the default role and its permissions.
    pub async fn create_user(&self, input: CreateUserInput) -> AppResult<UserDetails> {
        let email = EmailAddress::new(input.email)?;
        let firstname = PersonName::new("firstname", input.firstname)?;
        let lastname = PersonName::new("lastname", input.lastname)?;
        validate_password(&input.password)?;
        let password_hash = self.password_hasher.hash_password(&input.password)?;

        let mut transaction = self.store.begin().await?;
        let default_role = transaction
            .find_role_by_name(&self.default_role_name)
            .await?
            .ok_or_else(|| {
                AppError::Configuration(format!(
                    "default role '{}' does not exist",
                    self.default_role_name
                ))
            })?;

        let user = transaction
            .insert_user(&NewUserRecord {
                email,
                firstname,
                lastname,
                password_hash,
            })
            .await?;

        let inherited = permission_ids(&transaction.permissions_of_role(default_role.id()).await?);
        transaction
            .link_user_permissions(user.id(), &inherited)
            .await?;
        transaction.link_user_role(user.id(), default_role.id()).await?;

        let details = user_details(transaction.as_mut(), user.id()).await?;
        transaction.commit().await?;

        info!(user_id = %user.id(), role = %default_role.name().as_str(), "user created");
        Ok(details)
    }

    /// Returns a user with roles and permissions.
    pub async fn get_user(&self, user_id: UserId) -> AppResult<UserDetails> {
        let mut transaction = self.store.begin().await?;
        user_details(transaction.as_mut(), user_id).await
    }

    /// Returns a user looked up by email.
    pub async fn get_user_by_email(&self, email: &str) -> AppResult<UserDetails> {
        let email = EmailAddress::new(email)?;
        let mut transaction = self.store.begin().await?;
        let stored = transaction
            .find_user_by_email(&email)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("user '{}' does not exist", email.as_str()))
            })?;
        user_details(transaction.as_mut(), stored.user.id()).await
    }

    /// Lists all users.
    pub async fn list_users(&self) -> AppResult<Vec<User>> {
        let mut transaction = self.store.begin().await?;
        transaction.list_users().await
    }

    /// Applies a partial profile update.
    pub async fn update_user(
        &self,
        user_id: UserId,
        input: UpdateUserInput,
    ) -> AppResult<UserDetails> {
        if let Some(password) = input.password.as_deref() {
            validate_password(password)?;
        }

        let mut transaction = self.store.begin().await?;
        let current = require_user(transaction.as_mut(), user_id).await?.user;

        let updated = User::new(
            user_id,
            input
                .email
                .unwrap_or_else(|| current.email().as_str().to_owned()),
            input
                .firstname
                .unwrap_or_else(|| current.firstname().as_str().to_owned()),
            input
                .lastname
                .unwrap_or_else(|| current.lastname().as_str().to_owned()),
        )?;

        if updated != current {
            transaction.update_user(&updated).await?;
        }

        if let Some(password) = input.password.as_deref() {
            let password_hash = self.password_hasher.hash_password(password)?;
            transaction
                .set_password_hash(user_id, &password_hash)
                .await?;
        }

        let details = user_details(transaction.as_mut(), user_id).await?;
        transaction.commit().await?;

        info!(user_id = %user_id, "user updated");
        Ok(details)
    }

    /// Deletes a user together with its assignments.
    pub async fn delete_user(&self, user_id: UserId) -> AppResult<()> {
        let mut transaction = self.store.begin().await?;
        if !transaction.delete_user(user_id).await? {
            return Err(AppError::NotFound(format!(
                "user '{user_id}' does not exist"
            )));
        }
        transaction.commit().await?;

        info!(user_id = %user_id, "user deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Roles
    // -----------------------------------------------------------------------

    /// Creates a role with a unique name.
    pub async fn create_role(&self, input: NamedEntityInput) -> AppResult<Role> {
        let name = NonEmptyString::for_field("role name", input.name)?;
        let mut transaction = self.store.begin().await?;
        let role = transaction
            .insert_role(name.as_str(), trimmed(input.description.as_deref()))
            .await?;
        transaction.commit().await?;

        info!(role_id = %role.id(), name = %role.name().as_str(), "role created");
        Ok(role)
    }

    /// Returns the role called `name`, creating it first when absent.
    pub async fn ensure_role(&self, name: &str, description: Option<&str>) -> AppResult<Role> {
        let name = NonEmptyString::for_field("role name", name)?;
        let mut transaction = self.store.begin().await?;
        if let Some(role) = transaction.find_role_by_name(name.as_str()).await? {
            return Ok(role);
        }

        let role = transaction
            .insert_role(name.as_str(), trimmed(description))
            .await?;
        transaction.commit().await?;

        info!(role_id = %role.id(), name = %role.name().as_str(), "role seeded");
        Ok(role)
    }

    /// Returns a role with its permissions and holders.
    pub async fn get_role(&self, role_id: RoleId) -> AppResult<RoleDetails> {
        let mut transaction = self.store.begin().await?;
        let role = require_role(transaction.as_mut(), role_id).await?;
        role_details(transaction.as_mut(), role).await
    }

    /// Returns a role looked up by name.
    pub async fn get_role_by_name(&self, name: &str) -> AppResult<RoleDetails> {
        let mut transaction = self.store.begin().await?;
        let role = transaction
            .find_role_by_name(name.trim())
            .await?
            .ok_or_else(|| AppError::NotFound(format!("role '{}' does not exist", name.trim())))?;
        role_details(transaction.as_mut(), role).await
    }

    /// Lists all roles.
    pub async fn list_roles(&self) -> AppResult<Vec<Role>> {
        let mut transaction = self.store.begin().await?;
        transaction.list_roles().await
    }

    /// Renames or redescribes a role.
    pub async fn update_role(
        &self,
        role_id: RoleId,
        input: NamedEntityInput,
    ) -> AppResult<RoleDetails> {
        let updated = Role::new(role_id, input.name, input.description)?;
        let mut transaction = self.store.begin().await?;
        require_role(transaction.as_mut(), role_id).await?;
        transaction.update_role(&updated).await?;
        let details = role_details(transaction.as_mut(), updated).await?;
        transaction.commit().await?;

        info!(role_id = %role_id, "role updated");
        Ok(details)
    }

    /// Strips a role from every link table, then deletes it. The default
    /// role cannot be deleted.
    pub async fn delete_role(&self, role_id: RoleId) -> AppResult<()> {
        let mut transaction = self.store.begin().await?;
        let role = require_role(transaction.as_mut(), role_id).await?;
        if role.name().as_str() == self.default_role_name {
            return Err(AppError::Conflict(format!(
                "role '{}' is the default role and cannot be deleted",
                self.default_role_name
            )));
        }

        let holders = transaction.unlink_role_from_all_users(role_id).await?;
        let links = transaction.clear_role_permissions(role_id).await?;
        transaction.delete_role(role_id).await?;
        transaction.commit().await?;

        info!(role_id = %role_id, holders, links, "role deleted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Permissions
    // -----------------------------------------------------------------------

    /// Creates a permission with a unique name.
    pub async fn create_permission(&self, input: NamedEntityInput) -> AppResult<Permission> {
        let name = NonEmptyString::for_field("permission name", input.name)?;
        let mut transaction = self.store.begin().await?;
        let permission = transaction
            .insert_permission(name.as_str(), trimmed(input.description.as_deref()))
            .await?;
        transaction.commit().await?;

        info!(
            permission_id = %permission.id(),
            name = %permission.name().as_str(),
            "permission created"
        );
        Ok(permission)
    }

    /// Returns a permission with the roles and users holding it.
    pub async fn get_permission(&self, permission_id: PermissionId) -> AppResult<PermissionDetails> {
        let mut transaction = self.store.begin().await?;
        let permission = require_permission(transaction.as_mut(), permission_id).await?;
        permission_details(transaction.as_mut(), permission).await
    }

    /// Returns a permission looked up by name.
    pub async fn get_permission_by_name(&self, name: &str) -> AppResult<PermissionDetails> {
        let mut transaction = self.store.begin().await?;
        let permission = transaction
            .find_permission_by_name(name.trim())
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("permission '{}' does not exist", name.trim()))
            })?;
        permission_details(transaction.as_mut(), permission).await
    }

    /// Lists all permissions.
    pub async fn list_permissions(&self) -> AppResult<Vec<Permission>> {
        let mut transaction = self.store.begin().await?;
        transaction.list_permissions().await
    }

    /// Renames or redescribes a permission.
    pub async fn update_permission(
        &self,
        permission_id: PermissionId,
        input: NamedEntityInput,
    ) -> AppResult<PermissionDetails> {
        let updated = Permission::new(permission_id, input.name, input.description)?;
        let mut transaction = self.store.begin().await?;
        require_permission(transaction.as_mut(), permission_id).await?;
        transaction.update_permission(&updated).await?;
        let details = permission_details(transaction.as_mut(), updated).await?;
        transaction.commit().await?;

        info!(permission_id = %permission_id, "permission updated");
        Ok(details)
    }

    /// Strips a permission from every role and user, then deletes it.
    pub async fn delete_permission(&self, permission_id: PermissionId) -> AppResult<()> {
        let mut transaction = self.store.begin().await?;
        require_permission(transaction.as_mut(), permission_id).await?;

        let roles = transaction
            .unlink_permission_from_all_roles(permission_id)
            .await?;
        let users = transaction
            .unlink_permission_from_all_users(permission_id)
            .await?;
        transaction.delete_permission(permission_id).await?;
        transaction.commit().await?;

        info!(permission_id = %permission_id, roles, users, "permission deleted");
        Ok(())
    }
}

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}
