use rolegate_application::{PermissionDetails, RoleDetails, UserDetails};
use rolegate_domain::{Permission, Role, User};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Incoming payload for administrative user creation.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/create-user-request.ts"
)]
pub struct CreateUserRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
}

/// Incoming payload for partial user updates.
#[derive(Debug, Default, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/update-user-request.ts"
)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    pub password: Option<String>,
}

/// Incoming payload for role and permission create or update.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/named-entity-request.ts"
)]
pub struct NamedEntityRequest {
    pub name: String,
    pub description: Option<String>,
}

/// Incoming payload replacing a permission set.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/sync-permissions-request.ts"
)]
pub struct SyncPermissionsRequest {
    #[ts(type = "Array<number>")]
    pub permission_ids: Vec<i64>,
}

/// API representation of a role without its relationships.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-summary-response.ts"
)]
pub struct RoleSummaryResponse {
    #[ts(type = "number")]
    pub role_id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Role> for RoleSummaryResponse {
    fn from(value: Role) -> Self {
        Self {
            role_id: value.id().as_i64(),
            name: value.name().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
        }
    }
}

/// API representation of a permission without its relationships.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-summary-response.ts"
)]
pub struct PermissionSummaryResponse {
    #[ts(type = "number")]
    pub permission_id: i64,
    pub name: String,
    pub description: Option<String>,
}

impl From<Permission> for PermissionSummaryResponse {
    fn from(value: Permission) -> Self {
        Self {
            permission_id: value.id().as_i64(),
            name: value.name().as_str().to_owned(),
            description: value.description().map(ToOwned::to_owned),
        }
    }
}

/// API representation of a user in listings.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-summary-response.ts"
)]
pub struct UserSummaryResponse {
    #[ts(type = "number")]
    pub user_id: i64,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
}

impl From<User> for UserSummaryResponse {
    fn from(value: User) -> Self {
        Self {
            user_id: value.id().as_i64(),
            email: value.email().as_str().to_owned(),
            firstname: value.firstname().as_str().to_owned(),
            lastname: value.lastname().as_str().to_owned(),
        }
    }
}

/// API representation of a user with roles and effective permissions.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-response.ts"
)]
pub struct UserResponse {
    #[ts(type = "number")]
    pub user_id: i64,
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub roles: Vec<RoleSummaryResponse>,
    pub permissions: Vec<PermissionSummaryResponse>,
}

impl From<UserDetails> for UserResponse {
    fn from(value: UserDetails) -> Self {
        let UserSummaryResponse {
            user_id,
            email,
            firstname,
            lastname,
        } = UserSummaryResponse::from(value.user);

        Self {
            user_id,
            email,
            firstname,
            lastname,
            roles: value
                .roles
                .into_iter()
                .map(RoleSummaryResponse::from)
                .collect(),
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionSummaryResponse::from)
                .collect(),
        }
    }
}

/// API representation of a role with its permissions and holders.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/role-response.ts"
)]
pub struct RoleResponse {
    #[ts(type = "number")]
    pub role_id: i64,
    pub name: String,
    pub description: Option<String>,
    pub permissions: Vec<PermissionSummaryResponse>,
    #[ts(type = "Array<number>")]
    pub user_ids: Vec<i64>,
}

impl From<RoleDetails> for RoleResponse {
    fn from(value: RoleDetails) -> Self {
        let summary = RoleSummaryResponse::from(value.role);
        Self {
            role_id: summary.role_id,
            name: summary.name,
            description: summary.description,
            permissions: value
                .permissions
                .into_iter()
                .map(PermissionSummaryResponse::from)
                .collect(),
            user_ids: value.user_ids.iter().map(|id| id.as_i64()).collect(),
        }
    }
}

/// API representation of a permission with the roles and users holding it.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/permission-response.ts"
)]
pub struct PermissionResponse {
    #[ts(type = "number")]
    pub permission_id: i64,
    pub name: String,
    pub description: Option<String>,
    #[ts(type = "Array<number>")]
    pub role_ids: Vec<i64>,
    #[ts(type = "Array<number>")]
    pub user_ids: Vec<i64>,
}

impl From<PermissionDetails> for PermissionResponse {
    fn from(value: PermissionDetails) -> Self {
        let summary = PermissionSummaryResponse::from(value.permission);
        Self {
            permission_id: summary.permission_id,
            name: summary.name,
            description: summary.description,
            role_ids: value.role_ids.iter().map(|id| id.as_i64()).collect(),
            user_ids: value.user_ids.iter().map(|id| id.as_i64()).collect(),
        }
    }
}
