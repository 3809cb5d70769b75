use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::{NamedEntityInput, PermissionDetails};
use rolegate_core::Principal;
use rolegate_domain::{PermissionId, RoleId, UserId};

use crate::access_policy::{Operation, authorize};
use crate::dto::{
    NamedEntityRequest, PermissionResponse, PermissionSummaryResponse, RoleResponse,
    SyncPermissionsRequest, UserResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

fn permission_ids(payload: &SyncPermissionsRequest) -> Vec<PermissionId> {
    payload
        .permission_ids
        .iter()
        .copied()
        .map(PermissionId::new)
        .collect()
}

pub async fn create_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NamedEntityRequest>,
) -> ApiResult<(StatusCode, Json<PermissionResponse>)> {
    authorize(&state, &principal, Operation::CreatePermission).await?;

    let permission = state
        .identity_service
        .create_permission(NamedEntityInput {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    let details = PermissionDetails {
        permission,
        role_ids: Vec::new(),
        user_ids: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(PermissionResponse::from(details))))
}

pub async fn list_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<PermissionSummaryResponse>>> {
    authorize(&state, &principal, Operation::ListPermissions).await?;

    let permissions = state
        .identity_service
        .list_permissions()
        .await?
        .into_iter()
        .map(PermissionSummaryResponse::from)
        .collect();

    Ok(Json(permissions))
}

pub async fn get_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(permission_id): Path<i64>,
) -> ApiResult<Json<PermissionResponse>> {
    authorize(&state, &principal, Operation::ReadPermission).await?;

    let permission = state
        .identity_service
        .get_permission(PermissionId::new(permission_id))
        .await?;
    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn get_permission_by_name_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(name): Path<String>,
) -> ApiResult<Json<PermissionResponse>> {
    authorize(&state, &principal, Operation::ReadPermission).await?;

    let permission = state.identity_service.get_permission_by_name(&name).await?;
    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn update_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(permission_id): Path<i64>,
    Json(payload): Json<NamedEntityRequest>,
) -> ApiResult<Json<PermissionResponse>> {
    authorize(&state, &principal, Operation::UpdatePermission).await?;

    let permission = state
        .identity_service
        .update_permission(
            PermissionId::new(permission_id),
            NamedEntityInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(PermissionResponse::from(permission)))
}

pub async fn delete_permission_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(permission_id): Path<i64>,
) -> ApiResult<StatusCode> {
    authorize(&state, &principal, Operation::DeletePermission).await?;

    state
        .identity_service
        .delete_permission(PermissionId::new(permission_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_permission_to_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((permission_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<UserResponse>> {
    authorize(&state, &principal, Operation::AssignPermissionToUser).await?;

    let user = state
        .sync_service
        .assign_permission_to_user(PermissionId::new(permission_id), UserId::new(user_id))
        .await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn unassign_permission_from_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((permission_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<UserResponse>> {
    authorize(&state, &principal, Operation::UnassignPermissionFromUser).await?;

    let user = state
        .sync_service
        .unassign_permission_from_user(PermissionId::new(permission_id), UserId::new(user_id))
        .await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn sync_user_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Json(payload): Json<SyncPermissionsRequest>,
) -> ApiResult<Json<UserResponse>> {
    authorize(&state, &principal, Operation::SyncUserPermissions).await?;

    let user = state
        .sync_service
        .sync_permissions_to_user(UserId::new(user_id), &permission_ids(&payload))
        .await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn assign_permission_to_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((permission_id, role_id)): Path<(i64, i64)>,
) -> ApiResult<Json<RoleResponse>> {
    authorize(&state, &principal, Operation::AssignPermissionToRole).await?;

    let role = state
        .sync_service
        .assign_permission_to_role(PermissionId::new(permission_id), RoleId::new(role_id))
        .await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn unassign_permission_from_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((permission_id, role_id)): Path<(i64, i64)>,
) -> ApiResult<Json<RoleResponse>> {
    authorize(&state, &principal, Operation::UnassignPermissionFromRole).await?;

    let role = state
        .sync_service
        .unassign_permission_from_role(PermissionId::new(permission_id), RoleId::new(role_id))
        .await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn sync_role_permissions_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
    Json(payload): Json<SyncPermissionsRequest>,
) -> ApiResult<Json<RoleResponse>> {
    authorize(&state, &principal, Operation::SyncRolePermissions).await?;

    let role = state
        .sync_service
        .sync_role_permissions(RoleId::new(role_id), &permission_ids(&payload))
        .await?;
    Ok(Json(RoleResponse::from(role)))
}
