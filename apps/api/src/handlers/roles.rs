use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::{NamedEntityInput, RoleDetails};
use rolegate_core::Principal;
use rolegate_domain::{RoleId, UserId};

use crate::access_policy::{Operation, authorize};
use crate::dto::{NamedEntityRequest, RoleResponse, RoleSummaryResponse, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<NamedEntityRequest>,
) -> ApiResult<(StatusCode, Json<RoleResponse>)> {
    authorize(&state, &principal, Operation::CreateRole).await?;

    let role = state
        .identity_service
        .create_role(NamedEntityInput {
            name: payload.name,
            description: payload.description,
        })
        .await?;

    let details = RoleDetails {
        role,
        permissions: Vec::new(),
        user_ids: Vec::new(),
    };
    Ok((StatusCode::CREATED, Json(RoleResponse::from(details))))
}

pub async fn list_roles_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<RoleSummaryResponse>>> {
    authorize(&state, &principal, Operation::ListRoles).await?;

    let roles = state
        .identity_service
        .list_roles()
        .await?
        .into_iter()
        .map(RoleSummaryResponse::from)
        .collect();

    Ok(Json(roles))
}

pub async fn get_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
) -> ApiResult<Json<RoleResponse>> {
    authorize(&state, &principal, Operation::ReadRole).await?;

    let role = state.identity_service.get_role(RoleId::new(role_id)).await?;
    Ok(Json(RoleResponse::from(role)))
}

pub async fn update_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
    Json(payload): Json<NamedEntityRequest>,
) -> ApiResult<Json<RoleResponse>> {
    authorize(&state, &principal, Operation::UpdateRole).await?;

    let role = state
        .identity_service
        .update_role(
            RoleId::new(role_id),
            NamedEntityInput {
                name: payload.name,
                description: payload.description,
            },
        )
        .await?;

    Ok(Json(RoleResponse::from(role)))
}

pub async fn delete_role_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(role_id): Path<i64>,
) -> ApiResult<StatusCode> {
    authorize(&state, &principal, Operation::DeleteRole).await?;

    state
        .identity_service
        .delete_role(RoleId::new(role_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn assign_role_to_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((role_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<UserResponse>> {
    authorize(&state, &principal, Operation::AssignRoleToUser).await?;

    let user = state
        .sync_service
        .assign_role_to_user(RoleId::new(role_id), UserId::new(user_id))
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn unassign_role_from_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path((role_id, user_id)): Path<(i64, i64)>,
) -> ApiResult<Json<UserResponse>> {
    authorize(&state, &principal, Operation::UnassignRoleFromUser).await?;

    let user = state
        .sync_service
        .unassign_role_from_user(RoleId::new(role_id), UserId::new(user_id))
        .await?;

    Ok(Json(UserResponse::from(user)))
}
