use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use rolegate_application::{CreateUserInput, UpdateUserInput};
use rolegate_core::Principal;
use rolegate_domain::UserId;

use crate::access_policy::{Operation, authorize};
use crate::dto::{CreateUserRequest, UpdateUserRequest, UserResponse, UserSummaryResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn create_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Json(payload): Json<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    authorize(&state, &principal, Operation::CreateUser).await?;

    let user = state
        .identity_service
        .create_user(CreateUserInput {
            email: payload.email,
            firstname: payload.firstname,
            lastname: payload.lastname,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn list_users_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<Vec<UserSummaryResponse>>> {
    authorize(&state, &principal, Operation::ListUsers).await?;

    let users = state
        .identity_service
        .list_users()
        .await?
        .into_iter()
        .map(UserSummaryResponse::from)
        .collect();

    Ok(Json(users))
}

pub async fn get_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<Json<UserResponse>> {
    authorize(&state, &principal, Operation::ReadUser).await?;

    let user = state.identity_service.get_user(UserId::new(user_id)).await?;
    Ok(Json(UserResponse::from(user)))
}

pub async fn update_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
    Json(payload): Json<UpdateUserRequest>,
) -> ApiResult<Json<UserResponse>> {
    authorize(&state, &principal, Operation::UpdateUser).await?;

    let user = state
        .identity_service
        .update_user(
            UserId::new(user_id),
            UpdateUserInput {
                email: payload.email,
                firstname: payload.firstname,
                lastname: payload.lastname,
                password: payload.password,
            },
        )
        .await?;

    Ok(Json(UserResponse::from(user)))
}

pub async fn delete_user_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
    Path(user_id): Path<i64>,
) -> ApiResult<StatusCode> {
    authorize(&state, &principal, Operation::DeleteUser).await?;

    state
        .identity_service
        .delete_user(UserId::new(user_id))
        .await?;
    Ok(StatusCode::NO_CONTENT)
}
