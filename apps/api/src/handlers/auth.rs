use axum::Json;
use axum::extract::{Extension, State};
use axum::http::StatusCode;
use rolegate_application::CreateUserInput;
use rolegate_core::Principal;
use rolegate_domain::UserId;

use crate::dto::{AuthLoginRequest, AuthLoginResponse, AuthRegisterRequest, UserResponse};
use crate::error::ApiResult;
use crate::state::AppState;

pub async fn register_handler(
    State(state): State<AppState>,
    Json(payload): Json<AuthRegisterRequest>,
) -> ApiResult<(StatusCode, Json<UserResponse>)> {
    let user = state
        .auth_service
        .register(CreateUserInput {
            email: payload.email,
            firstname: payload.firstname,
            lastname: payload.lastname,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(UserResponse::from(user))))
}

pub async fn login_handler(
    State(state): State<AppState>,
    Json(payload): Json<AuthLoginRequest>,
) -> ApiResult<Json<AuthLoginResponse>> {
    let outcome = state
        .auth_service
        .login(&payload.email, &payload.password)
        .await?;

    Ok(Json(AuthLoginResponse::from(outcome)))
}

pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<StatusCode> {
    state.auth_service.logout(&principal).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn me_handler(
    State(state): State<AppState>,
    Extension(principal): Extension<Principal>,
) -> ApiResult<Json<UserResponse>> {
    let user = state
        .identity_service
        .get_user(UserId::new(principal.user_id()))
        .await?;

    Ok(Json(UserResponse::from(user)))
}
