use rolegate_application::LoginOutcome;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use super::UserResponse;

/// Incoming payload for self-registration.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-register-request.ts"
)]
pub struct AuthRegisterRequest {
    pub email: String,
    pub firstname: String,
    pub lastname: String,
    pub password: String,
}

/// Incoming payload for login.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-request.ts"
)]
pub struct AuthLoginRequest {
    pub email: String,
    pub password: String,
}

/// Bearer token issued on login.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/auth-login-response.ts"
)]
pub struct AuthLoginResponse {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: String,
    pub user: UserResponse,
}

impl From<LoginOutcome> for AuthLoginResponse {
    fn from(value: LoginOutcome) -> Self {
        Self {
            access_token: value.token.access_token,
            token_type: "Bearer",
            expires_at: value.token.expires_at.to_rfc3339(),
            user: UserResponse::from(value.user),
        }
    }
}
