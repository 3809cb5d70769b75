mod auth;
mod common;
mod documents;
mod identity;

pub use auth::{AuthLoginRequest, AuthLoginResponse, AuthRegisterRequest};
pub use common::HealthResponse;
pub use documents::{CreateDocumentRequest, DocumentResponse, UpdateDocumentRequest};
pub use identity::{
    CreateUserRequest, NamedEntityRequest, PermissionResponse, PermissionSummaryResponse,
    RoleResponse, RoleSummaryResponse, SyncPermissionsRequest, UpdateUserRequest, UserResponse,
    UserSummaryResponse,
};

#[cfg(test)]
mod tests {
    use super::{
        AuthLoginRequest, AuthLoginResponse, AuthRegisterRequest, CreateDocumentRequest,
        CreateUserRequest, DocumentResponse, HealthResponse, NamedEntityRequest,
        PermissionResponse, PermissionSummaryResponse, RoleResponse, RoleSummaryResponse,
        SyncPermissionsRequest, UpdateDocumentRequest, UpdateUserRequest, UserResponse,
        UserSummaryResponse,
    };

    use crate::error::ErrorResponse;
    use ts_rs::Config;
    use ts_rs::TS;

    #[test]
    fn export_ts_bindings() -> Result<(), ts_rs::ExportError> {
        let config = Config::default();

        HealthResponse::export(&config)?;
        ErrorResponse::export(&config)?;
        AuthRegisterRequest::export(&config)?;
        AuthLoginRequest::export(&config)?;
        AuthLoginResponse::export(&config)?;
        CreateUserRequest::export(&config)?;
        UpdateUserRequest::export(&config)?;
        NamedEntityRequest::export(&config)?;
        SyncPermissionsRequest::export(&config)?;
        UserSummaryResponse::export(&config)?;
        UserResponse::export(&config)?;
        RoleSummaryResponse::export(&config)?;
        RoleResponse::export(&config)?;
        PermissionSummaryResponse::export(&config)?;
        PermissionResponse::export(&config)?;
        CreateDocumentRequest::export(&config)?;
        UpdateDocumentRequest::export(&config)?;
        DocumentResponse::export(&config)?;

        Ok(())
    }
}
