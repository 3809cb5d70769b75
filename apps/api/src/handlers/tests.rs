use std::sync::Arc;

use axum::Json;
use axum::extract::{Extension, Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use rolegate_application::{PasswordHasher, RoleRevocation};
use rolegate_core::{AppError, AppResult, Principal};
use rolegate_infrastructure::{InMemoryDocumentRepository, InMemoryIdentityStore, JwtTokenService};

use crate::api_config::BootstrapAdminConfig;
use crate::api_services::{Adapters, RoleSettings, assemble_state};
use crate::bootstrap;
use crate::dto::{
    AuthLoginRequest, AuthRegisterRequest, CreateDocumentRequest, NamedEntityRequest,
    SyncPermissionsRequest,
};
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

use super::{auth, documents, permissions, roles, users};

const ADMIN_EMAIL: &str = "admin@example.com";
const PASSWORD: &str = "correct horse battery";

struct PlainHasher;

impl PasswordHasher for PlainHasher {
    fn hash_password(&self, password: &str) -> AppResult<String> {
        Ok(format!("plain:{password}"))
    }

    fn verify_password(&self, password: &str, hash: &str) -> AppResult<bool> {
        Ok(hash == format!("plain:{password}"))
    }
}

fn admin_roles() -> Vec<String> {
    vec!["Super Admin".to_owned(), "HR".to_owned()]
}

async fn seeded_state() -> AppResult<AppState> {
    let tokens = JwtTokenService::new(
        "handler-test-secret-long-enough-32b",
        "rolegate",
        chrono::Duration::hours(1),
    )?;
    let admin_roles = admin_roles();
    let state = assemble_state(
        Adapters {
            identity_store: Arc::new(InMemoryIdentityStore::new()),
            document_repository: Arc::new(InMemoryDocumentRepository::new()),
            password_hasher: Arc::new(PlainHasher),
            token_issuer: Arc::new(tokens),
        },
        &RoleSettings {
            default_role_name: "user",
            admin_role_names: &admin_roles,
            revocation: RoleRevocation::Cascade,
        },
    );

    let admin = BootstrapAdminConfig {
        email: ADMIN_EMAIL.to_owned(),
        password: PASSWORD.to_owned(),
    };
    bootstrap::seed(&state, "user", &admin_roles, Some(&admin)).await?;
    Ok(state)
}

async fn sign_in(state: &AppState, email: &str) -> ApiResult<Principal> {
    let Json(response) = auth::login_handler(
        State(state.clone()),
        Json(AuthLoginRequest {
            email: email.to_owned(),
            password: PASSWORD.to_owned(),
        }),
    )
    .await?;

    Ok(state
        .auth_service
        .resolve_principal(&response.access_token)
        .await?)
}

async fn register(state: &AppState, email: &str) -> ApiResult<Principal> {
    let (status, Json(created)) = auth::register_handler(
        State(state.clone()),
        Json(AuthRegisterRequest {
            email: email.to_owned(),
            firstname: "Regular".to_owned(),
            lastname: "User".to_owned(),
            password: PASSWORD.to_owned(),
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created.email, email);

    sign_in(state, email).await
}

fn named(name: &str) -> Json<NamedEntityRequest> {
    Json(NamedEntityRequest {
        name: name.to_owned(),
        description: None,
    })
}

#[tokio::test]
async fn bootstrap_seed_is_idempotent() -> ApiResult<()> {
    let state = seeded_state().await?;
    let admin = BootstrapAdminConfig {
        email: ADMIN_EMAIL.to_owned(),
        password: PASSWORD.to_owned(),
    };
    bootstrap::seed(&state, "user", &admin_roles(), Some(&admin)).await?;

    let users = state.identity_service.list_users().await?;
    assert_eq!(users.len(), 1);
    let roles = state.identity_service.list_roles().await?;
    assert_eq!(roles.len(), 3);

    let admin = state.identity_service.get_user_by_email(ADMIN_EMAIL).await?;
    assert!(
        admin
            .roles
            .iter()
            .any(|role| role.name().as_str() == "Super Admin")
    );
    Ok(())
}

#[tokio::test]
async fn login_response_carries_a_bearer_token_and_the_user() -> ApiResult<()> {
    let state = seeded_state().await?;

    let Json(response) = auth::login_handler(
        State(state.clone()),
        Json(AuthLoginRequest {
            email: ADMIN_EMAIL.to_owned(),
            password: PASSWORD.to_owned(),
        }),
    )
    .await?;

    let body = serde_json::to_value(&response)
        .map_err(|error| AppError::Internal(error.to_string()))?;
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["user"]["email"], ADMIN_EMAIL);
    assert!(!response.access_token.is_empty());
    Ok(())
}

#[tokio::test]
async fn logout_handler_ends_the_session() -> ApiResult<()> {
    let state = seeded_state().await?;
    let Json(login) = auth::login_handler(
        State(state.clone()),
        Json(AuthLoginRequest {
            email: ADMIN_EMAIL.to_owned(),
            password: PASSWORD.to_owned(),
        }),
    )
    .await?;
    let principal = state
        .auth_service
        .resolve_principal(&login.access_token)
        .await?;

    let Json(me) = auth::me_handler(State(state.clone()), Extension(principal.clone())).await?;
    assert_eq!(me.email, ADMIN_EMAIL);

    let status = auth::logout_handler(State(state.clone()), Extension(principal)).await?;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let result = state
        .auth_service
        .resolve_principal(&login.access_token)
        .await;
    assert!(matches!(result, Err(AppError::Unauthorized(_))));
    Ok(())
}

#[tokio::test]
async fn regular_user_cannot_manage_roles() -> ApiResult<()> {
    let state = seeded_state().await?;
    let regular = register(&state, "regular@example.com").await?;

    let result =
        roles::create_role_handler(State(state.clone()), Extension(regular), named("Editor")).await;

    match result {
        Err(error) => {
            assert!(matches!(error, ApiError(AppError::Forbidden(_))));
            assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
        }
        Ok(_) => panic!("regular users must not create roles"),
    }
    Ok(())
}

#[tokio::test]
async fn admin_grants_a_permission_through_a_role() -> ApiResult<()> {
    let state = seeded_state().await?;
    let admin = sign_in(&state, ADMIN_EMAIL).await?;
    let regular = register(&state, "editor@example.com").await?;

    let (status, Json(role)) = roles::create_role_handler(
        State(state.clone()),
        Extension(admin.clone()),
        named("Editor"),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);

    let (_, Json(permission)) = permissions::create_permission_handler(
        State(state.clone()),
        Extension(admin.clone()),
        named("Publish"),
    )
    .await?;

    let Json(role) = permissions::assign_permission_to_role_handler(
        State(state.clone()),
        Extension(admin.clone()),
        Path((permission.permission_id, role.role_id)),
    )
    .await?;
    assert_eq!(role.permissions.len(), 1);

    let Json(user) = roles::assign_role_to_user_handler(
        State(state.clone()),
        Extension(admin.clone()),
        Path((role.role_id, regular.user_id())),
    )
    .await?;
    assert!(user.permissions.iter().any(|held| held.name == "Publish"));

    let Json(by_name) = permissions::get_permission_by_name_handler(
        State(state.clone()),
        Extension(regular),
        Path("Publish".to_owned()),
    )
    .await?;
    assert_eq!(by_name.user_ids, vec![user.user_id]);
    assert_eq!(by_name.role_ids, vec![role.role_id]);
    Ok(())
}

#[tokio::test]
async fn admin_sync_replaces_user_permissions() -> ApiResult<()> {
    let state = seeded_state().await?;
    let admin = sign_in(&state, ADMIN_EMAIL).await?;
    let regular = register(&state, "sync@example.com").await?;

    let mut ids = Vec::new();
    for name in ["Read", "Write", "Delete"] {
        let (_, Json(permission)) = permissions::create_permission_handler(
            State(state.clone()),
            Extension(admin.clone()),
            named(name),
        )
        .await?;
        ids.push(permission.permission_id);
    }

    let Json(full) = permissions::sync_user_permissions_handler(
        State(state.clone()),
        Extension(admin.clone()),
        Path(regular.user_id()),
        Json(SyncPermissionsRequest {
            permission_ids: ids.clone(),
        }),
    )
    .await?;
    assert_eq!(full.permissions.len(), 3);
    let Json(user) = permissions::sync_user_permissions_handler(
        State(state.clone()),
        Extension(admin),
        Path(regular.user_id()),
        Json(SyncPermissionsRequest {
            permission_ids: vec![ids[0]],
        }),
    )
    .await?;

    let names: Vec<&str> = user
        .permissions
        .iter()
        .map(|permission| permission.name.as_str())
        .collect();
    assert_eq!(names, vec!["Read"]);
    Ok(())
}

#[tokio::test]
async fn users_submit_documents_but_only_admins_delete_them() -> ApiResult<()> {
    let state = seeded_state().await?;
    let admin = sign_in(&state, ADMIN_EMAIL).await?;
    let regular = register(&state, "author@example.com").await?;

    let (status, Json(document)) = documents::create_document_handler(
        State(state.clone()),
        Extension(regular.clone()),
        Json(CreateDocumentRequest {
            title: "Quarterly report".to_owned(),
            description: None,
            content: "Numbers went up.".to_owned(),
            sensitive_data: None,
        }),
    )
    .await?;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document.uploaded_by, Some(regular.user_id()));

    let Json(listed) =
        documents::list_documents_handler(State(state.clone()), Extension(regular.clone()))
            .await?;
    assert_eq!(listed.len(), 1);

    let denied = documents::delete_document_handler(
        State(state.clone()),
        Extension(regular),
        Path(document.document_id),
    )
    .await;
    assert!(matches!(denied, Err(ApiError(AppError::Forbidden(_)))));

    let status = documents::delete_document_handler(
        State(state.clone()),
        Extension(admin),
        Path(document.document_id),
    )
    .await?;
    assert_eq!(status, StatusCode::NO_CONTENT);
    Ok(())
}

#[tokio::test]
async fn unknown_user_is_not_found_for_admins() -> ApiResult<()> {
    let state = seeded_state().await?;
    let admin = sign_in(&state, ADMIN_EMAIL).await?;

    let result =
        users::get_user_handler(State(state.clone()), Extension(admin), Path(9_999)).await;

    match result {
        Err(error) => assert_eq!(error.into_response().status(), StatusCode::NOT_FOUND),
        Ok(_) => panic!("expected a missing user"),
    }
    Ok(())
}
