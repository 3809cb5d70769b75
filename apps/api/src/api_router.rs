use axum::Router;
use axum::middleware::from_fn_with_state;
use axum::routing::{get, post};
use rolegate_core::AppError;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::{handlers, middleware};

mod cors;

pub fn build_router(app_state: AppState, frontend_url: &str) -> Result<Router, AppError> {
    let protected_routes = Router::new()
        .route("/v1/auth/logout", post(handlers::auth::logout_handler))
        .route("/v1/auth/me", get(handlers::auth::me_handler))
        .route(
            "/v1/users",
            get(handlers::users::list_users_handler).post(handlers::users::create_user_handler),
        )
        .route(
            "/v1/users/{user_id}",
            get(handlers::users::get_user_handler)
                .patch(handlers::users::update_user_handler)
                .delete(handlers::users::delete_user_handler),
        )
        .route(
            "/v1/roles",
            get(handlers::roles::list_roles_handler).post(handlers::roles::create_role_handler),
        )
        .route(
            "/v1/roles/{role_id}",
            get(handlers::roles::get_role_handler)
                .put(handlers::roles::update_role_handler)
                .delete(handlers::roles::delete_role_handler),
        )
        .route(
            "/v1/roles/{role_id}/users/{user_id}",
            post(handlers::roles::assign_role_to_user_handler)
                .delete(handlers::roles::unassign_role_from_user_handler),
        )
        .route(
            "/v1/permissions",
            get(handlers::permissions::list_permissions_handler)
                .post(handlers::permissions::create_permission_handler),
        )
        .route(
            "/v1/permissions/name/{name}",
            get(handlers::permissions::get_permission_by_name_handler),
        )
        .route(
            "/v1/permissions/sync/{user_id}",
            post(handlers::permissions::sync_user_permissions_handler),
        )
        .route(
            "/v1/permissions/roles/{role_id}/sync",
            post(handlers::permissions::sync_role_permissions_handler),
        )
        .route(
            "/v1/permissions/{permission_id}",
            get(handlers::permissions::get_permission_handler)
                .put(handlers::permissions::update_permission_handler)
                .delete(handlers::permissions::delete_permission_handler),
        )
        .route(
            "/v1/permissions/{permission_id}/users/{user_id}",
            post(handlers::permissions::assign_permission_to_user_handler)
                .delete(handlers::permissions::unassign_permission_from_user_handler),
        )
        .route(
            "/v1/permissions/{permission_id}/roles/{role_id}",
            post(handlers::permissions::assign_permission_to_role_handler)
                .delete(handlers::permissions::unassign_permission_from_role_handler),
        )
        .route(
            "/v1/documents",
            get(handlers::documents::list_documents_handler)
                .post(handlers::documents::create_document_handler),
        )
        .route(
            "/v1/documents/{document_id}",
            get(handlers::documents::get_document_handler)
                .put(handlers::documents::update_document_handler)
                .delete(handlers::documents::delete_document_handler),
        )
        .route_layer(from_fn_with_state(
            app_state.clone(),
            middleware::require_auth,
        ));

    Ok(Router::new()
        .route("/health", get(handlers::health::health_handler))
        .route("/v1/auth/register", post(handlers::auth::register_handler))
        .route("/v1/auth/login", post(handlers::auth::login_handler))
        .merge(protected_routes)
        .layer(TraceLayer::new_for_http())
        .layer(cors::build_cors_layer(frontend_url)?)
        .with_state(app_state))
}
