//! Startup seed for the roles and accounts the API cannot run without.

use rolegate_application::CreateUserInput;
use rolegate_core::{AppError, AppResult};
use tracing::info;

use crate::api_config::BootstrapAdminConfig;
use crate::state::AppState;

/// Ensures the default role, every admin role and the optional bootstrap
/// admin account exist. Running it again changes nothing.
pub async fn seed(
    state: &AppState,
    default_role_name: &str,
    admin_role_names: &[String],
    bootstrap_admin: Option<&BootstrapAdminConfig>,
) -> AppResult<()> {
    state
        .identity_service
        .ensure_role(default_role_name, Some("Granted to every new account"))
        .await?;

    for name in admin_role_names {
        state
            .identity_service
            .ensure_role(name, Some("Administrative role"))
            .await?;
    }

    let (Some(admin), Some(admin_role)) = (bootstrap_admin, admin_role_names.first()) else {
        return Ok(());
    };

    let user = match state.identity_service.get_user_by_email(&admin.email).await {
        Ok(user) => user,
        Err(AppError::NotFound(_)) => {
            let user = state
                .identity_service
                .create_user(CreateUserInput {
                    email: admin.email.clone(),
                    firstname: "Bootstrap".to_owned(),
                    lastname: "Admin".to_owned(),
                    password: admin.password.clone(),
                })
                .await?;
            info!(user_id = %user.user.id(), "bootstrap admin created");
            user
        }
        Err(error) => return Err(error),
    };

    state
        .sync_service
        .assign_role_to_user_by_name(admin_role, user.user.id())
        .await?;

    Ok(())
}
