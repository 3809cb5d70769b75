use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use rolegate_application::RoleRevocation;
use rolegate_core::AppError;
use rolegate_infrastructure::JWT_SECRET_MIN_LENGTH;
use tracing_subscriber::EnvFilter;

const DEFAULT_ADMIN_ROLE_NAMES: &str = "Super Admin,HR";

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub migrate_only: bool,
    pub database_url: String,
    pub frontend_url: String,
    pub api_host: String,
    pub api_port: u16,
    pub jwt_secret: String,
    pub jwt_issuer: String,
    pub jwt_ttl: chrono::Duration,
    pub default_role_name: String,
    pub admin_role_names: Vec<String>,
    pub role_revocation: RoleRevocation,
    pub bootstrap_admin: Option<BootstrapAdminConfig>,
}

impl ApiConfig {
    pub fn load() -> Result<Self, AppError> {
        Self::from_lookup(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_lookup(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, AppError> {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &str| {
            optional(name).ok_or_else(|| AppError::Validation(format!("{name} is required")))
        };

        let migrate_only = command == Some("migrate");
        let database_url = required("DATABASE_URL")?;
        let frontend_url =
            optional("FRONTEND_URL").unwrap_or_else(|| "http://localhost:3000".to_owned());

        let jwt_secret = required("JWT_SECRET")?;
        if jwt_secret.len() < JWT_SECRET_MIN_LENGTH {
            return Err(AppError::Validation(format!(
                "JWT_SECRET must be at least {JWT_SECRET_MIN_LENGTH} characters"
            )));
        }
        let jwt_issuer = optional("JWT_ISSUER").unwrap_or_else(|| "rolegate".to_owned());
        let jwt_ttl_hours = optional("JWT_TTL_HOURS")
            .map(|value| {
                value
                    .trim()
                    .parse::<i64>()
                    .ok()
                    .filter(|hours| (1..=24 * 365).contains(hours))
                    .ok_or_else(|| {
                        AppError::Validation(format!(
                            "JWT_TTL_HOURS must be a whole number of hours between 1 and 8760, got '{value}'"
                        ))
                    })
            })
            .transpose()?
            .unwrap_or(12);

        let api_host = optional("API_HOST").unwrap_or_else(|| "127.0.0.1".to_owned());
        let api_port = optional("API_PORT")
            .map(|value| {
                value
                    .trim()
                    .parse::<u16>()
                    .map_err(|error| AppError::Validation(format!("invalid API_PORT: {error}")))
            })
            .transpose()?
            .unwrap_or(3001);

        let default_role_name = optional("DEFAULT_ROLE_NAME")
            .map(|value| value.trim().to_owned())
            .unwrap_or_else(|| "user".to_owned());
        let admin_role_names = parse_role_names(
            optional("ADMIN_ROLE_NAMES")
                .as_deref()
                .unwrap_or(DEFAULT_ADMIN_ROLE_NAMES),
        );
        if admin_role_names.is_empty() {
            return Err(AppError::Validation(
                "ADMIN_ROLE_NAMES must name at least one role".to_owned(),
            ));
        }

        let role_revocation = optional("ROLE_REVOCATION")
            .map(|value| RoleRevocation::from_str(value.trim()))
            .transpose()?
            .unwrap_or_default();

        let bootstrap_admin = match (
            optional("BOOTSTRAP_ADMIN_EMAIL"),
            optional("BOOTSTRAP_ADMIN_PASSWORD"),
        ) {
            (Some(email), Some(password)) => Some(BootstrapAdminConfig { email, password }),
            (None, None) => None,
            _ => {
                return Err(AppError::Validation(
                    "BOOTSTRAP_ADMIN_EMAIL and BOOTSTRAP_ADMIN_PASSWORD must be set together"
                        .to_owned(),
                ));
            }
        };

        Ok(Self {
            migrate_only,
            database_url,
            frontend_url,
            api_host,
            api_port,
            jwt_secret,
            jwt_issuer,
            jwt_ttl: chrono::Duration::hours(jwt_ttl_hours),
            default_role_name,
            admin_role_names,
            role_revocation,
            bootstrap_admin,
        })
    }

    pub fn socket_address(&self) -> Result<SocketAddr, AppError> {
        let host = IpAddr::from_str(&self.api_host).map_err(|error| {
            AppError::Validation(format!("invalid API_HOST '{}': {error}", self.api_host))
        })?;
        Ok(SocketAddr::from((host, self.api_port)))
    }
}

/// Splits a comma separated list, dropping blanks and repeats.
fn parse_role_names(value: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for name in value.split(',').map(str::trim).filter(|name| !name.is_empty()) {
        if !names.iter().any(|existing| existing == name) {
            names.push(name.to_owned());
        }
    }
    names
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    const SECRET: &str = "0123456789abcdef0123456789abcdef";

    fn load(pairs: &[(&str, &str)]) -> Result<ApiConfig, AppError> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        ApiConfig::from_lookup(None, |name| values.get(name).cloned())
    }

    #[test]
    fn applies_defaults_for_optional_values() -> Result<(), AppError> {
        let config = load(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", SECRET)])?;

        assert!(!config.migrate_only);
        assert_eq!(config.jwt_issuer, "rolegate");
        assert_eq!(config.jwt_ttl, chrono::Duration::hours(12));
        assert_eq!(config.default_role_name, "user");
        assert_eq!(config.admin_role_names, vec!["Super Admin", "HR"]);
        assert_eq!(config.role_revocation, RoleRevocation::Cascade);
        assert!(config.bootstrap_admin.is_none());
        assert_eq!(config.socket_address()?.to_string(), "127.0.0.1:3001");
        Ok(())
    }

    #[test]
    fn missing_database_url_is_rejected() {
        let result = load(&[("JWT_SECRET", SECRET)]);
        assert!(matches!(result, Err(AppError::Validation(message)) if message.contains("DATABASE_URL")));
    }

    #[test]
    fn short_jwt_secret_is_rejected() {
        let result = load(&[("DATABASE_URL", "postgres://db"), ("JWT_SECRET", "short")]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[test]
    fn invalid_ttl_and_revocation_are_rejected() {
        let ttl = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", SECRET),
            ("JWT_TTL_HOURS", "0"),
        ]);
        assert!(matches!(ttl, Err(AppError::Validation(_))));

        let revocation = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", SECRET),
            ("ROLE_REVOCATION", "sometimes"),
        ]);
        assert!(matches!(revocation, Err(AppError::Validation(_))));
    }

    #[test]
    fn reads_role_settings() -> Result<(), AppError> {
        let config = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", SECRET),
            ("ADMIN_ROLE_NAMES", " Owner, ,Auditor,Owner "),
            ("ROLE_REVOCATION", "keep_shared"),
            ("DEFAULT_ROLE_NAME", "member"),
        ])?;

        assert_eq!(config.admin_role_names, vec!["Owner", "Auditor"]);
        assert_eq!(config.role_revocation, RoleRevocation::KeepShared);
        assert_eq!(config.default_role_name, "member");
        Ok(())
    }

    #[test]
    fn bootstrap_admin_requires_both_values() {
        let result = load(&[
            ("DATABASE_URL", "postgres://db"),
            ("JWT_SECRET", SECRET),
            ("BOOTSTRAP_ADMIN_EMAIL", "root@example.com"),
        ]);
        assert!(matches!(result, Err(AppError::Validation(_))));
    }
}
