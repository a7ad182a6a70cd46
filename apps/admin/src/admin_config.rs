use std::env;
use std::str::FromStr;

use bastion_application::EnforcementMode;
use bastion_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdminConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub enforcement_mode: EnforcementMode,
}

impl AdminConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> AppResult<Self> {
        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;

        let max_connections = match lookup("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.trim().parse::<u32>().map_err(|error| {
                AppError::Validation(format!(
                    "invalid DATABASE_MAX_CONNECTIONS value '{value}': {error}"
                ))
            })?,
            None => 5,
        };
        if max_connections == 0 {
            return Err(AppError::Validation(
                "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
            ));
        }

        let enforcement_mode = lookup("ACCESS_ENFORCEMENT_MODE")
            .map(|value| EnforcementMode::from_str(value.as_str()))
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            database_url,
            max_connections,
            enforcement_mode,
        })
    }
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

    use bastion_application::EnforcementMode;
    use bastion_core::AppError;

    use super::AdminConfig;

    fn load(values: &[(&str, &str)]) -> Result<AdminConfig, AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        AdminConfig::from_lookup(|name| values.get(name).cloned())
    }

    #[test]
    fn defaults_apply_when_only_database_url_is_set() {
        let config = load(&[("DATABASE_URL", "postgres://localhost/bastion")]);

        assert!(config.is_ok_and(|config| {
            config.max_connections == 5 && config.enforcement_mode == EnforcementMode::Strict
        }));
    }

    #[test]
    fn database_url_is_required() {
        assert!(matches!(load(&[]), Err(AppError::Validation(_))));
    }

    #[test]
    fn enforcement_mode_is_validated() {
        let soft = load(&[
            ("DATABASE_URL", "postgres://localhost/bastion"),
            ("ACCESS_ENFORCEMENT_MODE", "soft"),
        ]);
        assert!(soft.is_ok_and(|config| config.enforcement_mode == EnforcementMode::Soft));

        let unknown = load(&[
            ("DATABASE_URL", "postgres://localhost/bastion"),
            ("ACCESS_ENFORCEMENT_MODE", "audit-only"),
        ]);
        assert!(matches!(unknown, Err(AppError::Validation(_))));
    }

    #[test]
    fn zero_connections_are_rejected() {
        let config = load(&[
            ("DATABASE_URL", "postgres://localhost/bastion"),
            ("DATABASE_MAX_CONNECTIONS", "0"),
        ]);
        assert!(matches!(config, Err(AppError::Validation(_))));
    }
}
