//! Bastion operator CLI for migrations, access checks and membership changes.

#![forbid(unsafe_code)]

mod admin_command;
mod admin_config;

use std::process::ExitCode;
use std::sync::Arc;

use bastion_application::{AccessEngine, AccessRequest, ResourceRepository as _, RoleService};
use bastion_core::{AppError, AppResult};
use bastion_domain::{Capability, ResourceKind, UserId};
use bastion_infrastructure::{MIGRATOR, PostgresResourceRepository, PostgresRoleRepository};
use clap::Parser;
use serde_json::json;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use uuid::Uuid;

use crate::admin_command::{AdminCli, AdminCommand};
use crate::admin_config::{AdminConfig, init_tracing};

#[tokio::main]
async fn main() -> Result<ExitCode, AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let AdminCli { command } = AdminCli::parse();
    let config = AdminConfig::load()?;
    let pool = connect_pool(&config).await?;

    run(command, &config, pool).await
}

async fn connect_pool(config: &AdminConfig) -> AppResult<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))
}

async fn run(command: AdminCommand, config: &AdminConfig, pool: PgPool) -> AppResult<ExitCode> {
    let resource_repository = Arc::new(PostgresResourceRepository::new(pool.clone()));
    let role_repository = Arc::new(PostgresRoleRepository::new(pool.clone()));

    match command {
        AdminCommand::Migrate => {
            MIGRATOR
                .run(&pool)
                .await
                .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
            info!("migrations applied");
            Ok(ExitCode::SUCCESS)
        }
        AdminCommand::Check {
            user_id,
            capability,
            kind,
            id,
            review_status,
        } => {
            let engine = AccessEngine::new(
                resource_repository.clone(),
                role_repository,
                config.enforcement_mode,
            );
            check(
                &engine,
                resource_repository.as_ref(),
                user_id,
                capability,
                kind,
                id,
                review_status,
            )
            .await
        }
        AdminCommand::Grant {
            user_id,
            tenant_id,
            roles,
        } => {
            let service = RoleService::new(resource_repository, role_repository);
            let granted = service
                .grant_tenant_role_names(tenant_id, user_id, &roles)
                .await?;
            let roles: Vec<&str> = granted.iter().map(|role| role.as_str()).collect();
            println!(
                "{}",
                json!({ "user_id": user_id, "tenant_id": tenant_id, "roles": roles })
            );
            Ok(ExitCode::SUCCESS)
        }
        AdminCommand::SetAccess {
            user_id,
            project_id,
            access_level,
        } => {
            let service = RoleService::new(resource_repository, role_repository);
            service
                .set_project_access(project_id, user_id, access_level)
                .await?;
            println!(
                "{}",
                json!({
                    "user_id": user_id,
                    "project_id": project_id,
                    "access_level": access_level.as_str(),
                })
            );
            Ok(ExitCode::SUCCESS)
        }
        AdminCommand::Revoke { user_id, tenant_id } => {
            let service = RoleService::new(resource_repository, role_repository);
            service.revoke_all_roles(tenant_id, user_id).await?;
            println!("{}", json!({ "user_id": user_id, "tenant_id": tenant_id, "roles": [] }));
            Ok(ExitCode::SUCCESS)
        }
        AdminCommand::Members { tenant_id } => {
            let service = RoleService::new(resource_repository, role_repository);
            for assignment in service.list_tenant_role_assignments(tenant_id).await? {
                println!(
                    "{}",
                    json!({
                        "user_id": assignment.user_id,
                        "role": assignment.role.as_str(),
                        "granted_at": assignment.granted_at.to_rfc3339(),
                    })
                );
            }
            Ok(ExitCode::SUCCESS)
        }
    }
}

async fn check(
    engine: &AccessEngine,
    resource_repository: &PostgresResourceRepository,
    user_id: UserId,
    capability: Capability,
    kind: ResourceKind,
    id: Uuid,
    review_status: Option<String>,
) -> AppResult<ExitCode> {
    let principal = resource_repository
        .find_principal(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthorized(format!("user '{user_id}' does not exist")))?;

    let mut request = AccessRequest::new(capability, kind, id);
    if let Some(review_status) = review_status {
        request = request.with_review_status(review_status);
    }

    let payload = match engine.check(&principal, request).await {
        Ok(decision) => serde_json::to_value(&decision).map_err(|error| {
            AppError::Internal(format!("failed to serialize decision: {error}"))
        })?,
        Err(error @ (AppError::NotFound(_) | AppError::Forbidden(_) | AppError::Validation(_))) => {
            json!({
                "allowed": false,
                "reason": error.to_string(),
                "status_code": error.status_code(),
                "resolved": {},
            })
        }
        Err(error) => return Err(error),
    };

    println!("{payload}");

    if payload["allowed"].as_bool() == Some(true) {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::FAILURE)
    }
}
