//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_access_store;
mod postgres_resource_repository;
mod postgres_role_repository;

pub use in_memory_access_store::InMemoryAccessStore;
pub use postgres_resource_repository::PostgresResourceRepository;
pub use postgres_role_repository::PostgresRoleRepository;

/// Migrations for the access-control schema.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");
