//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_permission_repository;
mod in_memory_region_directory;
mod postgres_auth_event_repository;
mod postgres_permission_repository;
mod postgres_rate_limit_repository;
mod postgres_region_directory;
mod static_passcode_registry;

pub use in_memory_permission_repository::InMemoryPermissionRepository;
pub use in_memory_region_directory::InMemoryRegionDirectory;
pub use postgres_auth_event_repository::PostgresAuthEventRepository;
pub use postgres_permission_repository::PostgresPermissionRepository;
pub use postgres_rate_limit_repository::PostgresRateLimitRepository;
pub use postgres_region_directory::PostgresRegionDirectory;
pub use static_passcode_registry::StaticPasscodeRegistry;
