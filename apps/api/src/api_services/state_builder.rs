use std::sync::Arc;

use schoolgate_application::{
    AccessControlService, AuthEventService, PasscodeAuthService, RateLimitService,
};
use schoolgate_core::AppError;
use schoolgate_infrastructure::{
    PostgresAuthEventRepository, PostgresPermissionRepository, PostgresRateLimitRepository,
    PostgresRegionDirectory, StaticPasscodeRegistry,
};
use sqlx::PgPool;
use tracing::info;

use crate::api_config::ApiConfig;
use crate::state::AppState;

pub fn build_app_state(pool: PgPool, config: &ApiConfig) -> Result<AppState, AppError> {
    let passcode_registry = match config.school_passcodes.as_deref() {
        Some(value) => StaticPasscodeRegistry::from_config(value)?,
        None => StaticPasscodeRegistry::builtin()?,
    };
    info!(
        passcodes = passcode_registry.len(),
        managed_category = config.managed_school_category.as_str(),
        federated_sign_in = config.federated_headers.is_some(),
        "access control configured"
    );

    let access_control_service = AccessControlService::new(
        Arc::new(PostgresPermissionRepository::new(pool.clone())),
        Arc::new(PostgresRegionDirectory::new(
            pool.clone(),
            config.managed_school_category.clone(),
        )),
    );

    Ok(AppState {
        access_control_service,
        passcode_auth_service: PasscodeAuthService::new(Arc::new(passcode_registry)),
        auth_event_service: AuthEventService::new(Arc::new(PostgresAuthEventRepository::new(
            pool.clone(),
        ))),
        rate_limit_service: RateLimitService::new(Arc::new(PostgresRateLimitRepository::new(
            pool,
        ))),
        frontend_url: config.frontend_url.clone(),
        federated_headers: config.federated_headers.clone(),
        session_absolute_timeout_seconds: config.session_absolute_timeout_seconds,
        trusted_proxy_hops: config.trusted_proxy_hops,
    })
}
