use schoolgate_application::{
    AccessControlService, AuthEventService, PasscodeAuthService, RateLimitService,
};

use crate::api_config::FederatedHeaderConfig;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub access_control_service: AccessControlService,
    pub passcode_auth_service: PasscodeAuthService,
    pub auth_event_service: AuthEventService,
    pub rate_limit_service: RateLimitService,
    pub frontend_url: String,
    /// `None` disables federated sign-in.
    pub federated_headers: Option<FederatedHeaderConfig>,
    pub session_absolute_timeout_seconds: i64,
    /// Reverse proxies in front of the API whose `X-Forwarded-For` entries are trusted.
    pub trusted_proxy_hops: usize,
}
