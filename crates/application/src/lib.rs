//! Application services and ports.

#![forbid(unsafe_code)]

mod access_control_service;
mod access_ports;
mod auth_event_service;
mod passcode_auth_service;
mod rate_limit_service;

pub use access_control_service::{AccessControlService, RecordAccess, SchoolScope};
pub use access_ports::{PermissionRepository, RegionDirectory};
pub use auth_event_service::{AuthEvent, AuthEventKind, AuthEventRepository, AuthEventService};
pub use passcode_auth_service::{
    PasscodeAuthService, PasscodeRegistry, PasscodeSessionMarkers, PasscodeSignIn,
};
pub use rate_limit_service::{AttemptInfo, RateLimitRepository, RateLimitRule, RateLimitService};
