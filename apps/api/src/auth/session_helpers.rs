use axum::http::HeaderMap;
use schoolgate_application::PasscodeSessionMarkers;
use schoolgate_core::{AppError, UserIdentity};
use tower_sessions::Session;

use super::{
    SESSION_CREATED_AT_KEY, SESSION_PASSCODE_USER_KEY, SESSION_SCHOOL_CODE_KEY, SESSION_USER_KEY,
};

/// Starts a fresh authenticated session for an identity.
///
/// The session id is cycled first. Passcode markers are written when given and
/// cleared otherwise.
pub(super) async fn establish_session(
    session: &Session,
    identity: &UserIdentity,
    markers: Option<&PasscodeSessionMarkers>,
) -> Result<(), AppError> {
    session
        .cycle_id()
        .await
        .map_err(|error| AppError::Internal(format!("failed to cycle session id: {error}")))?;

    session
        .insert(SESSION_USER_KEY, identity)
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session identity: {error}"))
        })?;

    session
        .insert(SESSION_CREATED_AT_KEY, chrono::Utc::now().timestamp())
        .await
        .map_err(|error| {
            AppError::Internal(format!("failed to persist session timestamp: {error}"))
        })?;

    match markers {
        Some(markers) => {
            session
                .insert(SESSION_SCHOOL_CODE_KEY, markers.school_code.as_str())
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist school marker: {error}"))
                })?;
            session
                .insert(SESSION_PASSCODE_USER_KEY, markers.is_passcode_user)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to persist passcode marker: {error}"))
                })?;
        }
        None => {
            session
                .remove_value(SESSION_SCHOOL_CODE_KEY)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to clear school marker: {error}"))
                })?;
            session
                .remove_value(SESSION_PASSCODE_USER_KEY)
                .await
                .map_err(|error| {
                    AppError::Internal(format!("failed to clear passcode marker: {error}"))
                })?;
        }
    }

    Ok(())
}

pub(super) fn default_display_name(email: &str) -> &str {
    email.split('@').next().unwrap_or("staff member")
}

pub(crate) fn extract_request_context(headers: &HeaderMap) -> (Option<String>, Option<String>) {
    let ip_address = headers
        .get("x-forwarded-for")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(',').next())
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    let user_agent = headers
        .get("user-agent")
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map(ToOwned::to_owned);

    (ip_address, user_agent)
}
