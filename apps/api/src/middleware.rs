use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Extension, Request, State};
use axum::http::{HeaderMap, HeaderValue, Method, header};
use axum::middleware::Next;
use axum::response::Response;
use schoolgate_application::{PasscodeSessionMarkers, RateLimitRule};
use schoolgate_core::{AppError, UserIdentity};
use tower_sessions::Session;
use tracing::warn;

use crate::auth::{
    SESSION_CREATED_AT_KEY, SESSION_PASSCODE_USER_KEY, SESSION_SCHOOL_CODE_KEY, SESSION_USER_KEY,
};
use crate::error::ApiResult;
use crate::state::AppState;

/// Resolves the session identity and enforces the absolute session lifetime.
pub async fn require_auth(
    State(state): State<AppState>,
    session: Session,
    mut request: Request,
    next: Next,
) -> ApiResult<Response> {
    let identity = session
        .get::<UserIdentity>(SESSION_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session identity: {error}")))?
        .ok_or_else(|| AppError::Unauthorized("authentication required".to_owned()))?;

    let created_at = session
        .get::<i64>(SESSION_CREATED_AT_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read session timestamp: {error}")))?;

    if session_expired(
        created_at,
        chrono::Utc::now().timestamp(),
        state.session_absolute_timeout_seconds,
    ) {
        session
            .delete()
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;
        return Err(AppError::Unauthorized("session expired".to_owned()).into());
    }

    let school_code_marker = session
        .get::<String>(SESSION_SCHOOL_CODE_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read school marker: {error}")))?;
    let passcode_marker = session
        .get::<bool>(SESSION_PASSCODE_USER_KEY)
        .await
        .map_err(|error| AppError::Internal(format!("failed to read passcode marker: {error}")))?;

    if !markers_match_identity(
        &identity,
        school_code_marker.as_deref(),
        passcode_marker.unwrap_or(false),
    ) {
        warn!(
            category = "data_integrity",
            subject = identity.subject(),
            "session passcode markers disagree with the stored identity"
        );
        session
            .delete()
            .await
            .map_err(|error| AppError::Internal(format!("failed to delete session: {error}")))?;
        return Err(AppError::Unauthorized("authentication required".to_owned()).into());
    }

    request.extensions_mut().insert(identity);
    Ok(next.run(request).await)
}

/// Counts the request against the route's rule, keyed by caller address.
pub async fn rate_limit(
    State(state): State<AppState>,
    Extension(rule): Extension<RateLimitRule>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(address)| *address);
    let key = client_address(request.headers(), peer, state.trusted_proxy_hops);

    state.rate_limit_service.check_rate_limit(&rule, &key).await?;

    Ok(next.run(request).await)
}

pub async fn require_same_origin_for_mutations(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> ApiResult<Response> {
    if is_state_changing_method(request.method()) {
        let headers = request.headers();

        if let Some(fetch_site) = headers.get("sec-fetch-site") {
            if fetch_site == HeaderValue::from_static("cross-site") {
                return Err(AppError::Unauthorized("cross-site request blocked".to_owned()).into());
            }
        }

        let origin = headers
            .get(header::ORIGIN)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        let referer = headers
            .get(header::REFERER)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();

        if !origin_is_allowed(origin, referer, &state.frontend_url) {
            return Err(AppError::Unauthorized("origin validation failed".to_owned()).into());
        }
    }

    Ok(next.run(request).await)
}

/// Resolves the caller address used as a rate limit key.
///
/// Each trusted proxy appends the address it received the request from, so the
/// client is the entry `trusted_hops` positions from the right of
/// `X-Forwarded-For`. Entries further left are client supplied and ignored.
/// Without trusted proxies, or when the header is too short, the peer address
/// of the connection is used.
fn client_address(headers: &HeaderMap, peer: Option<SocketAddr>, trusted_hops: usize) -> String {
    let forwarded = headers
        .get("x-forwarded-for")
        .filter(|_| trusted_hops > 0)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| {
            let hops = value.split(',').map(str::trim).collect::<Vec<_>>();
            hops.len()
                .checked_sub(trusted_hops)
                .and_then(|index| hops.get(index).copied())
        })
        .filter(|value| !value.is_empty());

    match (forwarded, peer) {
        (Some(address), _) => address.to_owned(),
        (None, Some(peer)) => peer.ip().to_string(),
        (None, None) => "unknown".to_owned(),
    }
}

fn is_state_changing_method(method: &Method) -> bool {
    matches!(
        *method,
        Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    )
}

fn origin_is_allowed(origin: &str, referer: &str, allowed_origin: &str) -> bool {
    origin == allowed_origin
        || referer == allowed_origin
        || referer
            .strip_prefix(allowed_origin)
            .is_some_and(|rest| rest.starts_with('/'))
}

/// Sessions without a creation timestamp predate the absolute timeout and are expired.
fn session_expired(created_at: Option<i64>, now: i64, timeout_seconds: i64) -> bool {
    match created_at {
        Some(created_at) => now.saturating_sub(created_at) > timeout_seconds,
        None => true,
    }
}

fn markers_match_identity(
    identity: &UserIdentity,
    school_code_marker: Option<&str>,
    passcode_marker: bool,
) -> bool {
    match PasscodeSessionMarkers::for_identity(identity) {
        Some(expected) => {
            passcode_marker == expected.is_passcode_user
                && school_code_marker == Some(expected.school_code.as_str())
        }
        None => !passcode_marker && school_code_marker.is_none(),
    }
}

#[cfg(test)]
mod tests {
    use std::net::SocketAddr;

    use axum::http::{HeaderMap, HeaderValue, Method};
    use schoolgate_core::UserIdentity;

    use super::{
        client_address, is_state_changing_method, markers_match_identity, origin_is_allowed,
        session_expired,
    };

    fn forwarded(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn rate_limit_key_ignores_forwarded_header_without_trusted_proxies() {
        let peer = Some(SocketAddr::from(([10, 0, 0, 7], 51_000)));

        assert_eq!(client_address(&forwarded("198.51.100.1"), peer, 0), "10.0.0.7");
        assert_eq!(client_address(&forwarded("203.0.113.9"), peer, 0), "10.0.0.7");
        assert_eq!(client_address(&HeaderMap::new(), None, 0), "unknown");
    }

    #[test]
    fn rate_limit_key_takes_the_hop_appended_by_the_outermost_trusted_proxy() {
        let peer = Some(SocketAddr::from(([10, 0, 0, 7], 51_000)));
        let headers = forwarded("1.1.1.1, 198.51.100.4, 10.0.0.2");

        assert_eq!(client_address(&headers, peer, 1), "10.0.0.2");
        assert_eq!(client_address(&headers, peer, 2), "198.51.100.4");
        assert_eq!(client_address(&headers, peer, 4), "10.0.0.7");
        assert_eq!(client_address(&forwarded("forged, 198.51.100.4"), peer, 1), "198.51.100.4");
    }

    #[test]
    fn only_mutations_need_origin_checks() {
        assert!(is_state_changing_method(&Method::POST));
        assert!(is_state_changing_method(&Method::DELETE));
        assert!(!is_state_changing_method(&Method::GET));
    }

    #[test]
    fn referer_must_sit_under_the_frontend_origin() {
        let frontend = "https://portal.example.org";
        assert!(origin_is_allowed(frontend, "", frontend));
        assert!(origin_is_allowed("", "https://portal.example.org/visits", frontend));
        assert!(!origin_is_allowed(
            "",
            "https://portal.example.org.attacker.net/",
            frontend
        ));
        assert!(!origin_is_allowed("https://attacker.net", "", frontend));
    }

    #[test]
    fn absolute_timeout_expires_old_and_unstamped_sessions() {
        let twelve_hours = 12 * 60 * 60;
        assert!(!session_expired(Some(1_000), 1_000 + twelve_hours, twelve_hours));
        assert!(session_expired(Some(1_000), 1_001 + twelve_hours, twelve_hours));
        assert!(session_expired(None, 1_000, twelve_hours));
    }

    #[test]
    fn passcode_markers_must_match_identity_kind() {
        let passcode = UserIdentity::for_passcode_school("passcode-70705", "School 70705", "70705");
        let federated = UserIdentity::new("pm@school.org", "pm", Some("pm@school.org".to_owned()));

        assert!(markers_match_identity(&passcode, Some("70705"), true));
        assert!(!markers_match_identity(&passcode, Some("14042"), true));
        assert!(!markers_match_identity(&passcode, None, false));
        assert!(markers_match_identity(&federated, None, false));
        assert!(!markers_match_identity(&federated, Some("70705"), true));
    }
}
