use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use schoolgate_application::{AuthEvent, AuthEventKind};
use schoolgate_core::{AppError, UserIdentity};
use schoolgate_domain::EmailAddress;
use tower_sessions::Session;

use crate::api_config::FederatedHeaderConfig;
use crate::dto::{FeatureAccessResponse, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session_helpers::{default_display_name, establish_session, extract_request_context};

/// Signs in a staff member asserted by the trusted identity proxy.
///
/// No passcode markers are stamped; permissions come from the email's record.
pub async fn federated_sign_in_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
) -> ApiResult<Json<UserIdentityResponse>> {
    let Some(config) = state.federated_headers.as_ref() else {
        return Err(AppError::Unauthorized("federated sign-in is not enabled".to_owned()).into());
    };

    let (ip_address, user_agent) = extract_request_context(&headers);

    let identity = match identity_from_headers(config, &headers) {
        Ok(identity) => identity,
        Err(error) => {
            state
                .auth_event_service
                .record_event(AuthEvent {
                    subject: None,
                    kind: AuthEventKind::FederatedSignIn,
                    succeeded: false,
                    ip_address,
                    user_agent,
                })
                .await?;
            return Err(error.into());
        }
    };

    establish_session(&session, &identity, None).await?;

    state
        .auth_event_service
        .record_event(AuthEvent {
            subject: Some(identity.subject().to_owned()),
            kind: AuthEventKind::FederatedSignIn,
            succeeded: true,
            ip_address,
            user_agent,
        })
        .await?;

    let features = state
        .access_control_service
        .feature_access_map(&identity)
        .await?;

    Ok(Json(UserIdentityResponse::from_identity_with_features(
        identity,
        FeatureAccessResponse::from_map(features),
    )))
}

fn identity_from_headers(
    config: &FederatedHeaderConfig,
    headers: &HeaderMap,
) -> Result<UserIdentity, AppError> {
    let raw_email = header_value(headers, &config.email_header).ok_or_else(|| {
        AppError::Unauthorized("identity proxy did not supply an email".to_owned())
    })?;
    let email = EmailAddress::new(raw_email).map_err(|_| {
        AppError::Unauthorized("identity proxy supplied an invalid email".to_owned())
    })?;

    let display_name = header_value(headers, &config.name_header)
        .unwrap_or_else(|| default_display_name(email.as_str()))
        .to_owned();

    Ok(UserIdentity::new(
        email.as_str(),
        display_name,
        Some(email.as_str().to_owned()),
    ))
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use axum::http::{HeaderMap, HeaderValue};
    use schoolgate_core::AppError;

    use super::identity_from_headers;
    use crate::api_config::FederatedHeaderConfig;

    fn config() -> FederatedHeaderConfig {
        FederatedHeaderConfig {
            email_header: "x-forwarded-email".to_owned(),
            name_header: "x-forwarded-user".to_owned(),
        }
    }

    #[test]
    fn identity_is_built_from_proxy_headers() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-email",
            HeaderValue::from_static("Asha.Rao@School.org"),
        );
        headers.insert("x-forwarded-user", HeaderValue::from_static("Asha Rao"));

        let identity = identity_from_headers(&config(), &headers);
        let Ok(identity) = identity else {
            panic!("expected identity from headers");
        };

        assert_eq!(identity.email(), Some("asha.rao@school.org"));
        assert_eq!(identity.display_name(), "Asha Rao");
        assert!(!identity.is_passcode_user());
        assert_eq!(identity.school_code(), None);
    }

    #[test]
    fn display_name_falls_back_to_local_part() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-email", HeaderValue::from_static("pm@school.org"));

        let identity = identity_from_headers(&config(), &headers);
        assert!(matches!(identity, Ok(identity) if identity.display_name() == "pm"));
    }

    #[test]
    fn missing_or_invalid_email_is_unauthorized() {
        assert!(matches!(
            identity_from_headers(&config(), &HeaderMap::new()),
            Err(AppError::Unauthorized(_))
        ));

        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-email", HeaderValue::from_static("not-an-email"));
        assert!(matches!(
            identity_from_headers(&config(), &headers),
            Err(AppError::Unauthorized(_))
        ));
    }
}
