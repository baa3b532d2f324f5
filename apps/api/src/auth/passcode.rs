use axum::Json;
use axum::extract::State;
use axum::http::HeaderMap;
use schoolgate_application::{AuthEvent, AuthEventKind};
use schoolgate_core::AppError;
use tower_sessions::Session;

use crate::dto::{FeatureAccessResponse, PasscodeSignInRequest, UserIdentityResponse};
use crate::error::ApiResult;
use crate::state::AppState;

use super::session_helpers::{establish_session, extract_request_context};

pub async fn passcode_sign_in_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    session: Session,
    Json(payload): Json<PasscodeSignInRequest>,
) -> ApiResult<Json<UserIdentityResponse>> {
    let (ip_address, user_agent) = extract_request_context(&headers);

    let Some(sign_in) = state.passcode_auth_service.sign_in(&payload.passcode) else {
        state
            .auth_event_service
            .record_event(AuthEvent {
                subject: None,
                kind: AuthEventKind::PasscodeSignIn,
                succeeded: false,
                ip_address,
                user_agent,
            })
            .await?;

        return Err(AppError::Unauthorized("invalid passcode".to_owned()).into());
    };

    establish_session(&session, &sign_in.identity, Some(&sign_in.markers)).await?;
    let identity = sign_in.identity;

    state
        .auth_event_service
        .record_event(AuthEvent {
            subject: Some(identity.subject().to_owned()),
            kind: AuthEventKind::PasscodeSignIn,
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
