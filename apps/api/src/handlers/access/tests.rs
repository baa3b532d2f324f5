use std::sync::Arc;

use async_trait::async_trait;
use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use schoolgate_application::{
    AccessControlService, AttemptInfo, AuthEvent, AuthEventRepository, AuthEventService,
    PasscodeAuthService, RateLimitRepository, RateLimitService,
};
use schoolgate_core::{AppResult, UserIdentity};
use schoolgate_domain::{PermissionLevel, ProgramId, ProgramMembership, Role, UserPermission};
use schoolgate_infrastructure::{
    InMemoryPermissionRepository, InMemoryRegionDirectory, StaticPasscodeRegistry,
};

use crate::dto::{RecordAccessQuery, SchoolAccessQuery};
use crate::state::AppState;

use super::{
    feature_access_handler, list_feature_access_handler, record_access_handler,
    school_access_handler, school_scope_handler,
};

struct NoopAuthEventRepository;

#[async_trait]
impl AuthEventRepository for NoopAuthEventRepository {
    async fn append_event(&self, _event: AuthEvent) -> AppResult<()> {
        Ok(())
    }
}

struct UnlimitedRateLimitRepository;

#[async_trait]
impl RateLimitRepository for UnlimitedRateLimitRepository {
    async fn record_attempt(
        &self,
        _key: &str,
        _window_duration_seconds: i64,
    ) -> AppResult<AttemptInfo> {
        Ok(AttemptInfo {
            attempt_count: 1,
            window_started_at: Utc::now(),
        })
    }

    async fn cleanup_expired(&self, _before: DateTime<Utc>) -> AppResult<u64> {
        Ok(0)
    }
}

async fn seeded_state() -> AppState {
    let permissions = InMemoryPermissionRepository::new();
    permissions
        .upsert(
            UserPermission::new("pm@school.org", PermissionLevel::Region, Role::ProgramManager)
                .with_regions(["North"])
                .with_programs(ProgramMembership::from_programs([ProgramId::NVS])),
        )
        .await;
    permissions
        .upsert(
            UserPermission::new(
                "coe@school.org",
                PermissionLevel::SingleSchool,
                Role::ProgramManager,
            )
            .with_school_codes(["14042"])
            .with_programs(ProgramMembership::from_programs([ProgramId::COE])),
        )
        .await;

    let directory = InMemoryRegionDirectory::new([
        ("14042", "North"),
        ("55501", "North"),
        ("70705", "South"),
    ]);

    let Ok(registry) = StaticPasscodeRegistry::builtin() else {
        panic!("builtin registry must be valid");
    };

    AppState {
        access_control_service: AccessControlService::new(
            Arc::new(permissions),
            Arc::new(directory),
        ),
        passcode_auth_service: PasscodeAuthService::new(Arc::new(registry)),
        auth_event_service: AuthEventService::new(Arc::new(NoopAuthEventRepository)),
        rate_limit_service: RateLimitService::new(Arc::new(UnlimitedRateLimitRepository)),
        frontend_url: "http://localhost:3000".to_owned(),
        federated_headers: None,
        session_absolute_timeout_seconds: 12 * 60 * 60,
        trusted_proxy_hops: 0,
    }
}

fn staff(email: &str) -> UserIdentity {
    UserIdentity::new(email, email, Some(email.to_owned()))
}

fn passcode_site() -> UserIdentity {
    UserIdentity::for_passcode_school("passcode-70705", "School 70705", "70705")
}

#[tokio::test]
async fn nvs_only_manager_loses_gated_features() {
    let state = seeded_state().await;

    let response =
        list_feature_access_handler(State(state), Extension(staff("pm@school.org"))).await;
    let Ok(Json(features)) = response else {
        panic!("feature map should resolve");
    };

    let visits = features.iter().find(|entry| entry.feature == "visits");
    assert!(matches!(visits, Some(entry) if entry.access == "none"));
    let students = features.iter().find(|entry| entry.feature == "students");
    assert!(matches!(students, Some(entry) if entry.access == "edit"));
}

#[tokio::test]
async fn unknown_feature_tag_resolves_to_none() {
    let state = seeded_state().await;

    let response = feature_access_handler(
        State(state),
        Extension(staff("coe@school.org")),
        Path("attendance".to_owned()),
    )
    .await;

    assert!(matches!(response, Ok(Json(entry)) if entry.access == "none" && !entry.can_view));
}

#[tokio::test]
async fn record_access_reports_ownership_for_coe_manager() {
    let state = seeded_state().await;

    let owned = record_access_handler(
        State(state.clone()),
        Extension(staff("coe@school.org")),
        Path("visits".to_owned()),
        Query(RecordAccessQuery { program_id: Some(1) }),
    )
    .await;
    assert!(matches!(owned, Ok(Json(ref record)) if record.owns_record && record.can_edit));

    let foreign = record_access_handler(
        State(state),
        Extension(staff("coe@school.org")),
        Path("visits".to_owned()),
        Query(RecordAccessQuery { program_id: Some(64) }),
    )
    .await;
    assert!(matches!(foreign, Ok(Json(ref record)) if !record.owns_record && !record.can_edit));
}

#[tokio::test]
async fn record_access_without_view_is_forbidden() {
    let state = seeded_state().await;

    let response = record_access_handler(
        State(state),
        Extension(staff("pm@school.org")),
        Path("visits".to_owned()),
        Query(RecordAccessQuery { program_id: None }),
    )
    .await;

    let Err(error) = response else {
        panic!("expected denial");
    };
    assert_eq!(error.into_response().status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn record_access_rejects_unknown_feature() {
    let state = seeded_state().await;

    let response = record_access_handler(
        State(state),
        Extension(staff("coe@school.org")),
        Path("attendance".to_owned()),
        Query(RecordAccessQuery { program_id: None }),
    )
    .await;

    let Err(error) = response else {
        panic!("expected validation error");
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn passcode_site_sees_only_its_school() {
    let state = seeded_state().await;

    let scope = school_scope_handler(State(state.clone()), Extension(passcode_site())).await;
    assert!(matches!(scope, Ok(Json(ref scope)) if scope.school_codes == vec!["70705"]));

    let other = school_access_handler(
        State(state),
        Extension(passcode_site()),
        Path("14042".to_owned()),
        Query(SchoolAccessQuery { region: None }),
    )
    .await;
    assert!(matches!(other, Ok(Json(ref verdict)) if !verdict.can_access));
}

#[tokio::test]
async fn region_user_school_check_looks_up_missing_region() {
    let state = seeded_state().await;

    let inside = school_access_handler(
        State(state.clone()),
        Extension(staff("pm@school.org")),
        Path("55501".to_owned()),
        Query(SchoolAccessQuery { region: None }),
    )
    .await;
    assert!(matches!(
        inside,
        Ok(Json(ref verdict)) if verdict.can_access && verdict.region.as_deref() == Some("North")
    ));

    let outside = school_access_handler(
        State(state),
        Extension(staff("pm@school.org")),
        Path("70705".to_owned()),
        Query(SchoolAccessQuery { region: None }),
    )
    .await;
    assert!(matches!(outside, Ok(Json(ref verdict)) if !verdict.can_access));
}

#[tokio::test]
async fn region_claim_conflicting_with_directory_is_rejected() {
    let state = seeded_state().await;

    let forged = school_access_handler(
        State(state.clone()),
        Extension(staff("pm@school.org")),
        Path("70705".to_owned()),
        Query(SchoolAccessQuery {
            region: Some("North".to_owned()),
        }),
    )
    .await;
    let Err(error) = forged else {
        panic!("a region outside the directory must not grant access");
    };
    assert_eq!(error.into_response().status(), StatusCode::BAD_REQUEST);

    let matching = school_access_handler(
        State(state),
        Extension(staff("pm@school.org")),
        Path("55501".to_owned()),
        Query(SchoolAccessQuery {
            region: Some(" North ".to_owned()),
        }),
    )
    .await;
    assert!(matches!(matching, Ok(Json(ref verdict)) if verdict.can_access));
}

#[tokio::test]
async fn unknown_email_has_no_school_access() {
    let state = seeded_state().await;

    let response = school_access_handler(
        State(state),
        Extension(staff("stranger@school.org")),
        Path("14042".to_owned()),
        Query(SchoolAccessQuery {
            region: Some("North".to_owned()),
        }),
    )
    .await;

    assert!(matches!(response, Ok(Json(ref verdict)) if !verdict.can_access));
}
