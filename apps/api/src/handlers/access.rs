use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use schoolgate_core::{AppError, UserIdentity};
use schoolgate_domain::{AccessLevel, Feature, PermissionLevel, ProgramId};

use crate::dto::{
    FeatureAccessResponse, RecordAccessQuery, RecordAccessResponse, SchoolAccessQuery,
    SchoolAccessResponse, SchoolScopeResponse,
};
use crate::error::ApiResult;
use crate::state::AppState;

#[cfg(test)]
mod tests;

pub async fn list_feature_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<Vec<FeatureAccessResponse>>> {
    let features = state.access_control_service.feature_access_map(&user).await?;

    Ok(Json(FeatureAccessResponse::from_map(features)))
}

pub async fn feature_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(feature_tag): Path<String>,
) -> ApiResult<Json<FeatureAccessResponse>> {
    let result = state
        .access_control_service
        .feature_access_by_tag(&user, &feature_tag)
        .await?;

    Ok(Json(FeatureAccessResponse::new(feature_tag, result)))
}

pub async fn record_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(feature_tag): Path<String>,
    Query(query): Query<RecordAccessQuery>,
) -> ApiResult<Json<RecordAccessResponse>> {
    let feature = Feature::from_transport(&feature_tag)?;

    let access = state
        .access_control_service
        .require_record_access(
            &user,
            feature,
            query.program_id.map(ProgramId::new),
            AccessLevel::View,
        )
        .await?;

    Ok(Json(RecordAccessResponse::new(
        feature,
        query.program_id,
        access,
    )))
}

pub async fn school_scope_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
) -> ApiResult<Json<SchoolScopeResponse>> {
    let scope = state
        .access_control_service
        .school_scope_for_identity(&user)
        .await?;

    Ok(Json(SchoolScopeResponse::from(scope)))
}

/// Checks one school.
///
/// Region-level records are judged against the region the directory holds for
/// the school. A `region` query that disagrees with the directory is rejected.
pub async fn school_access_handler(
    State(state): State<AppState>,
    Extension(user): Extension<UserIdentity>,
    Path(school_code): Path<String>,
    Query(query): Query<SchoolAccessQuery>,
) -> ApiResult<Json<SchoolAccessResponse>> {
    let service = &state.access_control_service;
    let claimed_region = query
        .region
        .map(|region| region.trim().to_owned())
        .filter(|region| !region.is_empty());

    if user.is_passcode_user() {
        let can_access = service
            .can_access_school_for_identity(&user, &school_code, None)
            .await?;
        return Ok(Json(SchoolAccessResponse {
            school_code,
            region: None,
            can_access,
        }));
    }

    let Some(permission) = service.permission_for_identity(&user).await? else {
        return Ok(Json(SchoolAccessResponse {
            school_code,
            region: None,
            can_access: false,
        }));
    };

    let region = if permission.level() == PermissionLevel::Region {
        let region = service.region_for_school(&school_code).await?;
        if claimed_region.is_some() && claimed_region != region {
            return Err(AppError::Validation(format!(
                "region does not match the directory region of school '{school_code}'"
            ))
            .into());
        }
        region
    } else {
        None
    };

    let can_access = service
        .can_access_school(
            permission.email(),
            &school_code,
            region.as_deref(),
            Some(&permission),
        )
        .await?;

    Ok(Json(SchoolAccessResponse {
        school_code,
        region,
        can_access,
    }))
}
