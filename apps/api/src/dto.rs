use schoolgate_application::{RecordAccess, SchoolScope};
use schoolgate_core::UserIdentity;
use schoolgate_domain::{Feature, FeatureAccessResult};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Health response payload.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/health-response.ts"
)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// Incoming payload for passcode sign-in.
#[derive(Debug, Deserialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/passcode-sign-in-request.ts"
)]
pub struct PasscodeSignInRequest {
    pub passcode: String,
}

/// Access verdict for one feature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/feature-access-response.ts"
)]
pub struct FeatureAccessResponse {
    pub feature: String,
    pub access: String,
    pub can_view: bool,
    pub can_edit: bool,
}

impl FeatureAccessResponse {
    pub fn new(feature: impl Into<String>, result: FeatureAccessResult) -> Self {
        Self {
            feature: feature.into(),
            access: result.access().as_str().to_owned(),
            can_view: result.can_view(),
            can_edit: result.can_edit(),
        }
    }

    pub fn from_map(entries: Vec<(Feature, FeatureAccessResult)>) -> Vec<Self> {
        entries
            .into_iter()
            .map(|(feature, result)| Self::new(feature.as_str(), result))
            .collect()
    }
}

/// API representation of the authenticated user.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/user-identity-response.ts"
)]
pub struct UserIdentityResponse {
    pub subject: String,
    pub display_name: String,
    pub email: Option<String>,
    pub school_code: Option<String>,
    pub is_passcode_user: bool,
    pub features: Vec<FeatureAccessResponse>,
}

impl UserIdentityResponse {
    pub fn from_identity_with_features(
        identity: UserIdentity,
        features: Vec<FeatureAccessResponse>,
    ) -> Self {
        Self {
            is_passcode_user: identity.is_passcode_user(),
            subject: identity.subject().to_owned(),
            display_name: identity.display_name().to_owned(),
            email: identity.email().map(ToOwned::to_owned),
            school_code: identity.school_code().map(ToOwned::to_owned),
            features,
        }
    }
}

/// Query parameters for a record access check.
#[derive(Debug, Deserialize)]
pub struct RecordAccessQuery {
    pub program_id: Option<i32>,
}

/// Per-record edit decision.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/record-access-response.ts"
)]
pub struct RecordAccessResponse {
    pub feature: FeatureAccessResponse,
    pub program_id: Option<i32>,
    pub owns_record: bool,
    pub can_edit: bool,
}

impl RecordAccessResponse {
    pub fn new(feature: Feature, program_id: Option<i32>, access: RecordAccess) -> Self {
        Self {
            feature: FeatureAccessResponse::new(feature.as_str(), access.feature_access),
            program_id,
            owns_record: access.owns_record,
            can_edit: access.can_edit,
        }
    }
}

/// Schools visible to the caller.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/school-scope-response.ts"
)]
pub struct SchoolScopeResponse {
    pub all_schools: bool,
    pub school_codes: Vec<String>,
}

impl From<SchoolScope> for SchoolScopeResponse {
    fn from(value: SchoolScope) -> Self {
        match value {
            SchoolScope::All => Self {
                all_schools: true,
                school_codes: Vec::new(),
            },
            SchoolScope::Schools(codes) => Self {
                all_schools: false,
                school_codes: codes.into_iter().collect(),
            },
        }
    }
}

/// Query parameters for a school access check.
#[derive(Debug, Deserialize)]
pub struct SchoolAccessQuery {
    pub region: Option<String>,
}

/// Verdict for one school.
#[derive(Debug, Serialize, TS)]
#[ts(
    export,
    export_to = "../../../packages/api-types/src/generated/school-access-response.ts"
)]
pub struct SchoolAccessResponse {
    pub school_code: String,
    pub region: Option<String>,
    pub can_access: bool,
}
