use schoolgate_core::AppError;
use schoolgate_domain::{
    AccessLevel, AccessOptions, Feature, ProgramId, can_edit_record, owns_record,
    resolve_feature_access,
};
use tracing::{info, warn};

use super::*;

impl AccessControlService {
    /// Resolves access to one feature for a session identity.
    pub async fn feature_access(
        &self,
        identity: &UserIdentity,
        feature: Feature,
    ) -> AppResult<FeatureAccessResult> {
        let permission = self.permission_for_identity(identity).await?;
        Ok(resolve_feature_access(
            permission.as_ref(),
            feature,
            AccessOptions::for_identity(identity),
        ))
    }

    /// Resolves access for a raw feature tag.
    ///
    /// Unknown or retired tags resolve to no access and are reported as a
    /// data-integrity warning rather than an error.
    pub async fn feature_access_by_tag(
        &self,
        identity: &UserIdentity,
        feature_tag: &str,
    ) -> AppResult<FeatureAccessResult> {
        match Feature::from_transport(feature_tag) {
            Ok(feature) => self.feature_access(identity, feature).await,
            Err(_) => {
                warn!(
                    category = "data_integrity",
                    feature = feature_tag,
                    "unknown feature tag resolved to no access"
                );
                Ok(FeatureAccessResult::none())
            }
        }
    }

    /// Resolves every feature with a single permission read.
    pub async fn feature_access_map(
        &self,
        identity: &UserIdentity,
    ) -> AppResult<Vec<(Feature, FeatureAccessResult)>> {
        let permission = self.permission_for_identity(identity).await?;
        let options = AccessOptions::for_identity(identity);

        Ok(Feature::all()
            .iter()
            .map(|feature| {
                (
                    *feature,
                    resolve_feature_access(permission.as_ref(), *feature, options),
                )
            })
            .collect())
    }

    /// Resolves a record decision after checking the feature gate, reading
    /// the permission record once for both.
    pub async fn require_record_access(
        &self,
        identity: &UserIdentity,
        feature: Feature,
        record_program_id: Option<ProgramId>,
        required: AccessLevel,
    ) -> AppResult<RecordAccess> {
        let permission = self.permission_for_identity(identity).await?;
        let permission = permission.as_ref();
        let options = AccessOptions::for_identity(identity);

        let access = RecordAccess {
            feature_access: resolve_feature_access(permission, feature, options),
            owns_record: owns_record(permission, record_program_id, options),
            can_edit: can_edit_record(permission, feature, record_program_id, options),
        };
        ensure_access(identity, feature, access.feature_access, required)?;

        Ok(access)
    }
}

fn ensure_access(
    identity: &UserIdentity,
    feature: Feature,
    result: FeatureAccessResult,
    required: AccessLevel,
) -> AppResult<()> {
    if result.access() >= required {
        return Ok(());
    }

    info!(
        category = "access_denied",
        subject = identity.subject(),
        feature = feature.as_str(),
        required = required.as_str(),
        granted = result.access().as_str(),
        "feature access denied"
    );

    Err(AppError::Forbidden(format!(
        "subject '{}' lacks '{}' access to feature '{}'",
        identity.subject(),
        required.as_str(),
        feature.as_str()
    )))
}
