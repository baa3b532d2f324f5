//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod feature;
mod feature_access;
mod passcode;
mod permission;
mod program;
mod program_context;
mod record_ownership;
mod user;

pub use feature::{AccessLevel, Feature, FeatureAccessResult, base_access};
pub use feature_access::{AccessOptions, resolve_feature_access};
pub use passcode::{PASSCODE_LENGTH, Passcode, SchoolPasscode};
pub use permission::{PermissionLevel, Role, UserPermission};
pub use program::{ProgramId, ProgramMembership};
pub use program_context::ProgramPermissionContext;
pub use record_ownership::{can_edit_record, owns_record};
pub use user::EmailAddress;
