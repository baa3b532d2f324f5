mod federated;
mod passcode;
mod session;
mod session_helpers;

pub use federated::federated_sign_in_handler;
pub use passcode::passcode_sign_in_handler;
pub use session::{logout_handler, me_handler};

pub const SESSION_USER_KEY: &str = "user_identity";
/// Absolute session creation timestamp for the absolute timeout.
pub const SESSION_CREATED_AT_KEY: &str = "session_created_at";
/// School unlocked by a passcode; absent for federated sessions.
pub const SESSION_SCHOOL_CODE_KEY: &str = "school_code";
pub const SESSION_PASSCODE_USER_KEY: &str = "is_passcode_user";
