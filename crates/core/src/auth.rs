use serde::{Deserialize, Serialize};

/// User information persisted in the authenticated session.
///
/// Federated identities carry an email and never a school code. Passcode
/// identities carry the school code they signed in with and no email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserIdentity {
    subject: String,
    display_name: String,
    email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    school_code: Option<String>,
}

impl UserIdentity {
    /// Creates a federated user identity.
    #[must_use]
    pub fn new(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        email: Option<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email,
            school_code: None,
        }
    }

    /// Creates a pseudo-identity for a site that signed in with a school passcode.
    #[must_use]
    pub fn for_passcode_school(
        subject: impl Into<String>,
        display_name: impl Into<String>,
        school_code: impl Into<String>,
    ) -> Self {
        Self {
            subject: subject.into(),
            display_name: display_name.into(),
            email: None,
            school_code: Some(school_code.into()),
        }
    }

    /// Returns the stable subject claim.
    #[must_use]
    pub fn subject(&self) -> &str {
        self.subject.as_str()
    }

    /// Returns the display name for the current user.
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.display_name.as_str()
    }

    /// Returns the email, if the provider returned one.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the school code for passcode identities.
    #[must_use]
    pub fn school_code(&self) -> Option<&str> {
        self.school_code.as_deref()
    }

    /// Returns whether this identity was authenticated by a school passcode.
    #[must_use]
    pub fn is_passcode_user(&self) -> bool {
        self.school_code.is_some()
    }
}
