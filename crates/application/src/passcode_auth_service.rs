use std::sync::Arc;

use schoolgate_core::UserIdentity;
use schoolgate_domain::Passcode;

/// Lookup port for the static passcode table.
pub trait PasscodeRegistry: Send + Sync {
    /// Returns the school code unlocked by an exact passcode match.
    fn school_code_for(&self, passcode: &Passcode) -> Option<String>;
}

/// Session fields stamped for passcode identities only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeSessionMarkers {
    /// School the passcode unlocked.
    pub school_code: String,
    /// Always `true`; present so consumers can read the flag directly.
    pub is_passcode_user: bool,
}

impl PasscodeSessionMarkers {
    /// Returns the markers for an identity, or `None` for federated identities.
    #[must_use]
    pub fn for_identity(identity: &UserIdentity) -> Option<Self> {
        identity.school_code().map(|school_code| Self {
            school_code: school_code.to_owned(),
            is_passcode_user: true,
        })
    }
}

/// Outcome of a successful passcode sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasscodeSignIn {
    /// Pseudo-identity to persist in the session.
    pub identity: UserIdentity,
    /// Markers stamped next to the identity.
    pub markers: PasscodeSessionMarkers,
}

/// Application service mapping passcodes to school pseudo-identities.
#[derive(Clone)]
pub struct PasscodeAuthService {
    registry: Arc<dyn PasscodeRegistry>,
}

impl PasscodeAuthService {
    /// Creates a service backed by a passcode registry.
    #[must_use]
    pub fn new(registry: Arc<dyn PasscodeRegistry>) -> Self {
        Self { registry }
    }

    /// Returns the school code for an exact eight-digit match.
    ///
    /// Candidates that are not exactly eight ASCII digits never match.
    #[must_use]
    pub fn match_school(&self, candidate: &str) -> Option<String> {
        let passcode = Passcode::parse(candidate).ok()?;
        self.registry.school_code_for(&passcode)
    }

    /// Signs a site in, synthesizing its pseudo-identity and session markers.
    #[must_use]
    pub fn sign_in(&self, candidate: &str) -> Option<PasscodeSignIn> {
        let school_code = self.match_school(candidate)?;
        let identity = UserIdentity::for_passcode_school(
            format!("passcode-{school_code}"),
            format!("School {school_code}"),
            school_code.as_str(),
        );

        Some(PasscodeSignIn {
            markers: PasscodeSessionMarkers {
                school_code,
                is_passcode_user: true,
            },
            identity,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use schoolgate_core::UserIdentity;
    use schoolgate_domain::Passcode;

    use super::{PasscodeAuthService, PasscodeRegistry, PasscodeSessionMarkers};

    struct FakeRegistry {
        entries: HashMap<String, String>,
    }

    impl PasscodeRegistry for FakeRegistry {
        fn school_code_for(&self, passcode: &Passcode) -> Option<String> {
            self.entries.get(passcode.as_str()).cloned()
        }
    }

    fn service() -> PasscodeAuthService {
        PasscodeAuthService::new(Arc::new(FakeRegistry {
            entries: HashMap::from([("70705123".to_owned(), "70705".to_owned())]),
        }))
    }

    #[test]
    fn exact_passcode_matches_school() {
        let service = service();
        assert_eq!(service.match_school("70705123"), Some("70705".to_owned()));
        assert_eq!(service.match_school("00000000"), None);
    }

    #[test]
    fn partial_or_padded_candidates_never_match() {
        let service = service();
        assert_eq!(service.match_school("7070512"), None);
        assert_eq!(service.match_school("70705123 "), None);
        assert_eq!(service.match_school(" 70705123"), None);
        assert_eq!(service.match_school("707051234"), None);
    }

    #[test]
    fn sign_in_synthesizes_pseudo_identity() {
        let sign_in = service().sign_in("70705123");
        let Some(sign_in) = sign_in else {
            panic!("expected passcode to match");
        };

        assert_eq!(sign_in.identity.subject(), "passcode-70705");
        assert_eq!(sign_in.identity.display_name(), "School 70705");
        assert_eq!(sign_in.identity.school_code(), Some("70705"));
        assert_eq!(sign_in.markers.school_code, "70705");
        assert!(sign_in.markers.is_passcode_user);
        assert_eq!(
            PasscodeSessionMarkers::for_identity(&sign_in.identity),
            Some(sign_in.markers)
        );
    }

    #[test]
    fn federated_identity_gets_no_markers() {
        let identity = UserIdentity::new("sub", "Asha", Some("asha@example.org".to_owned()));
        assert_eq!(PasscodeSessionMarkers::for_identity(&identity), None);
    }
}
