use std::sync::Arc;

use async_trait::async_trait;
use tracing::info;

use schoolgate_core::AppResult;

/// Kinds of authentication events worth keeping for security review.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AuthEventKind {
    /// A site attempted to sign in with a school passcode.
    PasscodeSignIn,
    /// A staff member signed in through the identity proxy.
    FederatedSignIn,
    /// A session was ended.
    Logout,
}

impl AuthEventKind {
    /// Returns a stable storage value for this kind.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PasscodeSignIn => "passcode_sign_in",
            Self::FederatedSignIn => "federated_sign_in",
            Self::Logout => "logout",
        }
    }
}

/// Authentication event payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthEvent {
    /// Subject if one was established.
    pub subject: Option<String>,
    /// Event kind.
    pub kind: AuthEventKind,
    /// Whether the attempt succeeded.
    pub succeeded: bool,
    /// Caller IP address if available.
    pub ip_address: Option<String>,
    /// Caller user-agent if available.
    pub user_agent: Option<String>,
}

impl AuthEvent {
    /// Returns the stored outcome label.
    #[must_use]
    pub fn outcome(&self) -> &'static str {
        if self.succeeded { "success" } else { "failure" }
    }
}

/// Repository port for auth event persistence.
#[async_trait]
pub trait AuthEventRepository: Send + Sync {
    /// Appends an auth event entry.
    async fn append_event(&self, event: AuthEvent) -> AppResult<()>;
}

/// Application service for auth event recording.
#[derive(Clone)]
pub struct AuthEventService {
    repository: Arc<dyn AuthEventRepository>,
}

impl AuthEventService {
    /// Creates a service from a repository implementation.
    #[must_use]
    pub fn new(repository: Arc<dyn AuthEventRepository>) -> Self {
        Self { repository }
    }

    /// Logs and persists an auth event.
    pub async fn record_event(&self, event: AuthEvent) -> AppResult<()> {
        info!(
            category = "auth",
            kind = event.kind.as_str(),
            outcome = event.outcome(),
            subject = event.subject.as_deref().unwrap_or("-"),
            "auth event"
        );

        self.repository.append_event(event).await
    }
}
