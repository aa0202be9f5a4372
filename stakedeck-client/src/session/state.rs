//! Session state and its transition rules.
//!
//! Transitions are pure, total, and infallible; anything that can fail
//! (network, persistence) lives in the controller one layer up.

use shared::models::{TokenPair, UserProfile};

/// Authoritative in-memory record of the authenticated session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionState {
    /// True while a session-mutating operation is outstanding. Starts true:
    /// an operation is assumed pending until the first rehydrate completes.
    pub loading: bool,

    /// Message of the last surfaced failure; cleared when a new guarded
    /// operation begins.
    pub error: Option<String>,

    /// Whether this session has passed step-up verification.
    pub auth_verified: bool,

    /// Profile of the signed-in account; empty when signed out.
    pub user: UserProfile,

    /// Credential pair for the session; empty when signed out.
    pub tokens: TokenPair,
}

impl Default for SessionState {
    fn default() -> Self {
        Self {
            loading: true,
            error: None,
            auth_verified: false,
            user: UserProfile::default(),
            tokens: TokenPair::default(),
        }
    }
}

impl SessionState {
    /// Set the in-flight operation flag.
    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    /// Replace the user profile.
    pub fn set_user(&mut self, user: UserProfile) {
        self.user = user;
    }

    /// Flip the profile's access grant without a full profile refresh.
    pub fn set_access_allowed(&mut self, allow: bool) {
        self.user.access.allow = allow;
    }

    /// Replace the credential pair.
    pub fn set_tokens(&mut self, tokens: TokenPair) {
        self.tokens = tokens;
    }

    /// Record or clear the surfaced failure message.
    pub fn set_error(&mut self, error: Option<String>) {
        self.error = error;
    }

    /// Set the session verification flag and the account's step-up flag in
    /// one write, so the pair can never be observed torn.
    pub fn apply_verification(&mut self, verified: bool) {
        self.auth_verified = verified;
        self.user.authentication.approved = verified;
    }
}
