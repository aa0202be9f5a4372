use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single opaque bearer credential and its server-supplied expiry.
///
/// The token body is never inspected client-side; the identity service owns
/// its format and validity.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BearerToken {
    /// Opaque token string; empty until issued.
    pub token: String,

    /// Expiry reported by the identity service, if any.
    pub expires: Option<DateTime<Utc>>,
}

impl BearerToken {
    /// Whether the identity service has issued this credential.
    #[must_use]
    pub fn is_issued(&self) -> bool {
        !self.token.is_empty()
    }
}

/// Access/refresh credential pair for the active session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct TokenPair {
    /// Short-lived access credential.
    pub access: BearerToken,

    /// Long-lived refresh credential; sent as the bearer on authorized calls.
    pub refresh: BearerToken,
}
