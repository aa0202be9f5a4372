//! Request and response bodies for the `/v1/auth/*` endpoints.
//!
//! Field names are renamed to the camelCase wire forms the identity service
//! expects; the structs themselves follow Rust naming.

use serde::{Deserialize, Serialize};

use super::tokens::TokenPair;
use super::user::UserProfile;

/// Request body for `/v1/auth/register`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    /// Desired login name.
    pub user_name: String,
    /// The account's email address.
    pub email: String,
    /// The account's password.
    pub password: String,
}

/// Request body for `/v1/auth/login`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// The account's email address.
    pub email: String,
    /// The account's password.
    pub password: String,
}

/// Request body for `/v1/auth/logout`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LogoutRequest {
    /// Refresh token of the session being terminated.
    pub refresh_token: String,
}

/// Request body for `/v1/auth/update-profile`.
///
/// `inputs_changed` is a UI-only dirty marker and is never serialized, so it
/// can be carried around by form code without ever reaching the wire.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ProfileUpdate {
    /// New login name, when changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_name: Option<String>,

    /// New display name, when changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    /// New profile blurb, when changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub about: Option<String>,

    /// New email address, when changed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// UI dirty marker; stripped before sending.
    #[serde(skip)]
    pub inputs_changed: bool,
}

/// Request body for `/v1/auth/reset-password-profile`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    /// The password currently on file.
    pub current_password: String,
    /// The replacement password.
    pub new_password: String,
}

/// Request body for `/v1/auth/provide-access`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AccessGrantRequest {
    /// Grant method chosen by the user (e.g. `"email"`).
    pub method: String,
    /// The account's staking address (its user id).
    pub staking_address: String,
}

/// Request body for `/v1/auth/verify-auth-token`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VerifyAuthRequest {
    /// One-time step-up verification code.
    pub secret: String,
}

/// The `{ user, tokens }` pair.
///
/// This is both the response body of `/v1/auth/register` and
/// `/v1/auth/login`, and the value persisted under the `"userData"` store
/// key. Persisting the response verbatim keeps the durable copy and the
/// in-memory session trivially consistent.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthSession {
    /// Profile of the authenticated account.
    pub user: UserProfile,
    /// Credential pair issued for the session.
    pub tokens: TokenPair,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logout_request_wire_shape() {
        let body = LogoutRequest {
            refresh_token: "R".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"refreshToken":"R"}"#);
    }

    #[test]
    fn test_access_grant_wire_shape() {
        let body = AccessGrantRequest {
            method: "email".to_string(),
            staking_address: "u1".to_string(),
        };
        let json = serde_json::to_string(&body).unwrap();
        assert_eq!(json, r#"{"method":"email","stakingAddress":"u1"}"#);
    }

    #[test]
    fn test_profile_update_strips_dirty_marker() {
        let patch = ProfileUpdate {
            display_name: Some("New Name".to_string()),
            inputs_changed: true,
            ..ProfileUpdate::default()
        };
        let json = serde_json::to_string(&patch).unwrap();
        assert_eq!(json, r#"{"displayName":"New Name"}"#);
    }

    #[test]
    fn test_profile_update_omits_unchanged_fields() {
        let json = serde_json::to_string(&ProfileUpdate::default()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_auth_session_parses_login_response() {
        let json = r#"{
            "user": { "id": "u1", "email": "a@b.com" },
            "tokens": {
                "access": { "token": "A" },
                "refresh": { "token": "R" }
            }
        }"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.user.id, "u1");
        assert_eq!(session.tokens.refresh.token, "R");
    }

    #[test]
    fn test_auth_session_roundtrip() {
        let session = AuthSession {
            user: UserProfile {
                id: "u1".to_string(),
                ..UserProfile::default()
            },
            ..AuthSession::default()
        };
        let json = serde_json::to_string(&session).unwrap();
        let back: AuthSession = serde_json::from_str(&json).unwrap();
        assert_eq!(back, session);
    }
}
