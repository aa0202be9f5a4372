use serde::{Deserialize, Serialize};

/// Access-grant flags attached to a user profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AccessFlags {
    /// Whether the account currently holds a platform access grant.
    pub allow: bool,
}

/// Step-up authentication flags attached to a user profile.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct AuthenticationFlags {
    /// Whether step-up verification is enabled for the account.
    pub approved: bool,
}

/// Profile projection returned by the identity service.
///
/// `role` stays a free-form string: the identity service owns that vocabulary
/// and new roles must not break deserialization of an otherwise valid profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    /// Unique identifier; doubles as the account's staking address.
    pub id: String,

    /// The user's email address.
    pub email: String,

    /// Role assigned by the identity service.
    pub role: String,

    /// The user's login name.
    pub user_name: String,

    /// Name shown in the UI.
    pub display_name: String,

    /// Free-form profile blurb.
    pub about: String,

    /// Access-grant flags.
    pub access: AccessFlags,

    /// Step-up authentication flags.
    pub authentication: AuthenticationFlags,
}

impl UserProfile {
    /// Whether this profile belongs to a signed-in account.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        !self.id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_profile_is_empty() {
        let profile = UserProfile::default();
        assert!(profile.id.is_empty());
        assert!(!profile.access.allow);
        assert!(!profile.authentication.approved);
        assert!(!profile.is_authenticated());
    }

    #[test]
    fn test_profile_deserializes_wire_casing() {
        let json = r#"{
            "id": "u1",
            "email": "a@b.com",
            "role": "member",
            "userName": "abc",
            "displayName": "A. B.",
            "about": "",
            "access": { "allow": true },
            "authentication": { "approved": false }
        }"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.user_name, "abc");
        assert_eq!(profile.display_name, "A. B.");
        assert!(profile.access.allow);
        assert!(profile.is_authenticated());
    }

    #[test]
    fn test_profile_tolerates_partial_documents() {
        let profile: UserProfile = serde_json::from_str(r#"{"id":"u2"}"#).unwrap();
        assert_eq!(profile.id, "u2");
        assert!(profile.email.is_empty());
        assert!(!profile.authentication.approved);
    }

    #[test]
    fn test_profile_serializes_camel_case() {
        let profile = UserProfile {
            user_name: "abc".to_string(),
            ..UserProfile::default()
        };
        let json = serde_json::to_string(&profile).unwrap();
        assert!(json.contains("\"userName\":\"abc\""));
        assert!(!json.contains("user_name"));
    }

    #[test]
    fn test_profile_roundtrip() {
        let profile = UserProfile {
            id: "u1".to_string(),
            email: "a@b.com".to_string(),
            role: "admin".to_string(),
            user_name: "abc".to_string(),
            display_name: "A".to_string(),
            about: "hello".to_string(),
            access: AccessFlags { allow: true },
            authentication: AuthenticationFlags { approved: true },
        };
        let json = serde_json::to_string(&profile).unwrap();
        let back: UserProfile = serde_json::from_str(&json).unwrap();
        assert_eq!(back, profile);
    }
}
