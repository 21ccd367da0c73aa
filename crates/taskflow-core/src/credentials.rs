//! Demo credentials handed to an embedded TaskFlow by its host page.

use serde::{Deserialize, Serialize};

/// Demo user identity.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoUser {
    /// Stable user ID, used to tag owned tasks.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Contact email.
    #[serde(default)]
    pub email: String,
    /// Role label.
    #[serde(default = "default_role")]
    pub role: String,
}

fn default_role() -> String {
    "user".to_owned()
}

/// UI preferences that travel with the credentials.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DemoPreferences {
    /// Theme name.
    pub theme: String,
    /// Whether toast notifications are enabled.
    pub notifications: bool,
}

impl Default for DemoPreferences {
    fn default() -> Self {
        Self {
            theme: "light".to_owned(),
            notifications: true,
        }
    }
}

/// Credentials used to scope the session to a demo user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DemoCredentials {
    /// The demo user.
    pub user: DemoUser,
    /// Preferences.
    #[serde(default)]
    pub preferences: DemoPreferences,
}

impl DemoCredentials {
    /// Built-in credentials used when running standalone or when the host
    /// never answers.
    pub fn fallback() -> Self {
        Self {
            user: DemoUser {
                id: "demo-user-1".to_owned(),
                name: "Demo User".to_owned(),
                email: "demo@taskflow.app".to_owned(),
                role: default_role(),
            },
            preferences: DemoPreferences::default(),
        }
    }
}

impl Default for DemoCredentials {
    fn default() -> Self {
        Self::fallback()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_is_demo_user() {
        let creds = DemoCredentials::fallback();
        assert_eq!(creds.user.name, "Demo User");
        assert_eq!(creds.user.id, "demo-user-1");
        assert!(creds.preferences.notifications);
    }

    #[test]
    fn minimal_payload_fills_defaults() {
        let creds: DemoCredentials =
            serde_json::from_str(r#"{"user":{"id":"u-9","name":"Ada"}}"#).unwrap();
        assert_eq!(creds.user.role, "user");
        assert_eq!(creds.preferences.theme, "light");
    }

    #[test]
    fn missing_user_is_rejected() {
        assert!(serde_json::from_str::<DemoCredentials>(r#"{"preferences":{}}"#).is_err());
    }
}
