use serde::{Deserialize, Serialize};

use super::de;

/// The logged-in user, as returned by `me`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub username: String,
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthUser {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
}

/// Returned by `login` and `refreshToken`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthPayload {
    pub token: Option<String>,
    pub user: Option<AuthUser>,
}

impl AuthPayload {
    pub fn user_id(&self) -> Option<&str> {
        self.user.as_ref().map(|u| u.id.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_auth_payload_user_id() {
        let payload: AuthPayload =
            serde_json::from_value(json!({ "token": "abc", "user": { "id": 9 } })).unwrap();
        assert_eq!(payload.user_id(), Some("9"));

        let empty: AuthPayload = serde_json::from_value(json!({ "token": null })).unwrap();
        assert_eq!(empty.user_id(), None);
    }
}
