//! Account creation, login/logout and profile operations.

use serde_json::json;

use super::{decode_field, ServiceError};
use crate::api::{ApiClient, Operation};
use crate::models::{AuthPayload, User};

const CREATE_USER: &str = r#"
mutation CreateUser($username: String!, $password: String!, $email: String!) {
  createUser(username: $username, password: $password, email: $email) {
    id
  }
}
"#;

const LOGIN: &str = r#"
mutation Login($email: String!, $password: String!) {
  login(email: $email, password: $password) {
    token
    user {
      id
    }
  }
}
"#;

const LOGOUT: &str = r#"
mutation logout {
  logout
}
"#;

const ACTIVATE_USER: &str = r#"
mutation ActivateUser($email: String!) {
  activateUser(email: $email)
}
"#;

const DEACTIVATE_USER: &str = r#"
mutation DeactivateUser {
  deactivateUser
}
"#;

const ME: &str = r#"
query getMe {
  me {
    username
    created_at
  }
}
"#;

/// Account operations. Login and refresh set the session cookies; the
/// payload's user id is recorded on the client's session state.
#[derive(Debug, Clone)]
pub struct AccountService {
    client: ApiClient,
}

impl AccountService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Creates a new account. The user still has to log in afterwards.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: &str,
    ) -> Result<(), ServiceError> {
        if username.trim().is_empty() || email.trim().is_empty() || password.is_empty() {
            return Err(ServiceError::Validation(
                "Username, email and password are required".to_string(),
            ));
        }

        let op = Operation::new(CREATE_USER).with_variables(json!({
            "username": username.trim(),
            "password": password,
            "email": email.trim(),
        }));
        self.client.request(&op).await?;
        tracing::info!("Created account for {}", email.trim());
        Ok(())
    }

    /// Logs in; the server sets the session cookie on success.
    pub async fn login(&self, email: &str, password: &str) -> Result<AuthPayload, ServiceError> {
        let op = Operation::new(LOGIN).with_variables(json!({
            "email": email.trim(),
            "password": password,
        }));
        let body = self.client.request(&op).await?;
        let payload: AuthPayload = decode_field(&body, "login")?
            .ok_or_else(|| ServiceError::UnexpectedResponse("missing login payload".into()))?;

        self.client
            .session()
            .set_user_id(payload.user_id().map(str::to_string));
        tracing::info!("Logged in as user {}", payload.user_id().unwrap_or("?"));
        Ok(payload)
    }

    /// Invalidates the session on the server and clears the cookie.
    pub async fn logout(&self) -> Result<(), ServiceError> {
        self.client.request(&Operation::new(LOGOUT)).await?;
        self.client.session().set_user_id(None);
        Ok(())
    }

    /// Reactivates a previously deactivated account.
    pub async fn recover_account(&self, email: &str) -> Result<(), ServiceError> {
        let op = Operation::new(ACTIVATE_USER).with_variables(json!({ "email": email.trim() }));
        self.client.request(&op).await?;
        tracing::info!("Reactivated account {}", email.trim());
        Ok(())
    }

    /// Deactivates the current account. It can be recovered later.
    pub async fn deactivate_account(&self) -> Result<(), ServiceError> {
        self.client.request(&Operation::new(DEACTIVATE_USER)).await?;
        self.client.session().set_user_id(None);
        Ok(())
    }

    /// Returns the logged-in user, or `None` when the server reports no user.
    pub async fn current_user(&self) -> Result<Option<User>, ServiceError> {
        let body = self.client.request(&Operation::new(ME)).await?;
        decode_field(&body, "me")
    }
}
