//! Persisted login state.
//!
//! The storefront keeps its session in `localStorage` under four keys. These
//! helpers read and write them through injected scripts so a scenario can
//! seed or inspect a login without going through the form.

use crate::result::ClubResult;
use crate::scripts;
use crate::session::Session;
use serde_json::{json, Value};
use std::sync::Arc;

/// `localStorage` key holding the auth token
pub const TOKEN_KEY: &str = "token";
/// `localStorage` key holding the user id
pub const USER_ID_KEY: &str = "userId";
/// `localStorage` key holding the role (`admin` or `user`)
pub const ROLE_KEY: &str = "role";
/// `localStorage` key holding the account email
pub const EMAIL_KEY: &str = "userEmail";

/// Login record written by [`AuthStorage::set_auth`]
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthRecord {
    /// Auth token
    pub token: String,
    /// User id
    pub user_id: Option<String>,
    /// Role
    pub role: Option<String>,
    /// Account email
    pub email: Option<String>,
}

impl AuthRecord {
    /// Record with only a token
    #[must_use]
    pub fn token(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            ..Self::default()
        }
    }
}

/// Reads and writes the storefront's login keys
#[derive(Debug, Clone)]
pub struct AuthStorage {
    session: Arc<dyn Session>,
}

impl AuthStorage {
    /// Bind to a session
    #[must_use]
    pub fn new(session: Arc<dyn Session>) -> Self {
        Self { session }
    }

    async fn get(&self, key: &str) -> ClubResult<Option<String>> {
        let value = self
            .session
            .execute_script(scripts::LOCAL_STORAGE_GET, &[json!(key)])
            .await?;
        Ok(match value {
            Value::String(s) => Some(s),
            _ => None,
        })
    }

    async fn set(&self, key: &str, value: &str) -> ClubResult<()> {
        self.session
            .execute_script(scripts::LOCAL_STORAGE_SET, &[json!(key), json!(value)])
            .await?;
        Ok(())
    }

    /// Store a login; absent optional fields are left untouched
    pub async fn set_auth(&self, record: &AuthRecord) -> ClubResult<()> {
        self.set(TOKEN_KEY, &record.token).await?;
        for (key, value) in [
            (USER_ID_KEY, &record.user_id),
            (ROLE_KEY, &record.role),
            (EMAIL_KEY, &record.email),
        ] {
            if let Some(value) = value {
                self.set(key, value).await?;
            }
        }
        Ok(())
    }

    /// Stored token
    pub async fn token(&self) -> ClubResult<Option<String>> {
        self.get(TOKEN_KEY).await
    }

    /// Stored role
    pub async fn user_role(&self) -> ClubResult<Option<String>> {
        self.get(ROLE_KEY).await
    }

    /// Whether a non-empty token is stored
    pub async fn is_logged_in(&self) -> ClubResult<bool> {
        Ok(self.token().await?.is_some_and(|t| !t.is_empty()))
    }

    /// Remove all four login keys
    pub async fn clear_auth(&self) -> ClubResult<()> {
        for key in [TOKEN_KEY, USER_ID_KEY, ROLE_KEY, EMAIL_KEY] {
            self.session
                .execute_script(scripts::LOCAL_STORAGE_REMOVE, &[json!(key)])
                .await?;
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::mock::MockSession;

    fn storage() -> (MockSession, AuthStorage) {
        let mock = MockSession::new();
        let auth = AuthStorage::new(Arc::new(mock.clone()));
        (mock, auth)
    }

    #[tokio::test]
    async fn test_empty_storage_is_logged_out() {
        let (_, auth) = storage();
        assert!(!auth.is_logged_in().await.unwrap());
        assert_eq!(auth.user_role().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_set_auth_writes_keys() {
        let (mock, auth) = storage();
        auth.set_auth(&AuthRecord {
            token: "jwt".into(),
            user_id: Some("7".into()),
            role: Some("admin".into()),
            email: None,
        })
        .await
        .unwrap();

        assert!(auth.is_logged_in().await.unwrap());
        assert_eq!(auth.user_role().await.unwrap().as_deref(), Some("admin"));
        assert_eq!(mock.local_storage_item(USER_ID_KEY).as_deref(), Some("7"));
        assert_eq!(mock.local_storage_item(EMAIL_KEY), None);
    }

    #[tokio::test]
    async fn test_empty_token_is_logged_out() {
        let (mock, auth) = storage();
        mock.set_local_storage_item(TOKEN_KEY, "");
        assert!(!auth.is_logged_in().await.unwrap());
    }

    #[tokio::test]
    async fn test_clear_auth_keeps_other_keys() {
        let (mock, auth) = storage();
        auth.set_auth(&AuthRecord::token("t")).await.unwrap();
        mock.set_local_storage_item("cart", "[]");
        auth.clear_auth().await.unwrap();
        assert!(!auth.is_logged_in().await.unwrap());
        assert_eq!(mock.local_storage_item("cart").as_deref(), Some("[]"));
    }
}
