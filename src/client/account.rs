use serde_json::Value;

use crate::{
    client::{ApiClient, ClientError, ClientResult},
    models::{AuthStatus, LoginPayload, ReviewPayload, ReviewView, SessionUser, SignupPayload},
};

/// Session and review calls. Shares the cookie store of the [`ApiClient`] it
/// was built from.
#[derive(Clone, Debug)]
pub struct AccountClient {
    api: ApiClient,
}

impl AccountClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    /// Any failure, including a 401, reads as "not authenticated".
    pub async fn check_auth(&self) -> AuthStatus {
        match self.api.get::<AuthStatus>("/api/auth/check-auth").await {
            Ok(status) => status,
            Err(err) => {
                tracing::debug!(error = %err, "auth check failed");
                AuthStatus { success: false, user: None }
            },
        }
    }

    pub async fn login(&self, credentials: &LoginPayload) -> ClientResult<SessionUser> {
        let status: AuthStatus = self.api.post("/api/auth/login", credentials).await?;
        session_user(status)
    }

    pub async fn signup(&self, details: &SignupPayload) -> ClientResult<SessionUser> {
        let status: AuthStatus = self.api.post("/api/auth/signup", details).await?;
        session_user(status)
    }

    pub async fn logout(&self) -> ClientResult<()> {
        let _: Value = self.api.post("/api/auth/logout", &Value::Null).await?;
        Ok(())
    }

    pub async fn add_review(&self, review: &ReviewPayload) -> ClientResult<ReviewView> {
        self.api.post("/reviews/add", review).await
    }

    pub async fn delete_review(&self, id: i32) -> ClientResult<()> {
        let _: Value = self.api.delete(&format!("/reviews/{id}")).await?;
        Ok(())
    }
}

fn session_user(status: AuthStatus) -> ClientResult<SessionUser> {
    status
        .user
        .ok_or_else(|| ClientError::Decode(serde::de::Error::custom("missing `user` field")))
}
