use std::sync::Arc;

use tokio::sync::watch;
use validator::Validate;

use crate::{
    client::AccountClient,
    models::{LoginPayload, SignupPayload},
    pages::{AuthContext, Route},
};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormState<F> {
    pub fields: F,
    pub loading: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LoginFields {
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SignupFields {
    pub name: String,
    pub email: String,
    pub password: String,
}

#[derive(Clone, Debug)]
pub struct LoginForm {
    account: AccountClient,
    auth: AuthContext,
    state: Arc<watch::Sender<FormState<LoginFields>>>,
}

impl LoginForm {
    pub fn new(account: AccountClient, auth: AuthContext) -> Self {
        Self { account, auth, state: Arc::new(watch::Sender::new(FormState::default())) }
    }

    pub fn snapshot(&self) -> FormState<LoginFields> {
        self.state.borrow().clone()
    }

    pub fn set_email(&self, email: impl Into<String>) {
        let email = email.into();
        self.state.send_modify(|s| s.fields.email = email);
    }

    pub fn set_password(&self, password: impl Into<String>) {
        let password = password.into();
        self.state.send_modify(|s| s.fields.password = password);
    }

    /// Signs in and returns where to navigate, or `None` with the error
    /// recorded in the form state.
    pub async fn submit(&self) -> Option<Route> {
        let fields = self.state.borrow().fields.clone();
        let payload = LoginPayload { email: fields.email.trim().to_string(), password: fields.password };
        if payload.validate().is_err() {
            self.fail("Enter your email and password".to_string());
            return None;
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.account.login(&payload).await {
            Ok(user) => {
                self.auth.sign_in(user);
                self.state.send_replace(FormState::default());
                Some(Route::Home)
            },
            Err(err) => {
                self.fail(err.to_string());
                None
            },
        }
    }

    fn fail(&self, message: String) {
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }
}

#[derive(Clone, Debug)]
pub struct SignupForm {
    account: AccountClient,
    auth: AuthContext,
    state: Arc<watch::Sender<FormState<SignupFields>>>,
}

impl SignupForm {
    pub fn new(account: AccountClient, auth: AuthContext) -> Self {
        Self { account, auth, state: Arc::new(watch::Sender::new(FormState::default())) }
    }

    pub fn snapshot(&self) -> FormState<SignupFields> {
        self.state.borrow().clone()
    }

    pub fn edit(&self, f: impl FnOnce(&mut SignupFields)) {
        self.state.send_modify(|s| f(&mut s.fields));
    }

    pub async fn submit(&self) -> Option<Route> {
        let fields = self.state.borrow().fields.clone();
        let payload = SignupPayload {
            name: fields.name.trim().to_string(),
            email: fields.email.trim().to_string(),
            password: fields.password,
        };
        if let Err(errors) = payload.validate() {
            let message = if errors.field_errors().contains_key("password") {
                "Password must be at least 6 characters"
            } else {
                "Enter a name and a valid email"
            };
            self.fail(message.to_string());
            return None;
        }

        self.state.send_modify(|s| {
            s.loading = true;
            s.error = None;
        });
        match self.account.signup(&payload).await {
            Ok(user) => {
                self.auth.sign_in(user);
                self.state.send_replace(FormState::default());
                Some(Route::Home)
            },
            Err(err) => {
                self.fail(err.to_string());
                None
            },
        }
    }

    fn fail(&self, message: String) {
        self.state.send_modify(|s| {
            s.loading = false;
            s.error = Some(message);
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ApiClient;

    fn account() -> AccountClient {
        // Nothing listens here; tests below never reach the network.
        AccountClient::new(ApiClient::with_client(reqwest::Client::new(), "http://127.0.0.1:9"))
    }

    #[tokio::test]
    async fn short_password_is_rejected_locally() {
        let auth = AuthContext::default();
        let form = SignupForm::new(account(), auth.clone());
        form.edit(|f| {
            f.name = "Rina".into();
            f.email = "rina@example.com".into();
            f.password = "abc".into();
        });

        assert_eq!(form.submit().await, None);
        assert_eq!(form.snapshot().error.as_deref(), Some("Password must be at least 6 characters"));
        assert!(!auth.is_authenticated());
    }

    #[tokio::test]
    async fn empty_login_is_rejected_locally() {
        let form = LoginForm::new(account(), AuthContext::default());
        assert_eq!(form.submit().await, None);
        assert!(!form.snapshot().loading);
        assert!(form.snapshot().error.is_some());
    }
}
