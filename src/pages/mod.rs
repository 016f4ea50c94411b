//! UI-agnostic page state.
//!
//! Each page publishes its state through a `tokio::sync::watch` channel a
//! renderer subscribes to. Loads run under a [`Mount`]; unmounting aborts
//! them before they write anything further.

pub mod auth;
pub mod cms;
pub mod detail;
pub mod drama;
pub mod home;

use std::{future::Future, sync::Arc};

use futures::future::{AbortHandle, Abortable};
use tokio::{sync::watch, task::JoinHandle};

use crate::models::SessionUser;

pub use auth::{LoginForm, SignupForm};
pub use cms::CmsListPage;
pub use detail::{DetailPage, SubmitOutcome};
pub use drama::DramaForm;
pub use home::{HomePage, TrailerOverlay};

#[derive(Clone, Debug, Default, PartialEq)]
pub enum LoadState<T> {
    #[default]
    Loading,
    Loaded(T),
    Failed(String),
}

impl<T> LoadState<T> {
    pub fn loaded(&self) -> Option<&T> {
        match self {
            Self::Loaded(value) => Some(value),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}

/// Client-side routes pages can navigate to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Route {
    Home,
    Login,
    Signup,
    Movie(i32),
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Login => "/login".to_string(),
            Self::Signup => "/signup".to_string(),
            Self::Movie(id) => format!("/movie/{id}"),
        }
    }
}

/// Who is signed in. Cloned into every page that needs it; all clones
/// observe the same value.
#[derive(Clone, Debug)]
pub struct AuthContext {
    user: Arc<watch::Sender<Option<SessionUser>>>,
}

impl Default for AuthContext {
    fn default() -> Self {
        Self { user: Arc::new(watch::Sender::new(None)) }
    }
}

impl AuthContext {
    pub fn current(&self) -> Option<SessionUser> {
        self.user.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.borrow().is_some()
    }

    pub fn sign_in(&self, user: SessionUser) {
        self.user.send_replace(Some(user));
    }

    pub fn sign_out(&self) {
        self.user.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<SessionUser>> {
        self.user.subscribe()
    }
}

/// Handle to a page load running in the background. Dropping it, or calling
/// [`Mount::unmount`], cancels the load.
#[derive(Debug)]
pub struct Mount {
    abort: AbortHandle,
    task: Option<JoinHandle<bool>>,
}

impl Mount {
    pub fn spawn<F>(load: F) -> Self
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (abort, registration) = AbortHandle::new_pair();
        let task = tokio::spawn(async move { Abortable::new(load, registration).await.is_ok() });
        Self { abort, task: Some(task) }
    }

    pub fn unmount(self) {
        self.abort.abort();
    }

    /// Waits for the load to end. `true` when it ran to completion.
    pub async fn finished(&mut self) -> bool {
        match self.task.take() {
            Some(task) => task.await.unwrap_or(false),
            None => false,
        }
    }
}

impl Drop for Mount {
    fn drop(&mut self) {
        self.abort.abort();
    }
}
