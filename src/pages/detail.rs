use std::sync::{Arc, LazyLock};

use regex::Regex;
use tokio::sync::watch;

use crate::{
    client::{AccountClient, CatalogClient},
    models::{MovieDetail, ReviewPayload, ReviewView},
    pages::{AuthContext, LoadState, Mount, Route},
};

static YOUTUBE_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?:https?://)?(?:www\.)?(?:youtube\.com/(?:watch\?v=|embed/)|youtu\.be/)([a-zA-Z0-9_-]{11})",
    )
    .expect("valid youtube regex")
});

/// Canonical embed URL for a YouTube trailer link, if it is one.
pub fn embed_url(trailer: &str) -> Option<String> {
    let id = YOUTUBE_ID.captures(trailer)?.get(1)?.as_str();
    Some(format!("https://www.youtube.com/embed/{id}"))
}

/// Uploaded posters are stored relative to the API origin; anything else is
/// already absolute.
pub fn resolve_poster_url(poster: &str, origin: &str) -> String {
    if poster.starts_with("uploads") {
        format!("{}/{}", origin.trim_end_matches('/'), poster)
    } else {
        poster.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReviewDraft {
    pub author: String,
    pub rating: i32,
    pub text: String,
}

impl Default for ReviewDraft {
    fn default() -> Self {
        Self { author: String::new(), rating: 1, text: String::new() }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DetailState {
    pub movie: LoadState<MovieDetail>,
    pub draft: ReviewDraft,
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SubmitOutcome {
    Redirect(Route),
    Submitted(ReviewView),
    Rejected(String),
}

#[derive(Clone, Debug)]
pub struct DetailPage {
    id: i32,
    catalog: CatalogClient,
    account: AccountClient,
    auth: AuthContext,
    state: Arc<watch::Sender<DetailState>>,
}

impl DetailPage {
    /// Builds the page for the `:id` route segment.
    pub fn from_route(
        param: &str,
        catalog: CatalogClient,
        account: AccountClient,
        auth: AuthContext,
    ) -> Result<Self, std::num::ParseIntError> {
        let id = param.trim().parse()?;
        Ok(Self {
            id,
            catalog,
            account,
            auth,
            state: Arc::new(watch::Sender::new(DetailState::default())),
        })
    }

    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn subscribe(&self) -> watch::Receiver<DetailState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DetailState {
        self.state.borrow().clone()
    }

    pub fn mount(&self) -> Mount {
        let page = self.clone();
        Mount::spawn(async move { page.load().await })
    }

    pub async fn load(&self) {
        let (status, detail) =
            futures::join!(self.account.check_auth(), self.catalog.fetch_movie_detail(self.id));

        match status.user {
            Some(user) if status.success => self.auth.sign_in(user),
            _ => self.auth.sign_out(),
        }

        let movie = match detail {
            Ok(movie) => LoadState::Loaded(movie),
            Err(err) => {
                tracing::warn!(id = self.id, error = %err, "failed to load movie");
                LoadState::Failed(err.to_string())
            },
        };
        self.state.send_modify(|s| s.movie = movie);
    }

    pub fn poster_url(&self, origin: &str) -> Option<String> {
        self.state.borrow().movie.loaded().map(|m| resolve_poster_url(&m.poster, origin))
    }

    pub fn trailer_embed(&self) -> Option<String> {
        self.state.borrow().movie.loaded().and_then(|m| embed_url(&m.trailer))
    }

    pub fn set_author(&self, author: impl Into<String>) {
        let author = author.into();
        self.state.send_modify(|s| s.draft.author = author);
    }

    pub fn set_rating(&self, rating: i32) {
        self.state.send_modify(|s| s.draft.rating = rating);
    }

    pub fn set_text(&self, text: impl Into<String>) {
        let text = text.into();
        self.state.send_modify(|s| s.draft.text = text);
    }

    /// Posts the draft. Signed-out visitors are sent to the login page and
    /// nothing is sent to the server.
    pub async fn submit_review(&self) -> SubmitOutcome {
        let Some(user) = self.auth.current() else {
            return SubmitOutcome::Redirect(Route::Login);
        };

        let draft = self.state.borrow().draft.clone();
        let author = if draft.author.trim().is_empty() { user.name } else { draft.author };
        let payload =
            ReviewPayload { movie_id: self.id, user: author, rating: draft.rating, text: draft.text };

        self.state.send_modify(|s| {
            s.submitting = true;
            s.error = None;
        });

        match self.account.add_review(&payload).await {
            Ok(review) => {
                self.state.send_modify(|s| {
                    if let LoadState::Loaded(movie) = &mut s.movie {
                        movie.reviews.push(review.clone());
                    }
                    s.draft = ReviewDraft::default();
                    s.submitting = false;
                });
                SubmitOutcome::Submitted(review)
            },
            Err(err) => {
                let message = err.to_string();
                self.state.send_modify(|s| {
                    s.submitting = false;
                    s.error = Some(message.clone());
                });
                SubmitOutcome::Rejected(message)
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploaded_posters_get_the_api_origin() {
        assert_eq!(
            resolve_poster_url("uploads/x.png", "http://localhost:5000"),
            "http://localhost:5000/uploads/x.png"
        );
        assert_eq!(resolve_poster_url("https://cdn/x.png", "http://localhost:5000"), "https://cdn/x.png");
    }

    #[test]
    fn blank_draft_starts_at_the_lowest_rating() {
        let draft = ReviewDraft::default();
        assert_eq!(draft.rating, 1);
        assert!(draft.author.is_empty() && draft.text.is_empty());
    }

    #[test]
    fn all_youtube_forms_embed() {
        let expected = Some("https://www.youtube.com/embed/dQw4w9WgXcQ".to_string());
        assert_eq!(embed_url("https://www.youtube.com/watch?v=dQw4w9WgXcQ"), expected);
        assert_eq!(embed_url("youtube.com/embed/dQw4w9WgXcQ"), expected);
        assert_eq!(embed_url("https://youtu.be/dQw4w9WgXcQ?t=30"), expected);
    }

    #[test]
    fn other_urls_have_no_embed() {
        assert_eq!(embed_url("https://vimeo.com/123456789"), None);
        assert_eq!(embed_url("https://youtu.be/short"), None);
        assert_eq!(embed_url(""), None);
    }
}
