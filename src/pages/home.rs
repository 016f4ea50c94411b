use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    client::CatalogClient,
    models::MovieCard,
    pages::{LoadState, Mount},
};

/// The trailer modal on the home page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TrailerOverlay {
    pub video_url: String,
    pub show: bool,
}

/// Opens the overlay on the embeddable form of a YouTube watch URL.
pub fn handle_play(url: &str) -> TrailerOverlay {
    TrailerOverlay { video_url: url.replace("watch?v=", "embed/"), show: true }
}

pub fn handle_close() -> TrailerOverlay {
    TrailerOverlay::default()
}

#[derive(Clone, Debug, Default)]
pub struct HomeState {
    pub popular: LoadState<Vec<MovieCard>>,
    pub top_rated: LoadState<Vec<MovieCard>>,
    pub upcoming: LoadState<Vec<MovieCard>>,
    pub top_movies: LoadState<Vec<MovieCard>>,
    pub trailer: TrailerOverlay,
}

#[derive(Clone, Debug)]
pub struct HomePage {
    catalog: CatalogClient,
    state: Arc<watch::Sender<HomeState>>,
}

impl HomePage {
    pub fn new(catalog: CatalogClient) -> Self {
        Self { catalog, state: Arc::new(watch::Sender::new(HomeState::default())) }
    }

    pub fn subscribe(&self) -> watch::Receiver<HomeState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> HomeState {
        self.state.borrow().clone()
    }

    pub fn mount(&self) -> Mount {
        let page = self.clone();
        Mount::spawn(async move { page.load().await })
    }

    /// Fetches the four categories concurrently; each slot fills as soon as
    /// its own request settles.
    pub async fn load(&self) {
        let popular = async {
            let movies = self.catalog.fetch_popular_movies().await;
            self.state.send_modify(|s| s.popular = LoadState::Loaded(movies));
        };
        let top_rated = async {
            let movies = self.catalog.fetch_top_rated_movies().await;
            self.state.send_modify(|s| s.top_rated = LoadState::Loaded(movies));
        };
        let upcoming = async {
            let movies = self.catalog.fetch_upcoming_movies().await;
            self.state.send_modify(|s| s.upcoming = LoadState::Loaded(movies));
        };
        let top_movies = async {
            let movies = self.catalog.fetch_top_movies().await;
            self.state.send_modify(|s| s.top_movies = LoadState::Loaded(movies));
        };
        futures::join!(popular, top_rated, upcoming, top_movies);
    }

    pub fn play_trailer(&self, url: &str) {
        let overlay = handle_play(url);
        self.state.send_modify(|s| s.trailer = overlay);
    }

    pub fn close_trailer(&self) {
        self.state.send_modify(|s| s.trailer = handle_close());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn play_rewrites_watch_urls() {
        assert_eq!(
            handle_play("https://www.youtube.com/watch?v=example"),
            TrailerOverlay { video_url: "https://www.youtube.com/embed/example".into(), show: true }
        );
    }

    #[test]
    fn close_always_resets() {
        assert_eq!(handle_close(), TrailerOverlay { video_url: String::new(), show: false });
    }
}
