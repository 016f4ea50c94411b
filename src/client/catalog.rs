use crate::{
    client::{ApiClient, ClientResult},
    models::{MovieCard, MovieDetail},
};

/// Read side of the landing surface.
///
/// The category fetchers swallow failures: a broken list renders as empty
/// rather than taking the page down. The detail fetcher propagates, so the
/// detail page can show an error state.
#[derive(Clone, Debug)]
pub struct CatalogClient {
    api: ApiClient,
}

impl CatalogClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn fetch_popular_movies(&self) -> Vec<MovieCard> {
        self.fetch_category("popular").await
    }

    pub async fn fetch_top_rated_movies(&self) -> Vec<MovieCard> {
        self.fetch_category("top_rated").await
    }

    pub async fn fetch_upcoming_movies(&self) -> Vec<MovieCard> {
        self.fetch_category("upcoming").await
    }

    pub async fn fetch_top_movies(&self) -> Vec<MovieCard> {
        self.fetch_category("top_movie").await
    }

    pub async fn fetch_movie_detail(&self, id: i32) -> ClientResult<MovieDetail> {
        self.api.get(&format!("/landing/movies/{id}")).await
    }

    async fn fetch_category(&self, category: &str) -> Vec<MovieCard> {
        match self.api.get(&format!("/landing/movies/{category}")).await {
            Ok(movies) => movies,
            Err(err) => {
                tracing::error!(category, error = %err, "failed to fetch movies");
                Vec::new()
            },
        }
    }
}
