use std::{collections::BTreeSet, sync::Arc};

use tokio::sync::watch;
use validator::Validate;

use crate::{
    client::{ApiClient, ClientError, CmsClient},
    models::{ActorRecord, CountryRecord, GenreRecord, MoviePayload, MovieRecord, MovieStatus},
    pages::{LoadState, Mount},
};

/// Choices offered by the association pickers.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DramaOptions {
    pub countries: Vec<CountryRecord>,
    pub genres: Vec<GenreRecord>,
    pub actors: Vec<ActorRecord>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct DramaDraft {
    pub title: String,
    pub synopsis: String,
    pub year: i32,
    pub rating: f64,
    pub status: MovieStatus,
    pub poster: String,
    pub trailer: String,
    pub genres: BTreeSet<i32>,
    pub countries: BTreeSet<i32>,
    pub actors: BTreeSet<i32>,
}

impl Default for DramaDraft {
    fn default() -> Self {
        Self {
            title: String::new(),
            synopsis: String::new(),
            year: i32::from(jiff::Zoned::now().year()),
            rating: 0.0,
            status: MovieStatus::Upcoming,
            poster: String::new(),
            trailer: String::new(),
            genres: BTreeSet::new(),
            countries: BTreeSet::new(),
            actors: BTreeSet::new(),
        }
    }
}

impl DramaDraft {
    pub fn to_payload(&self) -> MoviePayload {
        MoviePayload {
            title: self.title.trim().to_string(),
            synopsis: self.synopsis.trim().to_string(),
            year: self.year,
            rating: self.rating,
            status: self.status,
            poster: self.poster.trim().to_string(),
            trailer: self.trailer.trim().to_string(),
            genres: self.genres.iter().copied().collect(),
            countries: self.countries.iter().copied().collect(),
            actors: self.actors.iter().copied().collect(),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct DramaFormState {
    pub options: LoadState<DramaOptions>,
    pub draft: DramaDraft,
    pub submitting: bool,
    pub error: Option<String>,
    pub saved: Option<MovieRecord>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Association {
    Genre,
    Country,
    Actor,
}

/// The "add drama" screen.
#[derive(Clone, Debug)]
pub struct DramaForm {
    api: ApiClient,
    countries: CmsClient<CountryRecord>,
    genres: CmsClient<GenreRecord>,
    actors: CmsClient<ActorRecord>,
    movies: CmsClient<MovieRecord>,
    state: Arc<watch::Sender<DramaFormState>>,
}

impl DramaForm {
    pub fn new(api: ApiClient) -> Self {
        Self {
            countries: CmsClient::new(api.clone()),
            genres: CmsClient::new(api.clone()),
            actors: CmsClient::new(api.clone()),
            movies: CmsClient::new(api.clone()),
            api,
            state: Arc::new(watch::Sender::new(DramaFormState::default())),
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<DramaFormState> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> DramaFormState {
        self.state.borrow().clone()
    }

    pub fn mount(&self) -> Mount {
        let page = self.clone();
        Mount::spawn(async move { page.load().await })
    }

    pub async fn load(&self) {
        let (countries, genres, actors) =
            futures::join!(self.countries.list(), self.genres.list(), self.actors.list());

        let options = match (countries, genres, actors) {
            (Ok(countries), Ok(genres), Ok(actors)) => {
                LoadState::Loaded(DramaOptions { countries, genres, actors })
            },
            (Err(err), ..) | (_, Err(err), _) | (.., Err(err)) => {
                tracing::error!(error = %err, "failed to load drama form options");
                LoadState::Failed(err.to_string())
            },
        };
        self.state.send_modify(|s| s.options = options);
    }

    /// Applies an edit to the draft fields.
    pub fn edit(&self, f: impl FnOnce(&mut DramaDraft)) {
        self.state.send_modify(|s| f(&mut s.draft));
    }

    pub fn toggle(&self, association: Association, id: i32) {
        self.edit(|draft| {
            let set = match association {
                Association::Genre => &mut draft.genres,
                Association::Country => &mut draft.countries,
                Association::Actor => &mut draft.actors,
            };
            if !set.remove(&id) {
                set.insert(id);
            }
        });
    }

    pub async fn upload_poster(&self, file_name: &str, bytes: Vec<u8>) -> Result<String, ClientError> {
        let uploaded = self.api.upload(file_name, bytes).await?;
        let path = uploaded.path.clone();
        self.edit(|draft| draft.poster = uploaded.path);
        Ok(path)
    }

    /// Validates locally, then creates the movie with its associations. On
    /// success the draft is cleared.
    pub async fn submit(&self) -> Option<MovieRecord> {
        let payload = self.state.borrow().draft.to_payload();
        if let Err(errors) = payload.validate() {
            let mut fields: Vec<_> = errors.field_errors().keys().map(|k| k.to_string()).collect();
            fields.sort();
            self.state.send_modify(|s| s.error = Some(format!("Check fields: {}", fields.join(", "))));
            return None;
        }

        self.state.send_modify(|s| {
            s.submitting = true;
            s.error = None;
        });

        match self.movies.create(&payload).await {
            Ok(movie) => {
                self.state.send_modify(|s| {
                    s.submitting = false;
                    s.draft = DramaDraft::default();
                    s.saved = Some(movie.clone());
                });
                Some(movie)
            },
            Err(err) => {
                self.state.send_modify(|s| {
                    s.submitting = false;
                    s.error = Some(err.to_string());
                });
                None
            },
        }
    }
}
