pub mod auth;
pub mod client;
pub mod config;
pub mod db;
pub mod entities;
pub mod error;
pub mod extract;
pub mod models;
pub mod pages;
pub mod repositories;
pub mod routes;

use std::{num::NonZeroU32, sync::Arc};

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::{HeaderValue, Method, header},
    routing::{delete, get, post},
};
use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use sea_orm::DatabaseConnection;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::{
    config::Config,
    repositories::{
        ActorRepository, CountryRepository, GenreRepository, MovieRepository, ReviewRepository,
        UserRepository,
    },
};

pub struct AppState {
    pub config: Arc<Config>,
    pub actors: ActorRepository,
    pub countries: CountryRepository,
    pub genres: GenreRepository,
    pub movies: MovieRepository,
    pub reviews: ReviewRepository,
    pub users: UserRepository,
    pub auth_limiter: DefaultDirectRateLimiter,
}

impl AppState {
    pub fn new(config: Arc<Config>, db: DatabaseConnection) -> Self {
        let rps = NonZeroU32::new(config.auth_rps).unwrap_or(NonZeroU32::MIN);
        Self {
            actors: ActorRepository::new(db.clone()),
            countries: CountryRepository::new(db.clone()),
            genres: GenreRepository::new(db.clone()),
            movies: MovieRepository::new(db.clone()),
            reviews: ReviewRepository::new(db.clone()),
            users: UserRepository::new(db),
            auth_limiter: RateLimiter::direct(Quota::per_second(rps)),
            config,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    use routes::cms;

    let landing = Router::new()
        .route("/popular", get(routes::landing::popular))
        .route("/top_rated", get(routes::landing::top_rated))
        .route("/upcoming", get(routes::landing::upcoming))
        .route("/top_movie", get(routes::landing::top_movie))
        .route("/{id}", get(routes::landing::detail));

    let reviews = Router::new()
        .route("/add", post(routes::reviews::add))
        .route("/{id}", delete(routes::reviews::delete));

    let auth = Router::new()
        .route("/signup", post(routes::auth::signup))
        .route("/login", post(routes::auth::login))
        .route("/logout", post(routes::auth::logout))
        .route("/check-auth", get(routes::auth::check_auth));

    let api = Router::new()
        .nest("/auth", auth)
        .route("/actors", get(cms::list_actors).post(cms::create_actor))
        .route(
            "/actors/{id}",
            get(cms::get_actor).put(cms::update_actor).delete(cms::delete_actor),
        )
        .route("/countries", get(cms::list_countries).post(cms::create_country))
        .route(
            "/countries/{id}",
            get(cms::get_country).put(cms::update_country).delete(cms::delete_country),
        )
        .route("/genres", get(cms::list_genres).post(cms::create_genre))
        .route(
            "/genres/{id}",
            get(cms::get_genre).put(cms::update_genre).delete(cms::delete_genre),
        )
        .route("/movies", get(cms::list_movies).post(cms::create_movie))
        .route(
            "/movies/{id}",
            get(cms::get_movie).put(cms::update_movie).delete(cms::delete_movie),
        )
        .route(
            "/uploads",
            post(routes::uploads::upload)
                .layer(DefaultBodyLimit::max(routes::uploads::MAX_UPLOAD_BYTES)),
        );

    let uploads = ServeDir::new(&state.config.upload_dir);
    let cors = cors_layer(&state.config.client_origin);

    Router::new()
        .nest("/landing/movies", landing)
        .nest("/reviews", reviews)
        .nest("/api", api)
        .nest_service("/uploads", uploads)
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(client_origin: &str) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true);

    match HeaderValue::from_str(client_origin) {
        Ok(origin) => layer.allow_origin(origin),
        Err(_) => {
            tracing::warn!(origin = client_origin, "invalid CLIENT_ORIGIN, cross-origin requests disabled");
            layer
        },
    }
}
