//! CRUD handlers backing the content-management screens.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    AppState,
    error::AppResult,
    extract::{Id, ValidatedJson},
    models::{
        ActorPayload, ActorRecord, ActorUpdate, CountryRecord, GenreRecord, MoviePayload,
        MovieRecord, MovieUpdate, NamePayload,
    },
};

type Created = (StatusCode, Json<Value>);

fn created(message: &str, key: &str, record: impl serde::Serialize) -> AppResult<Created> {
    let record = serde_json::to_value(record).map_err(anyhow::Error::from)?;
    Ok((StatusCode::CREATED, Json(json!({ "message": message, key: record }))))
}

fn deleted(message: &str) -> Json<Value> {
    Json(json!({ "message": message }))
}

// ---- actors ---------------------------------------------------------------

pub async fn list_actors(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let actors = state.actors.list().await?;
    Ok(Json(json!({ "actors": actors })))
}

pub async fn get_actor(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> AppResult<Json<ActorRecord>> {
    Ok(Json(state.actors.get_by_id(id).await?))
}

pub async fn create_actor(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<ActorPayload>,
) -> AppResult<Created> {
    let actor = state.actors.create(payload).await?;
    created("Actor created", "actor", actor)
}

pub async fn update_actor(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
    ValidatedJson(changes): ValidatedJson<ActorUpdate>,
) -> AppResult<Json<ActorRecord>> {
    Ok(Json(state.actors.update(id, changes).await?))
}

pub async fn delete_actor(State(state): State<Arc<AppState>>, Id(id): Id) -> AppResult<Json<Value>> {
    state.actors.delete(id).await?;
    Ok(deleted("Actor deleted"))
}

// ---- countries ------------------------------------------------------------

pub async fn list_countries(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let countries = state.countries.list().await?;
    Ok(Json(json!({ "countries": countries })))
}

pub async fn get_country(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> AppResult<Json<CountryRecord>> {
    Ok(Json(state.countries.get_by_id(id).await?))
}

pub async fn create_country(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<NamePayload>,
) -> AppResult<Created> {
    let country = state.countries.create(payload).await?;
    created("Country created", "country", country)
}

pub async fn update_country(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<NamePayload>,
) -> AppResult<Json<CountryRecord>> {
    Ok(Json(state.countries.update(id, payload).await?))
}

pub async fn delete_country(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> AppResult<Json<Value>> {
    state.countries.delete(id).await?;
    Ok(deleted("Country deleted"))
}

// ---- genres ---------------------------------------------------------------

pub async fn list_genres(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let genres = state.genres.list().await?;
    Ok(Json(json!({ "genres": genres })))
}

pub async fn get_genre(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> AppResult<Json<GenreRecord>> {
    Ok(Json(state.genres.get_by_id(id).await?))
}

pub async fn create_genre(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<NamePayload>,
) -> AppResult<Created> {
    let genre = state.genres.create(payload).await?;
    created("Genre created", "genre", genre)
}

pub async fn update_genre(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
    ValidatedJson(payload): ValidatedJson<NamePayload>,
) -> AppResult<Json<GenreRecord>> {
    Ok(Json(state.genres.update(id, payload).await?))
}

pub async fn delete_genre(State(state): State<Arc<AppState>>, Id(id): Id) -> AppResult<Json<Value>> {
    state.genres.delete(id).await?;
    Ok(deleted("Genre deleted"))
}

// ---- movies ---------------------------------------------------------------

pub async fn list_movies(State(state): State<Arc<AppState>>) -> AppResult<Json<Value>> {
    let movies = state.movies.list().await?;
    Ok(Json(json!({ "movies": movies })))
}

pub async fn get_movie(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> AppResult<Json<MovieRecord>> {
    Ok(Json(state.movies.get_by_id(id).await?))
}

pub async fn create_movie(
    State(state): State<Arc<AppState>>,
    ValidatedJson(payload): ValidatedJson<MoviePayload>,
) -> AppResult<Created> {
    let movie = state.movies.create(payload).await?;
    created("Movie created", "movie", movie)
}

pub async fn update_movie(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
    ValidatedJson(changes): ValidatedJson<MovieUpdate>,
) -> AppResult<Json<MovieRecord>> {
    Ok(Json(state.movies.update(id, changes).await?))
}

pub async fn delete_movie(State(state): State<Arc<AppState>>, Id(id): Id) -> AppResult<Json<Value>> {
    state.movies.delete(id).await?;
    Ok(deleted("Movie deleted"))
}
