use std::sync::Arc;

use axum::{Json, extract::State};

use crate::{
    AppState,
    error::AppResult,
    extract::Id,
    models::{MovieCard, MovieDetail},
};

const LIST_LIMIT: u64 = 20;
const HERO_LIMIT: u64 = 5;

pub async fn popular(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MovieCard>>> {
    Ok(Json(state.movies.popular(LIST_LIMIT).await?))
}

pub async fn top_rated(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MovieCard>>> {
    Ok(Json(state.movies.top_rated(LIST_LIMIT).await?))
}

pub async fn upcoming(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MovieCard>>> {
    let current_year = i32::from(jiff::Zoned::now().year());
    Ok(Json(state.movies.upcoming(LIST_LIMIT, current_year).await?))
}

pub async fn top_movie(State(state): State<Arc<AppState>>) -> AppResult<Json<Vec<MovieCard>>> {
    Ok(Json(state.movies.top_movies(HERO_LIMIT).await?))
}

pub async fn detail(
    State(state): State<Arc<AppState>>,
    Id(id): Id,
) -> AppResult<Json<MovieDetail>> {
    Ok(Json(state.movies.detail(id).await?))
}
