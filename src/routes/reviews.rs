use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use serde_json::{Value, json};

use crate::{
    AppState,
    auth::AuthUser,
    error::AppResult,
    extract::{Id, ValidatedJson},
    models::{ReviewPayload, ReviewView},
};

pub async fn add(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    ValidatedJson(payload): ValidatedJson<ReviewPayload>,
) -> AppResult<(StatusCode, Json<ReviewView>)> {
    let review = state.reviews.create(payload, Some(user.id)).await?;
    Ok((StatusCode::CREATED, Json(review)))
}

pub async fn delete(
    State(state): State<Arc<AppState>>,
    AuthUser(user): AuthUser,
    Id(id): Id,
) -> AppResult<Json<Value>> {
    state.reviews.delete_owned(id, user.id).await?;
    Ok(Json(json!({ "message": "Review deleted" })))
}
