use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode};
use axum_extra::extract::CookieJar;

use crate::{
    AppState,
    auth::{self, AuthUser, SESSION_COOKIE},
    error::{AppError, AppResult},
    extract::ValidatedJson,
    models::{AuthStatus, LoginPayload, SignupPayload},
};

pub async fn signup(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<SignupPayload>,
) -> AppResult<(StatusCode, CookieJar, Json<AuthStatus>)> {
    throttle(&state)?;

    let hash = auth::hash_password(&payload.password)?;
    let user = state.users.create(&payload.name, &payload.email, &hash).await?;
    let token = state.users.create_session(user.id, state.config.session_ttl_seconds()).await?;

    let jar = jar.add(auth::session_cookie(token, &state.config));
    Ok((StatusCode::CREATED, jar, Json(AuthStatus { success: true, user: Some(user.into()) })))
}

pub async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> AppResult<(CookieJar, Json<AuthStatus>)> {
    throttle(&state)?;

    let user = match state.users.find_by_email(&payload.email).await? {
        Some(user) if auth::verify_password(&payload.password, &user.password_hash) => user,
        _ => {
            tracing::debug!("login rejected");
            return Err(AppError::invalid_body("Invalid credentials"));
        },
    };

    let user = state.users.touch_last_login(user).await?;
    let token = state.users.create_session(user.id, state.config.session_ttl_seconds()).await?;
    tracing::info!(user_id = user.id, "logged in");

    let jar = jar.add(auth::session_cookie(token, &state.config));
    Ok((jar, Json(AuthStatus { success: true, user: Some(user.into()) })))
}

pub async fn logout(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
) -> AppResult<(CookieJar, Json<AuthStatus>)> {
    if let Some(token) = jar.get(SESSION_COOKIE).map(|c| c.value().to_string()) {
        state.users.delete_session(&token).await?;
    }
    let jar = jar.remove(auth::expired_session_cookie());
    Ok((jar, Json(AuthStatus { success: true, user: None })))
}

pub async fn check_auth(AuthUser(user): AuthUser) -> Json<AuthStatus> {
    Json(AuthStatus { success: true, user: Some(user.into()) })
}

fn throttle(state: &AppState) -> AppResult<()> {
    state.auth_limiter.check().map_err(|_| AppError::RateLimited)
}
