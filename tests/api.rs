//! HTTP API tests driven through the router with `oneshot`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

mod support;

use axum::http::{Method, StatusCode};
use reelhouse::models::NamePayload;
use serde_json::json;
use support::{app, send, signup};

#[tokio::test]
async fn adding_a_review_requires_a_session() {
    let (app, state) = app().await;
    let movie = support::seed_movie(&state, "Parasite", 8.6, "").await;

    let resp = send(
        &app,
        Method::POST,
        "/reviews/add",
        Some(json!({ "movieId": movie.id, "user": "Rina", "rating": 9, "text": "Great" })),
        None,
    )
    .await;

    assert_eq!(resp.status, StatusCode::UNAUTHORIZED);
    assert_eq!(resp.body["success"], false);
    assert!(state.reviews.list_for_movie(movie.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn review_lifecycle_with_session() {
    let (app, state) = app().await;
    let movie = support::seed_movie(&state, "Parasite", 8.6, "").await;
    let rina = signup(&app, "Rina", "rina@example.com").await;
    let other = signup(&app, "Jun", "jun@example.com").await;

    let created = send(
        &app,
        Method::POST,
        "/reviews/add",
        Some(json!({ "movieId": movie.id.to_string(), "user": "Rina", "rating": "9", "text": "Great" })),
        Some(&rina),
    )
    .await;
    assert_eq!(created.status, StatusCode::CREATED, "{}", created.body);
    assert_eq!(created.body["author"], "Rina");
    assert_eq!(created.body["date"].as_str().unwrap().len(), 10);

    let detail = send(&app, Method::GET, &format!("/landing/movies/{}", movie.id), None, None).await;
    assert_eq!(detail.status, StatusCode::OK);
    assert_eq!(detail.body["reviews"].as_array().unwrap().len(), 1);
    assert_eq!(detail.body["reviews"][0]["movieId"], movie.id);

    let review_id = created.body["id"].as_i64().unwrap();
    let forbidden =
        send(&app, Method::DELETE, &format!("/reviews/{review_id}"), None, Some(&other)).await;
    assert_eq!(forbidden.status, StatusCode::FORBIDDEN);

    let deleted =
        send(&app, Method::DELETE, &format!("/reviews/{review_id}"), None, Some(&rina)).await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert!(state.reviews.list_for_movie(movie.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn review_for_unknown_movie_is_not_found() {
    let (app, _state) = app().await;
    let cookie = signup(&app, "Rina", "rina@example.com").await;

    let resp = send(
        &app,
        Method::POST,
        "/reviews/add",
        Some(json!({ "movieId": 99, "user": "Rina", "rating": 5, "text": "?" })),
        Some(&cookie),
    )
    .await;
    assert_eq!(resp.status, StatusCode::NOT_FOUND);
    assert_eq!(resp.body["error"], "Movie not found");
}

#[tokio::test]
async fn signup_login_check_auth_and_logout() {
    let (app, _state) = app().await;

    let anonymous = send(&app, Method::GET, "/api/auth/check-auth", None, None).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
    assert_eq!(anonymous.body["success"], false);

    let cookie = signup(&app, "Rina", "Rina@Example.com").await;
    assert!(cookie.starts_with("token="));

    let me = send(&app, Method::GET, "/api/auth/check-auth", None, Some(&cookie)).await;
    assert_eq!(me.status, StatusCode::OK);
    assert_eq!(me.body["success"], true);
    assert_eq!(me.body["user"]["email"], "rina@example.com");

    let login = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": "rina@example.com", "password": "secret123" })),
        None,
    )
    .await;
    assert_eq!(login.status, StatusCode::OK);
    let second = login.cookie.expect("login sets a cookie");

    let logout = send(&app, Method::POST, "/api/auth/logout", None, Some(&second)).await;
    assert_eq!(logout.status, StatusCode::OK);
    let after = send(&app, Method::GET, "/api/auth/check-auth", None, Some(&second)).await;
    assert_eq!(after.status, StatusCode::UNAUTHORIZED);

    // The signup session is independent of the one just closed.
    let still = send(&app, Method::GET, "/api/auth/check-auth", None, Some(&cookie)).await;
    assert_eq!(still.status, StatusCode::OK);
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let (app, _state) = app().await;
    signup(&app, "Rina", "rina@example.com").await;

    let resp = send(
        &app,
        Method::POST,
        "/api/auth/login",
        Some(json!({ "email": "rina@example.com", "password": "not-it" })),
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert_eq!(resp.body["error"], "Invalid credentials");
    assert!(resp.cookie.is_none());
}

#[tokio::test]
async fn duplicate_signup_conflicts() {
    let (app, _state) = app().await;
    signup(&app, "Rina", "rina@example.com").await;

    let resp = send(
        &app,
        Method::POST,
        "/api/auth/signup",
        Some(json!({ "name": "Rina", "email": "rina@example.com", "password": "secret123" })),
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_country_name_conflicts() {
    let (app, _state) = app().await;

    let first =
        send(&app, Method::POST, "/api/countries", Some(json!({ "name": "France" })), None).await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["country"]["name"], "France");
    assert!(first.body["message"].is_string());

    let second =
        send(&app, Method::POST, "/api/countries", Some(json!({ "name": "France" })), None).await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let list = send(&app, Method::GET, "/api/countries", None, None).await;
    assert_eq!(list.body["countries"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_bodies_report_fields() {
    let (app, _state) = app().await;

    let resp = send(
        &app,
        Method::POST,
        "/api/movies",
        Some(json!({
            "title": "Old",
            "year": 1500,
            "rating": 5.0,
            "status": "Completed",
            "poster": "uploads/old.png",
        })),
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body["fields"]["year"].is_string(), "{}", resp.body);

    let malformed = send(&app, Method::POST, "/api/genres", Some(json!({ "name": 7 })), None).await;
    assert_eq!(malformed.status, StatusCode::BAD_REQUEST);
    assert!(malformed.body["error"].is_string());

    let bad_id = send(&app, Method::GET, "/api/genres/abc", None, None).await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert!(bad_id.body["fields"]["id"].is_string());
}

#[tokio::test]
async fn movie_with_unknown_genre_is_not_created() {
    let (app, state) = app().await;

    let resp = send(
        &app,
        Method::POST,
        "/api/movies",
        Some(json!({
            "title": "Ghost",
            "year": 2021,
            "rating": 7.0,
            "status": "Ongoing",
            "poster": "https://cdn.example.com/ghost.png",
            "genres": [41],
        })),
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::BAD_REQUEST);
    assert!(resp.body["fields"]["genres"].is_string());
    assert!(state.movies.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn deleting_a_genre_keeps_its_movies() {
    let (app, state) = app().await;
    let genre = state.genres.create(NamePayload { name: "Thriller".into() }).await.unwrap();
    let mut payload = support::movie("Memories of Murder", 8.1, "");
    payload.genres = vec![genre.id];
    let movie = state.movies.create(payload).await.unwrap();

    let resp = send(&app, Method::DELETE, &format!("/api/genres/{}", genre.id), None, None).await;
    assert_eq!(resp.status, StatusCode::OK);

    let fetched = send(&app, Method::GET, &format!("/api/movies/{}", movie.id), None, None).await;
    assert_eq!(fetched.status, StatusCode::OK);
    assert_eq!(fetched.body["genres"], json!([]));
}

#[tokio::test]
async fn landing_lists_and_detail() {
    let (app, state) = app().await;
    let quiet = support::seed_movie(&state, "Quiet", 9.5, "").await;
    let loud = support::seed_movie(&state, "Loud", 6.0, "https://youtu.be/dQw4w9WgXcQ").await;
    let user = state.users.create("Rina", "rina@example.com", "x").await.unwrap();
    for n in 0..2 {
        state
            .reviews
            .create(
                reelhouse::models::ReviewPayload {
                    movie_id: loud.id,
                    user: "Rina".into(),
                    rating: 7,
                    text: format!("take {n}"),
                },
                Some(user.id),
            )
            .await
            .unwrap();
    }

    let popular = send(&app, Method::GET, "/landing/movies/popular", None, None).await;
    assert_eq!(popular.body[0]["id"], loud.id);

    let top_rated = send(&app, Method::GET, "/landing/movies/top_rated", None, None).await;
    assert_eq!(top_rated.body[0]["id"], quiet.id);

    let top = send(&app, Method::GET, "/landing/movies/top_movie", None, None).await;
    let ids: Vec<_> = top.body.as_array().unwrap().iter().map(|m| m["id"].clone()).collect();
    assert_eq!(ids, vec![json!(loud.id)]);

    let detail = send(&app, Method::GET, &format!("/landing/movies/{}", quiet.id), None, None).await;
    assert_eq!(detail.body["title"], "Quiet");
    assert_eq!(detail.body["synopsis"], "Quiet synopsis");

    let missing = send(&app, Method::GET, "/landing/movies/999", None, None).await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn concurrent_duplicate_countries_yield_one_conflict() {
    let (app, state) = app().await;
    let body = json!({ "name": "France" });

    let (a, b) = tokio::join!(
        send(&app, Method::POST, "/api/countries", Some(body.clone()), None),
        send(&app, Method::POST, "/api/countries", Some(body), None),
    );

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT], "{} / {}", a.body, b.body);
    assert_eq!(state.countries.list().await.unwrap().len(), 1);
}

#[tokio::test]
async fn concurrent_duplicate_signups_yield_one_conflict() {
    let (app, _state) = app().await;
    let body = json!({ "name": "Rina", "email": "rina@example.com", "password": "secret123" });

    let (a, b) = tokio::join!(
        send(&app, Method::POST, "/api/auth/signup", Some(body.clone()), None),
        send(&app, Method::POST, "/api/auth/signup", Some(body), None),
    );

    let mut statuses = [a.status, b.status];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::CONFLICT]);
}

#[tokio::test]
async fn uploaded_images_are_served_back() {
    let (app, _state) = app().await;
    let image = b"\x89PNG\r\n\x1a\nnot really a png".to_vec();
    let (content_type, body) = support::multipart_file("Poster.PNG", &image);

    let (status, raw) =
        support::send_raw(&app, Method::POST, "/api/uploads", Some(&content_type), body).await;
    assert_eq!(status, StatusCode::CREATED);
    let uploaded: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    let path = uploaded["path"].as_str().unwrap();
    assert!(path.starts_with("uploads/") && path.ends_with(".png"), "{path}");

    let (status, served) =
        support::send_raw(&app, Method::GET, &format!("/{path}"), None, Vec::new()).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, image);
}

#[tokio::test]
async fn uploads_reject_non_images_and_empty_files() {
    let (app, _state) = app().await;

    let (content_type, body) = support::multipart_file("notes.txt", b"hello");
    let (status, raw) =
        support::send_raw(&app, Method::POST, "/api/uploads", Some(&content_type), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let error: serde_json::Value = serde_json::from_slice(&raw).unwrap();
    assert!(error["fields"]["file"].is_string());

    let (content_type, body) = support::multipart_file("blank.jpg", b"");
    let (status, _) =
        support::send_raw(&app, Method::POST, "/api/uploads", Some(&content_type), body).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn auth_endpoints_are_rate_limited() {
    let config = reelhouse::config::Config { auth_rps: 1, ..support::test_config() };
    let app = reelhouse::router(support::state_with(config).await);
    let credentials = json!({ "email": "nobody@example.com", "password": "whatever" });

    let first = send(&app, Method::POST, "/api/auth/login", Some(credentials.clone()), None).await;
    assert_eq!(first.status, StatusCode::BAD_REQUEST);

    let second = send(&app, Method::POST, "/api/auth/login", Some(credentials), None).await;
    assert_eq!(second.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(second.body["error"], "Too many requests");
}
