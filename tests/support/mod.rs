#![allow(dead_code, clippy::unwrap_used, clippy::expect_used)]

use std::{
    path::PathBuf,
    sync::{Arc, Mutex},
};

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    http::{Method, StatusCode, header},
    middleware::{self, Next},
    response::Response,
};
use reelhouse::{
    AppState,
    config::Config,
    db,
    models::{MoviePayload, MovieRecord, MovieStatus},
};
use sea_orm::ConnectOptions;
use serde_json::Value;
use tower::ServiceExt;

pub fn test_config() -> Config {
    Config {
        addr: "127.0.0.1:0".parse().unwrap(),
        database_url: "sqlite::memory:".to_string(),
        db_max_connections: 1,
        public_origin: "http://localhost:5000".to_string(),
        client_origin: "http://localhost:5173".to_string(),
        upload_dir: upload_dir(),
        session_ttl_days: 1,
        cookie_secure: false,
        auth_rps: 1000,
    }
}

fn upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("reelhouse-test-{}", uuid::Uuid::new_v4().simple()))
}

pub async fn state() -> Arc<AppState> {
    state_with(test_config()).await
}

pub async fn state_with(config: Config) -> Arc<AppState> {
    let mut opts = ConnectOptions::new(config.database_url.clone());
    opts.max_connections(1).min_connections(1).sqlx_logging(false);
    let db = db::connect_and_migrate(opts).await.expect("in-memory database");
    Arc::new(AppState::new(Arc::new(config), db))
}

pub async fn app() -> (Router, Arc<AppState>) {
    let state = state().await;
    (reelhouse::router(state.clone()), state)
}

pub struct TestResponse {
    pub status: StatusCode,
    pub cookie: Option<String>,
    pub body: Value,
}

/// Drives one request through the router. `cookie` is a raw `name=value`.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    cookie: Option<&str>,
) -> TestResponse {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    let req = match body {
        Some(body) => req
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => req.body(Body::empty()).unwrap(),
    };

    let resp = app.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let cookie = resp
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    TestResponse { status, cookie, body }
}

/// Sends a raw body and returns the status and the undecoded response body.
pub async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: Vec<u8>,
) -> (StatusCode, Vec<u8>) {
    let mut req = axum::http::Request::builder().method(method).uri(uri);
    if let Some(content_type) = content_type {
        req = req.header(header::CONTENT_TYPE, content_type);
    }
    let resp = app.clone().oneshot(req.body(Body::from(body)).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, bytes.to_vec())
}

const BOUNDARY: &str = "reelhouse-test-boundary";

/// A `multipart/form-data` body with a single `file` part. Returns the
/// content type and the encoded body.
pub fn multipart_file(file_name: &str, bytes: &[u8]) -> (String, Vec<u8>) {
    let mut body = format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
         Content-Type: application/octet-stream\r\n\r\n"
    )
    .into_bytes();
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    (format!("multipart/form-data; boundary={BOUNDARY}"), body)
}

pub async fn signup(app: &Router, name: &str, email: &str) -> String {
    let resp = send(
        app,
        Method::POST,
        "/api/auth/signup",
        Some(serde_json::json!({ "name": name, "email": email, "password": "secret123" })),
        None,
    )
    .await;
    assert_eq!(resp.status, StatusCode::CREATED, "{}", resp.body);
    resp.cookie.expect("session cookie")
}

pub fn movie(title: &str, rating: f64, trailer: &str) -> MoviePayload {
    MoviePayload {
        title: title.to_string(),
        synopsis: format!("{title} synopsis"),
        year: 2020,
        rating,
        status: MovieStatus::Completed,
        poster: format!("uploads/{}.png", title.to_lowercase().replace(' ', "-")),
        trailer: trailer.to_string(),
        genres: vec![],
        countries: vec![],
        actors: vec![],
    }
}

pub async fn seed_movie(state: &AppState, title: &str, rating: f64, trailer: &str) -> MovieRecord {
    state.movies.create(movie(title, rating, trailer)).await.unwrap()
}

/// Serves `router` on an ephemeral port and returns its base URL.
pub async fn spawn(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{addr}")
}

#[derive(Clone, Debug, PartialEq)]
pub struct Recorded {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// Captures every request reaching the wrapped router.
#[derive(Clone, Debug, Default)]
pub struct Recorder(Arc<Mutex<Vec<Recorded>>>);

impl Recorder {
    pub fn requests(&self) -> Vec<Recorded> {
        self.0.lock().unwrap().clone()
    }

    pub fn matching(&self, method: &Method, path: &str) -> Vec<Recorded> {
        self.requests().into_iter().filter(|r| r.method == *method && r.path == path).collect()
    }

    pub fn clear(&self) {
        self.0.lock().unwrap().clear();
    }
}

async fn record(State(recorder): State<Recorder>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    recorder.0.lock().unwrap().push(Recorded {
        method: parts.method.clone(),
        path: parts.uri.path().to_string(),
        body: serde_json::from_slice(&bytes).ok(),
    });
    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

/// The real application on a live port, with request recording.
pub async fn spawn_recorded() -> (String, Recorder, Arc<AppState>) {
    let state = state().await;
    let recorder = Recorder::default();
    let router = reelhouse::router(state.clone())
        .layer(middleware::from_fn_with_state(recorder.clone(), record));
    (spawn(router).await, recorder, state)
}
