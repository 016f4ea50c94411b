//! Wire types shared by the HTTP handlers and the API client.

use serde::{Deserialize, Deserializer, Serialize, de};
use validator::{Validate, ValidationError};

pub use crate::entities::movie::MovieStatus;

// ---- requests -------------------------------------------------------------

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct NamePayload {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct ActorPayload {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "media_path"))]
    pub photo: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct ActorUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "media_path"))]
    pub photo: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct MoviePayload {
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub title: String,
    #[serde(default)]
    pub synopsis: String,
    #[validate(range(min = 1888, max = 2100))]
    pub year: i32,
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: f64,
    pub status: MovieStatus,
    #[validate(custom(function = "media_path"))]
    pub poster: String,
    #[serde(default)]
    #[validate(custom(function = "optional_url"))]
    pub trailer: String,
    #[serde(default)]
    pub genres: Vec<i32>,
    #[serde(default)]
    pub countries: Vec<i32>,
    #[serde(default)]
    pub actors: Vec<i32>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize, Validate)]
pub struct MovieUpdate {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255), custom(function = "not_blank"))]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub synopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 1888, max = 2100))]
    pub year: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(range(min = 0.0, max = 10.0))]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<MovieStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "media_path"))]
    pub poster: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(custom(function = "optional_url"))]
    pub trailer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genres: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub countries: Option<Vec<i32>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actors: Option<Vec<i32>>,
}

/// Review form body. The browser form posts `movieId` and `rating` as
/// strings, so both accept either representation.
#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ReviewPayload {
    #[serde(deserialize_with = "int_or_string")]
    pub movie_id: i32,
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub user: String,
    #[serde(deserialize_with = "int_or_string")]
    #[validate(range(min = 1, max = 10))]
    pub rating: i32,
    #[validate(length(max = 5000), custom(function = "not_blank"))]
    pub text: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct SignupPayload {
    #[validate(length(max = 100), custom(function = "not_blank"))]
    pub name: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 6, max = 128))]
    pub password: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, Validate)]
pub struct LoginPayload {
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 1))]
    pub password: String,
}

// ---- responses ------------------------------------------------------------

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct ActorRecord {
    pub id: i32,
    pub name: String,
    pub photo: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct CountryRecord {
    pub id: i32,
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct GenreRecord {
    pub id: i32,
    pub name: String,
}

/// A movie as the CMS edits it: scalar fields plus association ids.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MovieRecord {
    pub id: i32,
    pub title: String,
    pub synopsis: String,
    pub year: i32,
    pub rating: f64,
    pub status: MovieStatus,
    pub poster: String,
    pub trailer: String,
    pub genres: Vec<i32>,
    pub countries: Vec<i32>,
    pub actors: Vec<i32>,
}

/// A movie as the landing lists show it.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MovieCard {
    pub id: i32,
    pub title: String,
    pub poster: String,
    pub year: i32,
    pub rating: f64,
    pub status: MovieStatus,
    pub trailer: String,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
pub struct MovieDetail {
    pub id: i32,
    pub title: String,
    pub synopsis: String,
    pub poster: String,
    pub year: i32,
    pub rating: f64,
    pub status: MovieStatus,
    pub trailer: String,
    pub genres: Vec<String>,
    pub countries: Vec<String>,
    pub actors: Vec<ActorRecord>,
    pub reviews: Vec<ReviewView>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewView {
    pub id: i32,
    pub movie_id: i32,
    pub author: String,
    pub rating: i32,
    pub content: String,
    pub date: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionUser {
    pub id: i32,
    pub name: String,
    pub email: String,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct AuthStatus {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<SessionUser>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct UploadResponse {
    pub path: String,
}

// ---- validation helpers ---------------------------------------------------

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank").with_message("must not be empty".into()));
    }
    Ok(())
}

/// Posters and photos are either an uploaded file or an absolute URL.
fn media_path(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.starts_with("uploads/") || is_http_url(value) {
        return Ok(());
    }
    Err(ValidationError::new("media_path")
        .with_message("must be an uploads/ path or an http(s) URL".into()))
}

fn optional_url(value: &str) -> Result<(), ValidationError> {
    let value = value.trim();
    if value.is_empty() || is_http_url(value) {
        return Ok(());
    }
    Err(ValidationError::new("url").with_message("must be an http(s) URL".into()))
}

fn is_http_url(value: &str) -> bool {
    value.starts_with("https://") || value.starts_with("http://")
}

fn int_or_string<'de, D>(deserializer: D) -> Result<i32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Int(i32),
        Text(String),
    }

    match Repr::deserialize(deserializer)? {
        Repr::Int(n) => Ok(n),
        Repr::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("expected a number, got {s:?}"))),
    }
}
