use std::marker::PhantomData;

use serde::{Serialize, de::DeserializeOwned};
use serde_json::Value;

use crate::{
    client::{ApiClient, ClientError, ClientResult},
    models::{
        ActorPayload, ActorRecord, ActorUpdate, CountryRecord, GenreRecord, MoviePayload,
        MovieRecord, MovieUpdate, NamePayload,
    },
};

/// A CMS-managed entity and the shape of its endpoints.
pub trait Resource: DeserializeOwned + Clone + Send + Sync + 'static {
    /// Body of a create request.
    type Draft: Serialize + Send + Sync;
    /// Body of an update request.
    type Changes: Serialize + Send + Sync;

    const PATH: &'static str;
    /// Key wrapping the array in list responses.
    const LIST_KEY: &'static str;
    /// Key wrapping the record in create responses.
    const ITEM_KEY: &'static str;

    fn id(&self) -> i32;
    fn display_name(&self) -> &str;
}

impl Resource for ActorRecord {
    type Draft = ActorPayload;
    type Changes = ActorUpdate;

    const PATH: &'static str = "/api/actors";
    const LIST_KEY: &'static str = "actors";
    const ITEM_KEY: &'static str = "actor";

    fn id(&self) -> i32 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Resource for CountryRecord {
    type Draft = NamePayload;
    type Changes = NamePayload;

    const PATH: &'static str = "/api/countries";
    const LIST_KEY: &'static str = "countries";
    const ITEM_KEY: &'static str = "country";

    fn id(&self) -> i32 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Resource for GenreRecord {
    type Draft = NamePayload;
    type Changes = NamePayload;

    const PATH: &'static str = "/api/genres";
    const LIST_KEY: &'static str = "genres";
    const ITEM_KEY: &'static str = "genre";

    fn id(&self) -> i32 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Resource for MovieRecord {
    type Draft = MoviePayload;
    type Changes = MovieUpdate;

    const PATH: &'static str = "/api/movies";
    const LIST_KEY: &'static str = "movies";
    const ITEM_KEY: &'static str = "movie";

    fn id(&self) -> i32 {
        self.id
    }

    fn display_name(&self) -> &str {
        &self.title
    }
}

#[derive(Debug)]
pub struct CmsClient<R> {
    api: ApiClient,
    _resource: PhantomData<fn() -> R>,
}

impl<R> Clone for CmsClient<R> {
    fn clone(&self) -> Self {
        Self { api: self.api.clone(), _resource: PhantomData }
    }
}

impl<R: Resource> CmsClient<R> {
    pub fn new(api: ApiClient) -> Self {
        Self { api, _resource: PhantomData }
    }

    pub async fn list(&self) -> ClientResult<Vec<R>> {
        let body: Value = self.api.get(R::PATH).await?;
        take_key(body, R::LIST_KEY)
    }

    pub async fn create(&self, draft: &R::Draft) -> ClientResult<R> {
        let body: Value = self.api.post(R::PATH, draft).await?;
        take_key(body, R::ITEM_KEY)
    }

    pub async fn update(&self, id: i32, changes: &R::Changes) -> ClientResult<R> {
        self.api.put(&format!("{}/{id}", R::PATH), changes).await
    }

    pub async fn delete(&self, id: i32) -> ClientResult<()> {
        let _: Value = self.api.delete(&format!("{}/{id}", R::PATH)).await?;
        Ok(())
    }
}

fn take_key<T: DeserializeOwned>(mut body: Value, key: &str) -> ClientResult<T> {
    match body.get_mut(key) {
        Some(inner) => Ok(serde_json::from_value(inner.take())?),
        None => Err(ClientError::Decode(serde::de::Error::custom(format!("missing `{key}` field")))),
    }
}
