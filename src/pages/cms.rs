use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    client::{ClientResult, CmsClient, Resource},
    pages::{LoadState, Mount},
};

#[derive(Clone, Debug)]
pub struct CmsListState<R> {
    pub items: LoadState<Vec<R>>,
    pub query: String,
    pub error: Option<String>,
}

impl<R> Default for CmsListState<R> {
    fn default() -> Self {
        Self { items: LoadState::Loading, query: String::new(), error: None }
    }
}

/// Rows whose display name contains `query`. Case-sensitive; an empty query
/// keeps everything.
pub fn filter_by_name<'a, R: Resource>(items: &'a [R], query: &str) -> Vec<&'a R> {
    items.iter().filter(|item| item.display_name().contains(query)).collect()
}

/// List screen for one CMS resource: search box, create/edit form, delete
/// buttons.
#[derive(Debug)]
pub struct CmsListPage<R> {
    client: CmsClient<R>,
    state: Arc<watch::Sender<CmsListState<R>>>,
}

impl<R> Clone for CmsListPage<R> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), state: self.state.clone() }
    }
}

impl<R: Resource> CmsListPage<R> {
    pub fn new(client: CmsClient<R>) -> Self {
        Self { client, state: Arc::new(watch::Sender::new(CmsListState::default())) }
    }

    pub fn subscribe(&self) -> watch::Receiver<CmsListState<R>> {
        self.state.subscribe()
    }

    pub fn snapshot(&self) -> CmsListState<R> {
        self.state.borrow().clone()
    }

    pub fn mount(&self) -> Mount {
        let page = self.clone();
        Mount::spawn(async move { page.refresh().await })
    }

    pub async fn refresh(&self) {
        let items = match self.client.list().await {
            Ok(items) => LoadState::Loaded(items),
            Err(err) => {
                tracing::error!(resource = R::LIST_KEY, error = %err, "failed to list");
                LoadState::Failed(err.to_string())
            },
        };
        self.state.send_modify(|s| s.items = items);
    }

    pub fn set_query(&self, query: impl Into<String>) {
        let query = query.into();
        self.state.send_modify(|s| s.query = query);
    }

    /// The rows matching the current search query.
    pub fn visible(&self) -> Vec<R> {
        let state = self.state.borrow();
        match &state.items {
            LoadState::Loaded(items) => {
                filter_by_name(items, &state.query).into_iter().cloned().collect()
            },
            _ => Vec::new(),
        }
    }

    pub async fn create(&self, draft: &R::Draft) -> ClientResult<R> {
        let created = self.record(self.client.create(draft).await)?;
        self.refresh().await;
        Ok(created)
    }

    pub async fn update(&self, id: i32, changes: &R::Changes) -> ClientResult<R> {
        let updated = self.record(self.client.update(id, changes).await)?;
        self.refresh().await;
        Ok(updated)
    }

    /// Deletes on the server, then drops the row locally without a refetch.
    pub async fn delete(&self, id: i32) -> ClientResult<()> {
        self.record(self.client.delete(id).await)?;
        self.state.send_modify(|s| {
            if let LoadState::Loaded(items) = &mut s.items {
                items.retain(|item| item.id() != id);
            }
        });
        Ok(())
    }

    fn record<T>(&self, result: ClientResult<T>) -> ClientResult<T> {
        let error = result.as_ref().err().map(ToString::to_string);
        self.state.send_modify(|s| s.error = error);
        result
    }
}
