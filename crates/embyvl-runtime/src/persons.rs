use std::sync::Arc;

use futures::future::join_all;
use tokio::sync::Mutex;

use embyvl_api::AdminApi;
use embyvl_core::persons::{PersonName, PersonNameCache};

use crate::notify::StateVersion;

/// Resolves person ids to display names, at most one request per id.
pub struct PersonNameResolver<A> {
    api: Arc<A>,
    cache: Mutex<PersonNameCache>,
    version: Arc<StateVersion>,
}

impl<A: AdminApi> PersonNameResolver<A> {
    pub(crate) fn new(api: Arc<A>, version: Arc<StateVersion>) -> Self {
        Self {
            api,
            cache: Mutex::new(PersonNameCache::new()),
            version,
        }
    }

    /// Look up `person_id` unless it is empty or already cached (pending included).
    ///
    /// The pending entry is written before the request goes out, so concurrent
    /// callers for the same id return immediately. Failures settle as unknown
    /// and are not retried.
    pub async fn resolve(&self, person_id: &str) {
        if !self.cache.lock().await.claim(person_id) {
            return;
        }
        self.version.bump();

        let name = match self.api.resolve_item(person_id).await {
            Ok(item) => Some(item.name),
            Err(e) => {
                tracing::warn!(person_id, "failed to resolve person name: {e}");
                None
            }
        };

        self.cache.lock().await.settle(person_id, name);
        self.version.bump();
    }

    /// Resolve several ids concurrently and wait for all of them.
    pub async fn resolve_all<'a, I>(&self, person_ids: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        join_all(person_ids.into_iter().map(|id| self.resolve(id))).await;
    }

    pub async fn get(&self, person_id: &str) -> Option<PersonName> {
        self.cache.lock().await.get(person_id).cloned()
    }

    /// Display label for a person id, if a lookup was ever started.
    pub async fn label(&self, person_id: &str) -> Option<String> {
        self.cache.lock().await.label(person_id).map(str::to_string)
    }
}
