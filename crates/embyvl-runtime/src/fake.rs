//! In-memory admin backend for store tests.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::Notify;

use embyvl_api::types::{CoverRequest, CoverResponse, ResolvedItem};
use embyvl_api::{AdminApi, ApiError};
use embyvl_core::models::{
    AdvancedFilter, Classifications, LibraryDescriptor, ProxyConfig, ResourceDescriptor,
    VirtualLibrary,
};

#[derive(Default)]
struct FakeState {
    config: ProxyConfig,
    classifications: Classifications,
    listing: Vec<LibraryDescriptor>,
    persons: HashMap<String, String>,
    cover_response: CoverResponse,
    failing: HashMap<String, Option<String>>,
    config_gate: Option<Arc<Notify>>,
    calls: Vec<String>,
    next_id: u32,
}

pub(crate) struct FakeAdmin {
    state: Mutex<FakeState>,
}

impl FakeAdmin {
    pub(crate) fn new() -> Self {
        Self {
            state: Mutex::new(FakeState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub(crate) fn set_config(&self, config: ProxyConfig) {
        self.lock().config = config;
    }

    pub(crate) fn update_config(&self, f: impl FnOnce(&mut ProxyConfig)) {
        f(&mut self.lock().config);
    }

    pub(crate) fn config(&self) -> ProxyConfig {
        self.lock().config.clone()
    }

    pub(crate) fn set_listing(&self, ids: &[&str]) {
        self.lock().listing = ids.iter().map(|id| LibraryDescriptor::new(*id)).collect();
    }

    pub(crate) fn set_classifications(&self, classifications: Classifications) {
        self.lock().classifications = classifications;
    }

    pub(crate) fn set_person(&self, id: &str, name: &str) {
        self.lock().persons.insert(id.into(), name.into());
    }

    pub(crate) fn set_cover_response(&self, response: CoverResponse) {
        self.lock().cover_response = response;
    }

    /// Make every call to `endpoint` fail with the given `detail`.
    pub(crate) fn fail(&self, endpoint: &str, detail: Option<&str>) {
        self.lock()
            .failing
            .insert(endpoint.into(), detail.map(str::to_string));
    }

    pub(crate) fn recover(&self, endpoint: &str) {
        self.lock().failing.remove(endpoint);
    }

    /// The next `get_config` answers with the config as of the call, but only once released.
    pub(crate) fn hold_next_config(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.lock().config_gate = Some(gate.clone());
        gate
    }

    pub(crate) fn count(&self, call: &str) -> usize {
        self.lock().calls.iter().filter(|c| *c == call).count()
    }

    pub(crate) fn total_calls(&self) -> usize {
        self.lock().calls.len()
    }

    pub(crate) fn calls(&self) -> Vec<String> {
        self.lock().calls.clone()
    }

    /// Record a call under `name`, failing it if the endpoint was marked, otherwise run `f`.
    fn call<T>(
        &self,
        endpoint: &str,
        name: String,
        f: impl FnOnce(&mut FakeState) -> T,
    ) -> Result<T, ApiError> {
        let mut state = self.lock();
        state.calls.push(name);
        if let Some(detail) = state.failing.get(endpoint) {
            return Err(ApiError::Api {
                status: 500,
                detail: detail.clone(),
                message: format!("{endpoint} failed"),
            });
        }
        Ok(f(&mut state))
    }
}

impl AdminApi for FakeAdmin {
    async fn get_config(&self) -> Result<ProxyConfig, ApiError> {
        let result = self.call("get_config", "get_config".into(), |s| s.config.clone());
        let gate = self.lock().config_gate.take();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        tokio::task::yield_now().await;
        result
    }

    async fn update_config(&self, config: &ProxyConfig) -> Result<ProxyConfig, ApiError> {
        let result = self.call("update_config", "update_config".into(), |s| {
            s.config = config.clone();
            s.config.clone()
        });
        tokio::task::yield_now().await;
        result
    }

    async fn restart_proxy(&self) -> Result<(), ApiError> {
        let result = self.call("restart_proxy", "restart_proxy".into(), |_| ());
        tokio::task::yield_now().await;
        result
    }

    async fn create_library(&self, library: &VirtualLibrary) -> Result<VirtualLibrary, ApiError> {
        let result = self.call("create_library", "create_library".into(), |s| {
            s.next_id += 1;
            let mut created = library.clone();
            let id = format!("vl-{}", s.next_id);
            created.id = Some(id.clone());
            s.config.library.push(created.clone());
            let mut descriptor = LibraryDescriptor::new(id);
            descriptor.name = Some(created.name.clone());
            descriptor.kind = Some("virtual".into());
            s.listing.push(descriptor);
            created
        });
        tokio::task::yield_now().await;
        result
    }

    async fn update_library(
        &self,
        id: &str,
        library: &VirtualLibrary,
    ) -> Result<VirtualLibrary, ApiError> {
        let result = self.call("update_library", format!("update_library:{id}"), |s| {
            let mut updated = library.clone();
            updated.id = Some(id.to_string());
            if let Some(slot) = s
                .config
                .library
                .iter_mut()
                .find(|l| l.id.as_deref() == Some(id))
            {
                *slot = updated.clone();
            }
            updated
        });
        tokio::task::yield_now().await;
        result
    }

    async fn delete_library(&self, id: &str) -> Result<(), ApiError> {
        let result = self.call("delete_library", format!("delete_library:{id}"), |s| {
            s.config.library.retain(|l| l.id.as_deref() != Some(id));
            s.config.display_order.retain(|d| d != id);
            s.listing.retain(|l| l.id != id);
        });
        tokio::task::yield_now().await;
        result
    }

    async fn refresh_library(&self, id: &str) -> Result<(), ApiError> {
        let result = self.call("refresh_library", format!("refresh_library:{id}"), |_| ());
        tokio::task::yield_now().await;
        result
    }

    async fn get_all_libraries(&self) -> Result<Vec<LibraryDescriptor>, ApiError> {
        let result = self.call("get_all_libraries", "get_all_libraries".into(), |s| {
            s.listing.clone()
        });
        tokio::task::yield_now().await;
        result
    }

    async fn save_display_order(&self, ordered_ids: &[String]) -> Result<(), ApiError> {
        let result = self.call(
            "save_display_order",
            format!("save_display_order:{}", ordered_ids.join(",")),
            |s| s.config.display_order = ordered_ids.to_vec(),
        );
        tokio::task::yield_now().await;
        result
    }

    async fn get_classifications(&self) -> Result<Classifications, ApiError> {
        let result = self.call("get_classifications", "get_classifications".into(), |s| {
            s.classifications.clone()
        });
        tokio::task::yield_now().await;
        result
    }

    async fn search_persons(
        &self,
        query: Option<&str>,
        page: u32,
    ) -> Result<Vec<ResourceDescriptor>, ApiError> {
        let name = format!("search_persons:{}:{page}", query.unwrap_or_default());
        let result = self.call("search_persons", name, |s| {
            let needle = query.unwrap_or_default().to_lowercase();
            let mut found: Vec<ResourceDescriptor> = s
                .persons
                .iter()
                .filter(|(_, name)| name.to_lowercase().contains(&needle))
                .map(|(id, name)| ResourceDescriptor {
                    id: id.clone(),
                    name: name.clone(),
                })
                .collect();
            found.sort_by(|a, b| a.id.cmp(&b.id));
            found
        });
        tokio::task::yield_now().await;
        result
    }

    async fn resolve_item(&self, item_id: &str) -> Result<ResolvedItem, ApiError> {
        let result = self.call("resolve_item", format!("resolve_item:{item_id}"), |s| {
            s.persons.get(item_id).cloned()
        });
        tokio::task::yield_now().await;
        match result? {
            Some(name) => Ok(ResolvedItem {
                id: Some(item_id.to_string()),
                name,
            }),
            None => Err(ApiError::Api {
                status: 404,
                detail: Some("item not found".into()),
                message: String::new(),
            }),
        }
    }

    async fn get_advanced_filters(&self) -> Result<Vec<AdvancedFilter>, ApiError> {
        let result = self.call("get_advanced_filters", "get_advanced_filters".into(), |s| {
            s.config.advanced_filters.clone()
        });
        tokio::task::yield_now().await;
        result
    }

    async fn save_advanced_filters(&self, filters: &[AdvancedFilter]) -> Result<(), ApiError> {
        let result = self.call("save_advanced_filters", "save_advanced_filters".into(), |s| {
            s.config.advanced_filters = filters.to_vec();
        });
        tokio::task::yield_now().await;
        result
    }

    async fn generate_cover(&self, request: &CoverRequest) -> Result<CoverResponse, ApiError> {
        let name = format!("generate_cover:{}", request.library_id);
        let result = self.call("generate_cover", name, |s| {
            let response = s.cover_response.clone();
            if response.success {
                if let Some(lib) = s
                    .config
                    .library
                    .iter_mut()
                    .find(|l| l.id.as_deref() == Some(request.library_id.as_str()))
                {
                    lib.image_tag = response.image_tag.clone();
                }
            }
            response
        });
        tokio::task::yield_now().await;
        result
    }

    async fn clear_covers(&self) -> Result<(), ApiError> {
        let result = self.call("clear_covers", "clear_covers".into(), |s| {
            for lib in &mut s.config.library {
                lib.image_tag = None;
            }
        });
        tokio::task::yield_now().await;
        result
    }
}
