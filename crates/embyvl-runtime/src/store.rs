use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::{watch, RwLock};

use embyvl_api::types::CoverRequest;
use embyvl_api::{AdminApi, ApiError};
use embyvl_core::models::{
    AdvancedFilter, Classifications, LibraryDescriptor, ProxyConfig, ResourceDescriptor,
    VirtualLibrary,
};
use embyvl_core::persons::PersonName;
use embyvl_core::views;

use crate::error::{failure_message, StoreError};
use crate::notify::{Notice, NoticeKind, Notifier, StateVersion};
use crate::persons::PersonNameResolver;

/// Status line describing the last data load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DataStatus {
    pub kind: NoticeKind,
    pub text: String,
}

impl DataStatus {
    fn new(kind: NoticeKind, text: &str) -> Self {
        Self {
            kind,
            text: text.to_string(),
        }
    }
}

/// Everything the console shows, owned by [`ConfigStore`].
#[derive(Debug, Clone, Default)]
pub struct StoreState {
    /// Canonical configuration as last fetched, plus local edits not yet saved.
    pub config: ProxyConfig,
    /// Copy of the configuration as last fetched or saved, for change detection.
    pub baseline: Option<ProxyConfig>,
    pub classifications: Classifications,
    /// Every library the backend knows about, real and virtual.
    pub all_libraries: Vec<LibraryDescriptor>,
    pub saving: bool,
    pub data_loading: bool,
    pub data_status: Option<DataStatus>,
    pub cover_generating: bool,
    pub dialog_visible: bool,
    pub is_editing: bool,
    /// Edit buffer; a clone that only reaches `config.library` through a save.
    pub current_library: Option<VirtualLibrary>,
    pub layout_manager_visible: bool,
}

impl StoreState {
    pub fn virtual_libraries(&self) -> &[VirtualLibrary] {
        &self.config.library
    }

    pub fn sorted_libs_in_display_order(&self) -> Vec<&LibraryDescriptor> {
        views::sorted_in_display_order(&self.config.display_order, &self.all_libraries)
    }

    pub fn unsorted_libs(&self) -> Vec<&LibraryDescriptor> {
        views::unsorted(&self.config.display_order, &self.all_libraries)
    }

    pub fn available_resources(&self) -> &[ResourceDescriptor] {
        let resource_type = self.current_library.as_ref().map(|l| l.resource_type);
        views::available_resources(resource_type, &self.classifications)
    }

    pub fn has_unsaved_changes(&self) -> bool {
        self.baseline
            .as_ref()
            .is_some_and(|baseline| baseline != &self.config)
    }
}

/// Monotonic fetch counter for one piece of fetched state.
///
/// A response is installed only if no newer fetch of the same piece was
/// issued after it, so overlapping reloads cannot install stale data.
#[derive(Debug, Default)]
struct Generation(AtomicU64);

impl Generation {
    fn issue(&self) -> u64 {
        self.0.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_latest(&self, token: u64) -> bool {
        self.0.load(Ordering::SeqCst) == token
    }
}

/// Owns the console state and sequences every read and mutation against the backend.
pub struct ConfigStore<A, N> {
    api: Arc<A>,
    notifier: N,
    state: RwLock<StoreState>,
    persons: PersonNameResolver<A>,
    version: Arc<StateVersion>,
    config_gen: Generation,
    listing_gen: Generation,
    classifications_gen: Generation,
}

impl<A: AdminApi, N: Notifier> ConfigStore<A, N> {
    pub fn new(api: A, notifier: N) -> Self {
        Self::with_shared(Arc::new(api), notifier)
    }

    pub fn with_shared(api: Arc<A>, notifier: N) -> Self {
        let version = Arc::new(StateVersion::new());
        Self {
            persons: PersonNameResolver::new(api.clone(), version.clone()),
            api,
            notifier,
            state: RwLock::new(StoreState::default()),
            version,
            config_gen: Generation::default(),
            listing_gen: Generation::default(),
            classifications_gen: Generation::default(),
        }
    }

    pub fn api(&self) -> &A {
        &self.api
    }

    pub fn persons(&self) -> &PersonNameResolver<A> {
        &self.persons
    }

    /// Receiver of the state version; it changes after every observable update.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.version.subscribe()
    }

    pub fn version(&self) -> u64 {
        self.version.current()
    }

    /// Deep copy of the current state.
    pub async fn snapshot(&self) -> StoreState {
        self.state.read().await.clone()
    }

    pub async fn virtual_libraries(&self) -> Vec<VirtualLibrary> {
        self.state.read().await.virtual_libraries().to_vec()
    }

    pub async fn sorted_libs_in_display_order(&self) -> Vec<LibraryDescriptor> {
        let state = self.state.read().await;
        state
            .sorted_libs_in_display_order()
            .into_iter()
            .cloned()
            .collect()
    }

    pub async fn unsorted_libs(&self) -> Vec<LibraryDescriptor> {
        let state = self.state.read().await;
        state.unsorted_libs().into_iter().cloned().collect()
    }

    pub async fn available_resources(&self) -> Vec<ResourceDescriptor> {
        self.state.read().await.available_resources().to_vec()
    }

    pub async fn has_unsaved_changes(&self) -> bool {
        self.state.read().await.has_unsaved_changes()
    }

    pub async fn person_name(&self, person_id: &str) -> Option<PersonName> {
        self.persons.get(person_id).await
    }

    async fn update<R>(&self, f: impl FnOnce(&mut StoreState) -> R) -> R {
        let result = f(&mut *self.state.write().await);
        self.version.bump();
        result
    }

    fn report(&self, prefix: &str, err: &ApiError) {
        tracing::warn!(status = err.status(), "{prefix}: {err}");
        self.notifier
            .notify(Notice::error(failure_message(prefix, err)));
    }

    // --- loading ---

    /// Fetch configuration, classifications and the library listing together.
    ///
    /// Nothing is installed unless all three succeed. An empty display order is
    /// seeded from the listing.
    pub async fn fetch_all_initial_data(&self) {
        self.update(|s| {
            s.data_loading = true;
            s.data_status = None;
        })
        .await;

        let config_token = self.config_gen.issue();
        let classifications_token = self.classifications_gen.issue();
        let listing_token = self.listing_gen.issue();

        let fetched = tokio::try_join!(
            self.api.get_config(),
            self.api.get_classifications(),
            self.api.get_all_libraries(),
        );

        match fetched {
            Ok((config, classifications, listing)) => {
                let config_installed = self
                    .update(|s| {
                        let config_installed = self.config_gen.is_latest(config_token);
                        if config_installed {
                            install_config(s, config);
                        }
                        if self.classifications_gen.is_latest(classifications_token) {
                            s.classifications = classifications;
                        }
                        if self.listing_gen.is_latest(listing_token) {
                            s.all_libraries = listing;
                        }
                        if config_installed
                            && s.config.display_order.is_empty()
                            && !s.all_libraries.is_empty()
                        {
                            s.config.display_order = views::seed_display_order(&s.all_libraries);
                            tracing::info!(
                                count = s.config.display_order.len(),
                                "seeded display order from library listing"
                            );
                        }
                        if config_installed {
                            s.data_status =
                                Some(DataStatus::new(NoticeKind::Success, "library data loaded"));
                        }
                        config_installed
                    })
                    .await;

                if config_installed {
                    self.resolve_visible_person_names().await;
                } else {
                    tracing::debug!(config_token, "discarded superseded initial load");
                }
            }
            Err(e) => {
                self.report("failed to load initial data", &e);
                if self.config_gen.is_latest(config_token) {
                    self.update(|s| {
                        s.data_status = Some(DataStatus::new(
                            NoticeKind::Error,
                            "failed to load library data",
                        ));
                    })
                    .await;
                }
            }
        }

        self.update(|s| s.data_loading = false).await;
    }

    /// Re-establish canonical configuration and listing after a mutation.
    async fn reload_config_and_listing(&self) {
        let config_token = self.config_gen.issue();
        let listing_token = self.listing_gen.issue();

        match tokio::try_join!(self.api.get_config(), self.api.get_all_libraries()) {
            Ok((config, listing)) => {
                let config_installed = self
                    .update(|s| {
                        let config_installed = self.config_gen.is_latest(config_token);
                        if config_installed {
                            install_config(s, config);
                        }
                        if self.listing_gen.is_latest(listing_token) {
                            s.all_libraries = listing;
                        }
                        config_installed
                    })
                    .await;

                if config_installed {
                    self.resolve_visible_person_names().await;
                } else {
                    tracing::debug!(config_token, "discarded superseded reload");
                }
            }
            Err(e) => self.report("failed to refresh the configuration", &e),
        }
    }

    /// Lighter refresh: classifications and listing only, configuration untouched.
    pub async fn fetch_all_emby_data(&self) {
        self.update(|s| {
            s.data_loading = true;
            s.data_status = Some(DataStatus::new(NoticeKind::Info, "refreshing…"));
        })
        .await;

        let classifications_token = self.classifications_gen.issue();
        let listing_token = self.listing_gen.issue();

        match tokio::try_join!(self.api.get_classifications(), self.api.get_all_libraries()) {
            Ok((classifications, listing)) => {
                self.update(|s| {
                    let current = self.classifications_gen.is_latest(classifications_token);
                    if current {
                        s.classifications = classifications;
                        s.data_status =
                            Some(DataStatus::new(NoticeKind::Success, "Emby data refreshed"));
                    }
                    if self.listing_gen.is_latest(listing_token) {
                        s.all_libraries = listing;
                    }
                })
                .await;
                self.notifier.notify(Notice::success(
                    "classifications and libraries refreshed from Emby",
                ));
            }
            Err(e) => {
                self.report("failed to refresh Emby data", &e);
                if self.classifications_gen.is_latest(classifications_token) {
                    self.update(|s| {
                        s.data_status = Some(DataStatus::new(NoticeKind::Error, "refresh failed"));
                    })
                    .await;
                }
            }
        }

        self.update(|s| s.data_loading = false).await;
    }

    // --- person names ---

    /// Resolve the name of every person library's resource.
    pub async fn resolve_visible_person_names(&self) {
        let ids: Vec<String> = {
            let state = self.state.read().await;
            views::visible_person_ids(&state.config.library)
                .into_iter()
                .map(str::to_string)
                .collect()
        };
        self.persons
            .resolve_all(ids.iter().map(String::as_str))
            .await;
    }

    pub async fn resolve_person_name(&self, person_id: &str) {
        self.persons.resolve(person_id).await;
    }

    // --- edit buffer ---

    pub async fn open_add_dialog(&self) {
        self.update(|s| {
            s.is_editing = false;
            s.current_library = Some(VirtualLibrary::draft());
            s.dialog_visible = true;
        })
        .await;
    }

    /// Open `library` for editing. The buffer is a clone; the canonical list is untouched.
    pub async fn open_edit_dialog(&self, library: &VirtualLibrary) {
        self.update(|s| {
            s.is_editing = true;
            s.current_library = Some(library.clone());
            s.dialog_visible = true;
        })
        .await;

        if let Some(person_id) = library.person_id() {
            self.persons.resolve(person_id).await;
        }
    }

    pub async fn close_dialog(&self) {
        self.update(|s| s.dialog_visible = false).await;
    }

    /// Mutate the edit buffer in place; `None` if no library is open.
    pub async fn edit_current_library<R>(
        &self,
        f: impl FnOnce(&mut VirtualLibrary) -> R,
    ) -> Option<R> {
        self.update(|s| s.current_library.as_mut().map(f)).await
    }

    /// Mutate the local configuration ahead of [`save_config`](Self::save_config).
    pub async fn edit_config<R>(&self, f: impl FnOnce(&mut ProxyConfig) -> R) -> R {
        self.update(|s| f(&mut s.config)).await
    }

    pub async fn open_layout_manager(&self) {
        self.update(|s| s.layout_manager_visible = true).await;
    }

    pub async fn close_layout_manager(&self) {
        self.update(|s| s.layout_manager_visible = false).await;
    }

    // --- mutations ---

    /// Validate the edit buffer, then create or update it and reload.
    ///
    /// Validation failures are reported as a warning and never reach the backend.
    pub async fn save_library(&self) {
        let (library, is_editing) = {
            let state = self.state.read().await;
            (state.current_library.clone(), state.is_editing)
        };
        let Some(library) = library else {
            self.notifier
                .notify(Notice::warning("no virtual library is open for editing"));
            return;
        };

        let checked = if is_editing {
            library.validate_for_update().map(|id| Some(id.to_string()))
        } else {
            library.validate().map(|()| None)
        };
        let update_id = match checked {
            Ok(update_id) => update_id,
            Err(e) => {
                tracing::debug!(name = %library.name, "library failed validation: {e}");
                self.notifier.notify(Notice::warning(format!(
                    "please fill in all required fields: {e}"
                )));
                return;
            }
        };

        self.update(|s| s.saving = true).await;

        let result = match update_id.as_deref() {
            Some(id) => self.api.update_library(id, &library).await,
            None => self.api.create_library(&library).await,
        };

        match result {
            Ok(saved) => {
                tracing::info!(id = saved.id.as_deref(), name = %saved.name, "virtual library saved");
                self.notifier.notify(Notice::success(if update_id.is_some() {
                    "virtual library updated"
                } else {
                    "virtual library added"
                }));
                self.update(|s| s.dialog_visible = false).await;
                self.reload_config_and_listing().await;
            }
            Err(e) => self.report("failed to save virtual library", &e),
        }

        self.update(|s| s.saving = false).await;
    }

    pub async fn delete_library(&self, id: &str) {
        self.update(|s| s.saving = true).await;

        match self.api.delete_library(id).await {
            Ok(()) => {
                tracing::info!(id, "virtual library deleted");
                self.notifier.notify(Notice::success("virtual library deleted"));
                self.reload_config_and_listing().await;
            }
            Err(e) => self.report("failed to delete virtual library", &e),
        }

        self.update(|s| s.saving = false).await;
    }

    /// Ask the backend to refresh an RSS library. The refresh runs server-side,
    /// so local state is not reloaded.
    pub async fn refresh_rss_library(&self, id: &str) {
        self.update(|s| s.saving = true).await;

        match self.api.refresh_library(id).await {
            Ok(()) => self.notifier.notify(Notice::success(
                "RSS library refresh requested; it will run in the background",
            )),
            Err(e) => self.report("failed to refresh RSS library", &e),
        }

        self.update(|s| s.saving = false).await;
    }

    /// Persist the filter set and mirror it locally without a reload.
    pub async fn save_advanced_filters(
        &self,
        filters: Vec<AdvancedFilter>,
    ) -> Result<(), StoreError> {
        self.update(|s| s.saving = true).await;

        let outcome = match self.api.save_advanced_filters(&filters).await {
            Ok(()) => {
                let count = filters.len();
                self.update(|s| s.config.advanced_filters = filters).await;
                tracing::info!(count, "advanced filters saved");
                self.notifier.notify(Notice::success("advanced filters saved"));
                Ok(())
            }
            Err(e) => {
                self.report("failed to save advanced filters", &e);
                Err(StoreError::from(e))
            }
        };

        self.update(|s| s.saving = false).await;
        outcome
    }

    /// Record the order locally, persist exactly what was recorded, then reload.
    ///
    /// The reload also runs after a failed save so a rejected order is
    /// replaced by canonical state.
    pub async fn save_display_order(&self, ordered_ids: Vec<String>) {
        let order = self
            .update(|s| {
                s.saving = true;
                s.config.display_order = ordered_ids;
                s.config.display_order.clone()
            })
            .await;

        match self.api.save_display_order(&order).await {
            Ok(()) => self.notifier.notify(Notice::success("home layout saved")),
            Err(e) => self.report("failed to save layout", &e),
        }
        self.reload_config_and_listing().await;

        self.update(|s| s.saving = false).await;
    }

    /// Generate a cover; returns whether the backend reported success.
    ///
    /// The new image tag goes into the edit buffer only if that library is the
    /// one open. It is not saved; the caller decides whether to save.
    pub async fn generate_library_cover(&self, request: CoverRequest) -> bool {
        self.update(|s| s.cover_generating = true).await;

        let generated = match self.api.generate_cover(&request).await {
            Ok(response) if response.success => {
                self.notifier.notify(Notice::success(
                    "cover generated; save the library to keep it",
                ));
                if let Some(tag) = response.image_tag {
                    self.update(|s| {
                        if let Some(lib) = s
                            .current_library
                            .as_mut()
                            .filter(|l| l.id.as_deref() == Some(request.library_id.as_str()))
                        {
                            lib.image_tag = Some(tag);
                        }
                    })
                    .await;
                }
                true
            }
            Ok(_) => {
                tracing::warn!(library_id = %request.library_id, "cover generation reported failure");
                false
            }
            Err(e) => {
                self.report("cover generation failed", &e);
                false
            }
        };

        self.update(|s| s.cover_generating = false).await;
        generated
    }

    /// Remove every generated cover server-side, then reload to drop stale image tags.
    pub async fn clear_all_covers(&self) {
        self.update(|s| s.saving = true).await;

        match self.api.clear_covers().await {
            Ok(()) => {
                self.notifier.notify(Notice::success("all generated covers cleared"));
                self.reload_config_and_listing().await;
            }
            Err(e) => self.report("failed to clear covers", &e),
        }

        self.update(|s| s.saving = false).await;
    }

    pub async fn restart_proxy_server(&self) {
        self.update(|s| s.saving = true).await;

        match self.api.restart_proxy().await {
            Ok(()) => self.notifier.notify(Notice::success(
                "proxy restart requested; it will be back in a few seconds",
            )),
            Err(e) => self.report("failed to restart proxy", &e),
        }

        self.update(|s| s.saving = false).await;
    }

    /// Persist the whole local configuration and make it the new baseline.
    pub async fn save_config(&self) {
        let config = self.state.read().await.config.clone();
        self.update(|s| s.saving = true).await;

        match self.api.update_config(&config).await {
            Ok(_) => {
                self.update(|s| s.baseline = Some(config)).await;
                self.notifier.notify(Notice::success("settings saved"));
            }
            Err(e) => self.report("failed to save settings", &e),
        }

        self.update(|s| s.saving = false).await;
    }

    /// Page through Emby persons; failures are reported and yield an empty page.
    pub async fn search_persons(&self, query: Option<&str>, page: u32) -> Vec<ResourceDescriptor> {
        match self.api.search_persons(query, page).await {
            Ok(found) => found,
            Err(e) => {
                self.report("person search failed", &e);
                Vec::new()
            }
        }
    }
}

fn install_config(state: &mut StoreState, config: ProxyConfig) {
    state.baseline = Some(config.clone());
    state.config = config;
}
