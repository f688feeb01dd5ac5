use std::collections::HashMap;

use anyhow::{anyhow, bail, Context};

use embyvl_api::types::CoverRequest;
use embyvl_api::AdminApi;
use embyvl_core::models::{AdvancedFilter, ProxyConfig, VirtualLibrary};
use embyvl_core::views;
use embyvl_runtime::{failure_message, ConfigStore, NoticeKind, Notifier};

use crate::console;
use crate::{Command, FilterAction, LibraryArgs, SettingsArgs};

impl LibraryArgs {
    fn apply(self, lib: &mut VirtualLibrary) {
        if let Some(name) = self.name {
            lib.name = name;
        }
        if let Some(resource_type) = self.resource_type {
            lib.resource_type = resource_type;
        }
        if let Some(resource_id) = self.resource_id {
            lib.resource_id = Some(resource_id);
        }
        if let Some(url) = self.rsshub_url {
            lib.rsshub_url = Some(url);
        }
        if let Some(rss_type) = self.rss_type {
            lib.rss_type = Some(rss_type);
        }
        if let Some(merge) = self.merge_by_tmdb_id {
            lib.merge_by_tmdb_id = merge;
        }
        if let Some(filter) = self.filter {
            lib.advanced_filter_id = (!filter.is_empty()).then_some(filter);
        }
    }
}

impl SettingsArgs {
    fn is_empty(&self) -> bool {
        self.emby_url.is_none()
            && self.emby_api_key.is_none()
            && self.hide.is_empty()
            && self.unhide.is_empty()
    }

    fn apply(self, config: &mut ProxyConfig) {
        if let Some(url) = self.emby_url {
            config.emby_url = url;
        }
        if let Some(key) = self.emby_api_key {
            config.emby_api_key = key;
        }
        config.hide.retain(|id| !self.unhide.contains(id));
        for id in self.hide {
            if !config.hide.contains(&id) {
                config.hide.push(id);
            }
        }
    }
}

/// Initial load for commands that act on current state; failure was already reported.
async fn load<A: AdminApi, N: Notifier>(store: &ConfigStore<A, N>) -> anyhow::Result<()> {
    store.fetch_all_initial_data().await;
    match store.snapshot().await.data_status {
        Some(status) if status.kind == NoticeKind::Error => {
            bail!("could not load the proxy configuration")
        }
        _ => Ok(()),
    }
}

async fn find_library<A: AdminApi, N: Notifier>(
    store: &ConfigStore<A, N>,
    id: &str,
) -> anyhow::Result<VirtualLibrary> {
    store
        .snapshot()
        .await
        .config
        .find_library(id)
        .cloned()
        .ok_or_else(|| anyhow!("no virtual library with id '{id}'"))
}

async fn person_labels<A: AdminApi, N: Notifier>(
    store: &ConfigStore<A, N>,
    libraries: &[VirtualLibrary],
) -> HashMap<String, String> {
    let mut labels = HashMap::new();
    for person_id in views::visible_person_ids(libraries) {
        if let Some(label) = store.persons().label(person_id).await {
            labels.insert(person_id.to_string(), label);
        }
    }
    labels
}

pub async fn run<A: AdminApi, N: Notifier>(
    store: &ConfigStore<A, N>,
    command: Command,
) -> anyhow::Result<()> {
    match command {
        Command::Show { json } => {
            load(store).await?;
            let state = store.snapshot().await;
            if json {
                println!("{}", serde_json::to_string_pretty(&state.config)?);
            } else {
                let labels = person_labels(store, state.virtual_libraries()).await;
                print!("{}", console::render_overview(&state, &labels));
            }
        }
        Command::RefreshEmby => {
            store.fetch_all_emby_data().await;
            let state = store.snapshot().await;
            println!(
                "{} libraries, {} classification categories",
                state.all_libraries.len(),
                state.classifications.0.len()
            );
        }
        Command::Add(args) => {
            store.open_add_dialog().await;
            store.edit_current_library(|lib| args.apply(lib)).await;
            store.save_library().await;
        }
        Command::Edit { id, changes } => {
            load(store).await?;
            let lib = find_library(store, &id).await?;
            store.open_edit_dialog(&lib).await;
            store.edit_current_library(|lib| changes.apply(lib)).await;
            store.save_library().await;
        }
        Command::Delete { id } => store.delete_library(&id).await,
        Command::Refresh { id } => store.refresh_rss_library(&id).await,
        Command::Order {
            mut ids,
            append_unsorted,
        } => {
            if append_unsorted {
                load(store).await?;
                for lib in store.unsorted_libs().await {
                    if !ids.contains(&lib.id) {
                        ids.push(lib.id);
                    }
                }
            }
            if ids.is_empty() {
                bail!("no library ids given");
            }
            store.save_display_order(ids).await;
        }
        Command::Cover {
            id,
            title,
            subtitle,
            style,
            images,
            no_save,
        } => {
            load(store).await?;
            let lib = find_library(store, &id).await?;
            let style_name = match style {
                Some(style) => style,
                None => store.snapshot().await.config.default_cover_style().to_string(),
            };
            store.open_edit_dialog(&lib).await;

            let request = CoverRequest {
                library_id: id,
                title_zh: title.unwrap_or_else(|| lib.name.clone()),
                title_en: subtitle,
                style_name,
                temp_image_paths: (!images.is_empty()).then_some(images),
            };
            if store.generate_library_cover(request).await && !no_save {
                store.save_library().await;
            }
        }
        Command::ClearCovers => store.clear_all_covers().await,
        Command::RestartProxy => store.restart_proxy_server().await,
        Command::Persons { query, page } => {
            let found = store.search_persons(query.as_deref(), page).await;
            print!("{}", console::render_persons(&found));
        }
        Command::Filters { action } => match action {
            FilterAction::List => {
                let filters = store
                    .api()
                    .get_advanced_filters()
                    .await
                    .map_err(|e| anyhow!(failure_message("failed to load advanced filters", &e)))?;
                print!("{}", console::render_filters(&filters));
            }
            FilterAction::Import { file } => {
                let raw = std::fs::read_to_string(&file)
                    .with_context(|| format!("reading {}", file.display()))?;
                let filters: Vec<AdvancedFilter> = serde_json::from_str(&raw)
                    .with_context(|| format!("parsing {}", file.display()))?;
                store.save_advanced_filters(filters).await?;
            }
        },
        Command::Settings(args) => {
            if args.is_empty() {
                bail!("nothing to change; pass at least one setting");
            }
            load(store).await?;
            store.edit_config(|config| args.apply(config)).await;
            store.save_config().await;
        }
        // Written locally before any connection is made.
        Command::InitConfig => {}
    }
    Ok(())
}
