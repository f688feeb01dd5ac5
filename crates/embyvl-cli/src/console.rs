//! Terminal output: notices and plain-text rendering of store state.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use embyvl_core::models::{AdvancedFilter, ResourceDescriptor, VirtualLibrary};
use embyvl_runtime::{Notice, NoticeKind, Notifier, StoreState};

/// Prints notices and remembers whether any of them was an error.
#[derive(Debug, Default)]
pub struct ConsoleNotifier {
    failed: AtomicBool,
}

impl ConsoleNotifier {
    pub fn saw_error(&self) -> bool {
        self.failed.load(Ordering::Relaxed)
    }
}

impl Notifier for ConsoleNotifier {
    fn notify(&self, notice: Notice) {
        tracing::debug!(kind = ?notice.kind, "{}", notice.message);
        match notice.kind {
            NoticeKind::Success => println!("ok: {}", notice.message),
            NoticeKind::Info => println!("{}", notice.message),
            NoticeKind::Warning => eprintln!("warning: {}", notice.message),
            NoticeKind::Error => {
                self.failed.store(true, Ordering::Relaxed);
                eprintln!("error: {}", notice.message);
            }
        }
    }
}

fn library_source(lib: &VirtualLibrary, person_labels: &HashMap<String, String>) -> String {
    if let Some(person_id) = lib.person_id() {
        return match person_labels.get(person_id) {
            Some(label) => format!("{label} ({person_id})"),
            None => person_id.to_string(),
        };
    }
    if let Some(url) = lib.rsshub_url.as_deref().filter(|u| !u.is_empty()) {
        return format!("{url} [{}]", lib.rss_type.as_deref().unwrap_or_default());
    }
    lib.resource_id.clone().unwrap_or_default()
}

/// Virtual libraries, the home layout and anything missing from it.
pub fn render_overview(state: &StoreState, person_labels: &HashMap<String, String>) -> String {
    let mut lines = Vec::new();
    let libraries = state.virtual_libraries();

    lines.push(format!("Virtual libraries ({})", libraries.len()));
    for lib in libraries {
        let mut line = format!(
            "  {:<12} {:<24} {:<10} {}",
            lib.id.as_deref().unwrap_or("-"),
            lib.name,
            lib.resource_type.as_str(),
            library_source(lib, person_labels),
        );
        if lib.merge_by_tmdb_id {
            line.push_str(" [merge]");
        }
        if lib.image_tag.is_some() {
            line.push_str(" [cover]");
        }
        if let Some(filter) = &lib.advanced_filter_id {
            line.push_str(&format!(" [filter {filter}]"));
        }
        lines.push(line.trim_end().to_string());
    }

    lines.push("Home layout".to_string());
    for (i, lib) in state.sorted_libs_in_display_order().into_iter().enumerate() {
        let mut line = format!("  {:>2}. {:<12} {}", i + 1, lib.id, lib.display_name());
        if lib.is_virtual() {
            line.push_str(" (virtual)");
        }
        if state.config.is_hidden(&lib.id) {
            line.push_str(" [hidden]");
        }
        lines.push(line);
    }

    let unsorted = state.unsorted_libs();
    if !unsorted.is_empty() {
        lines.push("Not in layout".to_string());
        for lib in unsorted {
            lines.push(format!("   - {:<12} {}", lib.id, lib.display_name()));
        }
    }

    lines.push(format!(
        "Advanced filters: {}",
        state.config.advanced_filters.len()
    ));
    if state.has_unsaved_changes() {
        lines.push("(local changes not saved to the proxy)".to_string());
    }

    lines.join("\n") + "\n"
}

pub fn render_persons(persons: &[ResourceDescriptor]) -> String {
    if persons.is_empty() {
        return "no persons found\n".to_string();
    }
    persons
        .iter()
        .map(|p| format!("  {:<12} {}\n", p.id, p.name))
        .collect()
}

pub fn render_filters(filters: &[AdvancedFilter]) -> String {
    let mut out = String::new();
    for filter in filters {
        let joiner = if filter.match_all { "all" } else { "any" };
        out.push_str(&format!(
            "{} {} (match {joiner} of {} rules)\n",
            filter.id,
            filter.name,
            filter.rules.len()
        ));
        for rule in &filter.rules {
            let op = &rule.operator;
            match rule.value.as_deref().filter(|_| op.takes_value()) {
                Some(value) => out.push_str(&format!("    {} {op} {value}\n", rule.field)),
                None => out.push_str(&format!("    {} {op}\n", rule.field)),
            }
        }
    }
    out
}
