//! Derived views over a configuration snapshot and the backend library listing.
//!
//! Everything here is a pure function of its arguments so the views can be
//! computed from any snapshot without a live store.

use std::collections::{HashMap, HashSet};

use crate::models::{
    Classifications, LibraryDescriptor, ResourceDescriptor, ResourceType, VirtualLibrary,
};

/// Libraries named by `display_order`, in that order.
///
/// Identifiers with no listing entry are dropped, and an identifier repeated in
/// `display_order` only yields its first position.
pub fn sorted_in_display_order<'a>(
    display_order: &[String],
    listing: &'a [LibraryDescriptor],
) -> Vec<&'a LibraryDescriptor> {
    if display_order.is_empty() || listing.is_empty() {
        return Vec::new();
    }

    let mut by_id: HashMap<&str, &LibraryDescriptor> = HashMap::with_capacity(listing.len());
    for lib in listing {
        by_id.entry(lib.id.as_str()).or_insert(lib);
    }

    let mut seen = HashSet::with_capacity(display_order.len());
    display_order
        .iter()
        .filter(|id| seen.insert(id.as_str()))
        .filter_map(|id| by_id.get(id.as_str()).copied())
        .collect()
}

/// Listing entries that `display_order` does not mention, in listing order.
pub fn unsorted<'a>(
    display_order: &[String],
    listing: &'a [LibraryDescriptor],
) -> Vec<&'a LibraryDescriptor> {
    let sorted_ids: HashSet<&str> = display_order.iter().map(String::as_str).collect();
    listing
        .iter()
        .filter(|lib| !sorted_ids.contains(lib.id.as_str()))
        .collect()
}

/// Catalog resources selectable for the library being edited.
pub fn available_resources(
    resource_type: Option<ResourceType>,
    classifications: &Classifications,
) -> &[ResourceDescriptor] {
    resource_type
        .map(|ty| classifications.for_type(ty))
        .unwrap_or_default()
}

/// Order used when the configuration has none yet: the listing as returned.
pub fn seed_display_order(listing: &[LibraryDescriptor]) -> Vec<String> {
    listing.iter().map(|lib| lib.id.clone()).collect()
}

/// Person ids referenced by person libraries, in library order.
pub fn visible_person_ids(libraries: &[VirtualLibrary]) -> Vec<&str> {
    libraries.iter().filter_map(VirtualLibrary::person_id).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(ids: &[&str]) -> Vec<LibraryDescriptor> {
        ids.iter().map(|id| LibraryDescriptor::new(*id)).collect()
    }

    fn order(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    fn ids(libs: &[&LibraryDescriptor]) -> Vec<String> {
        libs.iter().map(|l| l.id.clone()).collect()
    }

    #[test]
    fn test_sorted_follows_display_order() {
        let libs = listing(&["a", "b", "c"]);
        let sorted = sorted_in_display_order(&order(&["c", "a"]), &libs);
        assert_eq!(ids(&sorted), vec!["c", "a"]);
    }

    #[test]
    fn test_sorted_drops_unknown_ids() {
        let libs = listing(&["a", "b"]);
        let sorted = sorted_in_display_order(&order(&["gone", "b"]), &libs);
        assert_eq!(ids(&sorted), vec!["b"]);
    }

    #[test]
    fn test_sorted_empty_when_either_input_empty() {
        assert!(sorted_in_display_order(&[], &listing(&["a"])).is_empty());
        assert!(sorted_in_display_order(&order(&["a"]), &[]).is_empty());
    }

    #[test]
    fn test_unsorted_keeps_listing_order() {
        let libs = listing(&["a", "b", "c", "d"]);
        let rest = unsorted(&order(&["c", "a"]), &libs);
        assert_eq!(ids(&rest), vec!["b", "d"]);
    }

    #[test]
    fn test_partition_covers_listing_exactly_once() {
        let libs = listing(&["a", "b", "c", "d", "e"]);
        let orders = [
            order(&[]),
            order(&["a", "b", "c", "d", "e"]),
            order(&["e", "x", "a", "a", "y"]),
            order(&["z"]),
            order(&["d", "c", "d", "b"]),
        ];

        for display_order in &orders {
            let mut all = ids(&sorted_in_display_order(display_order, &libs));
            all.extend(ids(&unsorted(display_order, &libs)));

            let unique: HashSet<&String> = all.iter().collect();
            assert_eq!(all.len(), libs.len(), "order {display_order:?}");
            assert_eq!(unique.len(), libs.len(), "order {display_order:?}");
            for lib in &libs {
                assert!(unique.contains(&lib.id));
            }
        }
    }

    #[test]
    fn test_available_resources() {
        let classes: Classifications = serde_json::from_str(
            r#"{"studios": [{"id": "s1", "name": "Ghibli"}], "persons": []}"#,
        )
        .unwrap();

        assert_eq!(
            available_resources(Some(ResourceType::Studio), &classes)[0].name,
            "Ghibli"
        );
        assert!(available_resources(None, &classes).is_empty());
        assert!(available_resources(Some(ResourceType::All), &classes).is_empty());
        assert!(available_resources(Some(ResourceType::Genre), &classes).is_empty());
    }

    #[test]
    fn test_seed_and_visible_persons() {
        assert_eq!(seed_display_order(&listing(&["a", "b"])), order(&["a", "b"]));

        let libs: Vec<VirtualLibrary> = serde_json::from_str(
            r#"[
                {"name": "p", "resource_type": "person", "resource_id": "11"},
                {"name": "q", "resource_type": "person", "resource_id": ""},
                {"name": "g", "resource_type": "genre", "resource_id": "12"}
            ]"#,
        )
        .unwrap();
        assert_eq!(visible_person_ids(&libs), vec!["11"]);
    }
}
