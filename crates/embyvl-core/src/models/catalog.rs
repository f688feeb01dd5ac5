use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::library::ResourceType;
use super::null_as_default;

/// A selectable catalog value (collection, tag, genre, studio or person).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
}

/// Classification metadata keyed by plural category name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Classifications(pub BTreeMap<String, Vec<ResourceDescriptor>>);

impl Classifications {
    pub fn category(&self, key: &str) -> &[ResourceDescriptor] {
        self.0.get(key).map(Vec::as_slice).unwrap_or_default()
    }

    /// Resources selectable for a library of the given type.
    pub fn for_type(&self, resource_type: ResourceType) -> &[ResourceDescriptor] {
        resource_type
            .classification_key()
            .map(|key| self.category(key))
            .unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// One entry of the backend's "all libraries" listing, real or virtual.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryDescriptor {
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(
        rename = "collectionType",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub collection_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LibraryDescriptor {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: None,
            kind: None,
            collection_type: None,
            extra: Map::new(),
        }
    }

    pub fn is_virtual(&self) -> bool {
        self.kind.as_deref() == Some("virtual")
    }

    pub fn display_name(&self) -> &str {
        self.name.as_deref().unwrap_or(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_listing() {
        let json = r#"[
            {"id": "3", "name": "Movies", "type": "real", "collectionType": "movies"},
            {"id": "9f1e", "name": "Nolan", "type": "virtual"}
        ]"#;

        let listing: Vec<LibraryDescriptor> = serde_json::from_str(json).unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].collection_type.as_deref(), Some("movies"));
        assert!(!listing[0].is_virtual());
        assert!(listing[1].is_virtual());
        assert_eq!(LibraryDescriptor::new("x").display_name(), "x");
    }

    #[test]
    fn test_classifications_lookup() {
        let json = r#"{
            "collections": [{"id": "c1", "name": "Marvel"}],
            "genres": [{"id": "g1", "name": "Drama"}, {"id": "g2", "name": "Horror"}],
            "persons": []
        }"#;

        let classes: Classifications = serde_json::from_str(json).unwrap();
        assert_eq!(classes.for_type(ResourceType::Genre).len(), 2);
        assert_eq!(classes.for_type(ResourceType::Collection)[0].name, "Marvel");
        assert!(classes.for_type(ResourceType::Tag).is_empty());
        assert!(classes.for_type(ResourceType::Rsshub).is_empty());
    }
}
