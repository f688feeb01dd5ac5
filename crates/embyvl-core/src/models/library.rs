use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use super::{is_blank, null_as_default};

/// What a virtual library is derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    #[default]
    Collection,
    Tag,
    Genre,
    Studio,
    Person,
    Rsshub,
    All,
}

impl ResourceType {
    pub const ALL: &[ResourceType] = &[
        Self::Collection,
        Self::Tag,
        Self::Genre,
        Self::Studio,
        Self::Person,
        Self::Rsshub,
        Self::All,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collection => "collection",
            Self::Tag => "tag",
            Self::Genre => "genre",
            Self::Studio => "studio",
            Self::Person => "person",
            Self::Rsshub => "rsshub",
            Self::All => "all",
        }
    }

    pub fn from_str_opt(s: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == s)
    }

    /// Plural classification category holding the selectable resources for this type.
    pub fn classification_key(&self) -> Option<&'static str> {
        match self {
            Self::Collection => Some("collections"),
            Self::Tag => Some("tags"),
            Self::Genre => Some("genres"),
            Self::Studio => Some("studios"),
            Self::Person => Some("persons"),
            Self::Rsshub | Self::All => None,
        }
    }

    /// Whether a library of this type must point at a catalog resource.
    pub fn needs_resource_id(&self) -> bool {
        !matches!(self, Self::Rsshub | Self::All)
    }
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a library cannot be sent to the backend yet.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("library name is required")]
    MissingName,

    #[error("RSSHub libraries need both a feed URL and an RSS type")]
    MissingRssSource,

    #[error("a {0} library needs a resource id")]
    MissingResourceId(ResourceType),

    #[error("the library being edited has no id")]
    MissingId,
}

/// A user-defined library derived from catalog filters or an RSS feed.
///
/// Keys this type does not model are kept in `extra` so a library read from the
/// backend can be written back without loss.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VirtualLibrary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub resource_type: ResourceType,
    #[serde(default)]
    pub resource_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rsshub_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rss_type: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub merge_by_tmdb_id: bool,
    #[serde(default)]
    pub image_tag: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advanced_filter_id: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VirtualLibrary {
    /// Blank library as opened by the "add" form.
    pub fn draft() -> Self {
        Self {
            resource_id: Some(String::new()),
            ..Default::default()
        }
    }

    /// Check the required fields for this library's resource type.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.name.is_empty() {
            return Err(ValidationError::MissingName);
        }

        if self.resource_type == ResourceType::Rsshub {
            if is_blank(self.rsshub_url.as_deref()) || is_blank(self.rss_type.as_deref()) {
                return Err(ValidationError::MissingRssSource);
            }
        } else if self.resource_type.needs_resource_id() && is_blank(self.resource_id.as_deref())
        {
            return Err(ValidationError::MissingResourceId(self.resource_type));
        }

        Ok(())
    }

    /// Like [`validate`](Self::validate), and additionally requires a persisted id.
    pub fn validate_for_update(&self) -> Result<&str, ValidationError> {
        self.validate()?;
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(ValidationError::MissingId)
    }

    /// Person id to resolve for display, if this is a person library.
    pub fn person_id(&self) -> Option<&str> {
        if self.resource_type != ResourceType::Person {
            return None;
        }
        self.resource_id.as_deref().filter(|id| !id.is_empty())
    }
}
