use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::filters::AdvancedFilter;
use super::library::VirtualLibrary;
use super::null_as_default;

const DEFAULT_COVER_STYLE: &str = "style_multi_1";

/// The proxy's configuration document as served by `GET /config`.
///
/// Replaced wholesale on every fetch. Keys not modelled here are carried in
/// `extra` so that posting the document back is lossless.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProxyConfig {
    #[serde(default, deserialize_with = "null_as_default")]
    pub emby_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub emby_api_key: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub hide: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub display_order: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub advanced_filters: Vec<AdvancedFilter>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub library: Vec<VirtualLibrary>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ProxyConfig {
    pub fn is_hidden(&self, id: &str) -> bool {
        self.hide.iter().any(|h| h == id)
    }

    pub fn find_library(&self, id: &str) -> Option<&VirtualLibrary> {
        self.library.iter().find(|l| l.id.as_deref() == Some(id))
    }

    /// Cover style the backend uses when none is given explicitly.
    pub fn default_cover_style(&self) -> &str {
        self.extra
            .get("default_cover_style")
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_COVER_STYLE)
    }
}
