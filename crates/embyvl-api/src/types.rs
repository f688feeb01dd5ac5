use serde::{Deserialize, Serialize};

/// Body of `POST /generate-cover`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverRequest {
    pub library_id: String,
    /// Primary (usually Chinese) title drawn on the cover.
    pub title_zh: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title_en: Option<String>,
    pub style_name: String,
    /// Server-side paths of previously uploaded source images.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temp_image_paths: Option<Vec<String>>,
}

/// Response of `POST /generate-cover`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CoverResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub image_tag: Option<String>,
}

/// Response of `GET /emby/resolve-item/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolvedItem {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
}

/// Failure body the backend sends alongside non-2xx statuses.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    /// Extract a printable detail; validation errors arrive as JSON arrays.
    pub(crate) fn parse_detail(body: &str) -> Option<String> {
        let parsed: ErrorBody = serde_json::from_str(body).ok()?;
        match parsed.detail? {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) if s.trim().is_empty() => None,
            serde_json::Value::String(s) => Some(s),
            other => Some(other.to_string()),
        }
    }
}
