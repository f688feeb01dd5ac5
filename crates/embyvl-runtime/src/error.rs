use embyvl_api::ApiError;

/// Shown when a failed request carries no `detail` of its own.
pub const FALLBACK_DETAIL: &str = "check the network connection or contact the administrator";

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("api error: {0}")]
    Api(#[from] ApiError),
}

/// Operator-facing message for a failed request: `"<prefix>: <detail or fallback>"`.
pub fn failure_message(prefix: &str, err: &ApiError) -> String {
    format!("{prefix}: {}", err.detail().unwrap_or(FALLBACK_DETAIL))
}
