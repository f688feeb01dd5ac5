//! Trait definition for the admin API gateway.
//!
//! The state store only talks to the backend through this trait, so it can be
//! driven by the HTTP client or by an in-memory fake.

use std::future::Future;

use embyvl_core::models::{
    AdvancedFilter, Classifications, LibraryDescriptor, ProxyConfig, ResourceDescriptor,
    VirtualLibrary,
};

use crate::error::ApiError;
use crate::types::{CoverRequest, CoverResponse, ResolvedItem};

/// Request/response access to every admin endpoint the console uses.
pub trait AdminApi: Send + Sync {
    /// `GET /config`
    fn get_config(&self) -> impl Future<Output = Result<ProxyConfig, ApiError>> + Send;

    /// `POST /config`, returning the configuration as stored by the backend.
    fn update_config(
        &self,
        config: &ProxyConfig,
    ) -> impl Future<Output = Result<ProxyConfig, ApiError>> + Send;

    /// `POST /proxy/restart`
    fn restart_proxy(&self) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /libraries`
    fn create_library(
        &self,
        library: &VirtualLibrary,
    ) -> impl Future<Output = Result<VirtualLibrary, ApiError>> + Send;

    /// `PUT /libraries/{id}`
    fn update_library(
        &self,
        id: &str,
        library: &VirtualLibrary,
    ) -> impl Future<Output = Result<VirtualLibrary, ApiError>> + Send;

    /// `DELETE /libraries/{id}`
    fn delete_library(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /libraries/{id}/refresh`; the backend refreshes asynchronously.
    fn refresh_library(&self, id: &str) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /all-libraries`
    fn get_all_libraries(
        &self,
    ) -> impl Future<Output = Result<Vec<LibraryDescriptor>, ApiError>> + Send;

    /// `POST /display-order`
    fn save_display_order(
        &self,
        ordered_ids: &[String],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `GET /emby/classifications`
    fn get_classifications(
        &self,
    ) -> impl Future<Output = Result<Classifications, ApiError>> + Send;

    /// `GET /emby/persons/search`; pages are 1-based.
    fn search_persons(
        &self,
        query: Option<&str>,
        page: u32,
    ) -> impl Future<Output = Result<Vec<ResourceDescriptor>, ApiError>> + Send;

    /// `GET /emby/resolve-item/{id}`
    fn resolve_item(
        &self,
        item_id: &str,
    ) -> impl Future<Output = Result<ResolvedItem, ApiError>> + Send;

    /// `GET /advanced-filters`
    fn get_advanced_filters(
        &self,
    ) -> impl Future<Output = Result<Vec<AdvancedFilter>, ApiError>> + Send;

    /// `POST /advanced-filters`
    fn save_advanced_filters(
        &self,
        filters: &[AdvancedFilter],
    ) -> impl Future<Output = Result<(), ApiError>> + Send;

    /// `POST /generate-cover`
    fn generate_cover(
        &self,
        request: &CoverRequest,
    ) -> impl Future<Output = Result<CoverResponse, ApiError>> + Send;

    /// `POST /covers/clear`
    fn clear_covers(&self) -> impl Future<Output = Result<(), ApiError>> + Send;
}
