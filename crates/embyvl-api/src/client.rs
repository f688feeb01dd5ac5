use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use url::Url;

use embyvl_core::models::{
    AdvancedFilter, Classifications, LibraryDescriptor, ProxyConfig, ResourceDescriptor,
    VirtualLibrary,
};

use crate::error::ApiError;
use crate::traits::AdminApi;
use crate::types::{CoverRequest, CoverResponse, ErrorBody, ResolvedItem};

/// HTTP client for the proxy's admin API.
#[derive(Debug, Clone)]
pub struct AdminClient {
    base: Url,
    http: Client,
}

impl AdminClient {
    /// `base` is the API root including its prefix, e.g. `http://127.0.0.1:8001/api`.
    pub fn new(base: Url, timeout: Duration) -> Result<Self, ApiError> {
        if base.cannot_be_a_base() {
            return Err(ApiError::InvalidBase(base.to_string()));
        }
        let http = Client::builder().timeout(timeout).build()?;
        Ok(Self { base, http })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Append path segments to the base URL, percent-encoding each one.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| ApiError::InvalidBase(self.base.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Check the HTTP response for errors, pulling `detail` out of the body on failure.
    async fn check_response(resp: reqwest::Response) -> Result<reqwest::Response, ApiError> {
        if resp.status().is_success() {
            return Ok(resp);
        }

        let status = resp.status().as_u16();
        let body = resp.text().await.unwrap_or_default();
        let detail = ErrorBody::parse_detail(&body);
        tracing::warn!(status, detail = detail.as_deref(), "admin API error");
        Err(ApiError::Api {
            status,
            detail,
            message: body,
        })
    }

    async fn read_json<T: DeserializeOwned>(resp: reqwest::Response) -> Result<T, ApiError> {
        resp.json()
            .await
            .map_err(|e| ApiError::Parse(e.to_string()))
    }

    async fn get_json<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "GET");
        let resp = self.http.get(url).send().await?;
        let resp = Self::check_response(resp).await?;
        Self::read_json(resp).await
    }

    /// POST with an optional JSON body, discarding the response body.
    async fn post_unit<B: serde::Serialize + ?Sized>(
        &self,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(segments)?;
        tracing::debug!(%url, "POST");
        let mut req = self.http.post(url);
        if let Some(body) = body {
            req = req.json(body);
        }
        let resp = req.send().await?;
        Self::check_response(resp).await?;
        Ok(())
    }
}

impl AdminApi for AdminClient {
    async fn get_config(&self) -> Result<ProxyConfig, ApiError> {
        self.get_json(&["config"]).await
    }

    async fn update_config(&self, config: &ProxyConfig) -> Result<ProxyConfig, ApiError> {
        let url = self.endpoint(&["config"])?;
        tracing::debug!(%url, "POST");
        let resp = self.http.post(url).json(config).send().await?;
        let resp = Self::check_response(resp).await?;
        Self::read_json(resp).await
    }

    async fn restart_proxy(&self) -> Result<(), ApiError> {
        self.post_unit::<()>(&["proxy", "restart"], None).await
    }

    async fn create_library(&self, library: &VirtualLibrary) -> Result<VirtualLibrary, ApiError> {
        let url = self.endpoint(&["libraries"])?;
        tracing::debug!(%url, name = %library.name, "POST");
        let resp = self.http.post(url).json(library).send().await?;
        let resp = Self::check_response(resp).await?;
        Self::read_json(resp).await
    }

    async fn update_library(
        &self,
        id: &str,
        library: &VirtualLibrary,
    ) -> Result<VirtualLibrary, ApiError> {
        let url = self.endpoint(&["libraries", id])?;
        tracing::debug!(%url, "PUT");
        let resp = self.http.put(url).json(library).send().await?;
        let resp = Self::check_response(resp).await?;
        Self::read_json(resp).await
    }

    async fn delete_library(&self, id: &str) -> Result<(), ApiError> {
        let url = self.endpoint(&["libraries", id])?;
        tracing::debug!(%url, "DELETE");
        let resp = self.http.delete(url).send().await?;
        Self::check_response(resp).await?;
        Ok(())
    }

    async fn refresh_library(&self, id: &str) -> Result<(), ApiError> {
        self.post_unit::<()>(&["libraries", id, "refresh"], None)
            .await
    }

    async fn get_all_libraries(&self) -> Result<Vec<LibraryDescriptor>, ApiError> {
        self.get_json(&["all-libraries"]).await
    }

    async fn save_display_order(&self, ordered_ids: &[String]) -> Result<(), ApiError> {
        self.post_unit(&["display-order"], Some(ordered_ids)).await
    }

    async fn get_classifications(&self) -> Result<Classifications, ApiError> {
        self.get_json(&["emby", "classifications"]).await
    }

    async fn search_persons(
        &self,
        query: Option<&str>,
        page: u32,
    ) -> Result<Vec<ResourceDescriptor>, ApiError> {
        let url = self.endpoint(&["emby", "persons", "search"])?;
        tracing::debug!(%url, query, page, "GET");
        let mut req = self.http.get(url).query(&[("page", page.max(1).to_string())]);
        if let Some(query) = query.filter(|q| !q.is_empty()) {
            req = req.query(&[("query", query)]);
        }
        let resp = req.send().await?;
        let resp = Self::check_response(resp).await?;
        Self::read_json(resp).await
    }

    async fn resolve_item(&self, item_id: &str) -> Result<ResolvedItem, ApiError> {
        self.get_json(&["emby", "resolve-item", item_id]).await
    }

    async fn get_advanced_filters(&self) -> Result<Vec<AdvancedFilter>, ApiError> {
        self.get_json(&["advanced-filters"]).await
    }

    async fn save_advanced_filters(&self, filters: &[AdvancedFilter]) -> Result<(), ApiError> {
        self.post_unit(&["advanced-filters"], Some(filters)).await
    }

    async fn generate_cover(&self, request: &CoverRequest) -> Result<CoverResponse, ApiError> {
        let url = self.endpoint(&["generate-cover"])?;
        tracing::debug!(%url, library_id = %request.library_id, style = %request.style_name, "POST");
        let resp = self.http.post(url).json(request).send().await?;
        let resp = Self::check_response(resp).await?;
        Self::read_json(resp).await
    }

    async fn clear_covers(&self) -> Result<(), ApiError> {
        self.post_unit::<()>(&["covers", "clear"], None).await
    }
}
