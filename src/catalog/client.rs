//! Admin API client for listing and deleting products.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, header, header::HeaderMap};
use tracing::instrument;
use url::Url;

use super::{
    CatalogError, CatalogItem, CatalogResult, ItemId, Page,
    link::{PAGE_INFO_PARAM, next_cursor},
    retry::with_retry,
    types::ProductListResponse,
};
use crate::config::{AuthScheme, CatalogConfig, MAX_PAGE_SIZE, RetryConfig};

/// Header the admin API reads the access token from.
const ACCESS_TOKEN_HEADER: &str = "X-Shopify-Access-Token";

/// Read access to the remote catalog.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Fetch one page of the unfiltered listing.
    ///
    /// `cursor` must be the `next_cursor` of the page fetched immediately
    /// before, or `None` for the first page.
    async fn list_page(&self, cursor: Option<&str>, page_size: u32) -> CatalogResult<Page>;
}

/// Write access to the remote catalog.
#[async_trait]
pub trait CatalogWriter: CatalogReader {
    /// Permanently remove an item.
    async fn delete(&self, id: &ItemId) -> CatalogResult<()>;
}

#[async_trait]
impl<T: CatalogReader + ?Sized> CatalogReader for &T {
    async fn list_page(&self, cursor: Option<&str>, page_size: u32) -> CatalogResult<Page> {
        (**self).list_page(cursor, page_size).await
    }
}

#[async_trait]
impl<T: CatalogReader + ?Sized> CatalogReader for Arc<T> {
    async fn list_page(&self, cursor: Option<&str>, page_size: u32) -> CatalogResult<Page> {
        (**self).list_page(cursor, page_size).await
    }
}

#[async_trait]
impl<T: CatalogWriter + ?Sized> CatalogWriter for Arc<T> {
    async fn delete(&self, id: &ItemId) -> CatalogResult<()> {
        (**self).delete(id).await
    }
}

/// REST client for the shop admin API.
///
/// The access token is fixed at construction; the client never refreshes it.
#[derive(Clone)]
pub struct HttpCatalogClient {
    client: Client,
    api_root: Url,
    access_token: String,
    auth_scheme: AuthScheme,
    retry: RetryConfig,
}

impl std::fmt::Debug for HttpCatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpCatalogClient")
            .field("api_root", &self.api_root.as_str())
            .field("auth_scheme", &self.auth_scheme)
            .finish_non_exhaustive()
    }
}

impl HttpCatalogClient {
    /// Creates a client against `api_root` (e.g.
    /// `https://example.myshopify.com/admin/api/2023-10`).
    ///
    /// Fails with [`CatalogError::Config`] when the token is empty or the
    /// root is not an absolute http(s) URL.
    pub fn new(
        client: Client,
        api_root: &str,
        access_token: impl Into<String>,
    ) -> CatalogResult<Self> {
        let access_token = access_token.into();
        if access_token.trim().is_empty() {
            return Err(CatalogError::Config(
                "an access token is required".to_string(),
            ));
        }

        let api_root = Url::parse(api_root.trim_end_matches('/')).map_err(|e| {
            CatalogError::Config(format!("invalid API root '{}': {}", api_root, e))
        })?;
        if api_root.cannot_be_a_base() || !matches!(api_root.scheme(), "http" | "https") {
            return Err(CatalogError::Config(format!(
                "API root must be an http(s) URL, got '{}'",
                api_root
            )));
        }

        Ok(Self {
            client,
            api_root,
            access_token,
            auth_scheme: AuthScheme::default(),
            retry: RetryConfig::default(),
        })
    }

    /// Creates a client from configuration, building its own HTTP client.
    pub fn from_config(config: &CatalogConfig) -> CatalogResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| CatalogError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self::new(client, &config.api_root(), config.access_token.clone())?
            .with_auth_scheme(config.auth_scheme)
            .with_retry_config(config.retry.clone()))
    }

    pub fn with_auth_scheme(mut self, auth_scheme: AuthScheme) -> Self {
        self.auth_scheme = auth_scheme;
        self
    }

    pub fn with_retry_config(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.api_root.clone();
        // `new` rejects cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        let request = request.header(header::ACCEPT, "application/json");
        match self.auth_scheme {
            AuthScheme::AccessToken => request.header(ACCESS_TOKEN_HEADER, &self.access_token),
            AuthScheme::Bearer => request.bearer_auth(&self.access_token),
        }
    }
}

/// All `Link` fields of a response joined into one list.
///
/// Servers may split relations over several fields, so reading only the
/// first one can lose the `next` entry.
fn link_header(headers: &HeaderMap) -> Option<String> {
    let values: Vec<&str> = headers
        .get_all(header::LINK)
        .iter()
        .filter_map(|value| match value.to_str() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(
                    value = ?value,
                    "Ignoring non-ASCII Link header; a next page it names will be missed"
                );
                None
            }
        })
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.join(", "))
    }
}

#[async_trait]
impl CatalogReader for HttpCatalogClient {
    #[instrument(skip(self), fields(has_cursor = cursor.is_some()))]
    async fn list_page(&self, cursor: Option<&str>, page_size: u32) -> CatalogResult<Page> {
        let url = self.endpoint(&["products.json"]);
        let limit = page_size.clamp(1, MAX_PAGE_SIZE).to_string();

        // No tag, date, status or field filters: the listing is always the
        // full catalog and filtering happens locally.
        let mut query: Vec<(&str, &str)> = vec![("limit", limit.as_str())];
        if let Some(cursor) = cursor {
            query.push((PAGE_INFO_PARAM, cursor));
        }

        let response = with_retry(&self.retry, "list_products", || {
            self.authorize(self.client.get(url.clone()))
                .query(&query)
                .send()
        })
        .await?;

        let status = response.status();
        let link = link_header(response.headers());
        let body = response.text().await?;

        if !status.is_success() {
            return Err(CatalogError::remote(status, &body));
        }

        let listing: ProductListResponse = if body.trim().is_empty() {
            ProductListResponse::default()
        } else {
            serde_json::from_str(&body).map_err(|e| {
                CatalogError::InvalidResponse(format!("Failed to parse product listing: {}", e))
            })?
        };

        let items: Vec<CatalogItem> = listing.products.into_iter().map(CatalogItem::from).collect();
        let next_cursor = link.as_deref().and_then(next_cursor);

        tracing::debug!(
            items = items.len(),
            has_next = next_cursor.is_some(),
            "Fetched catalog page"
        );

        Ok(Page { items, next_cursor })
    }
}

#[async_trait]
impl CatalogWriter for HttpCatalogClient {
    #[instrument(skip(self, id), fields(item_id = %id))]
    async fn delete(&self, id: &ItemId) -> CatalogResult<()> {
        let file_name = format!("{}.json", id);
        let url = self.endpoint(&["products", &file_name]);

        let response = self.authorize(self.client.delete(url)).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(CatalogError::remote(status, &body));
        }

        Ok(())
    }
}
