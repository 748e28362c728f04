//! HTTP implementation of [`CatalogFetcher`] against a listings server.

use std::time::Duration;

use async_trait::async_trait;
use listings_core::messages::{ListItemsParams, ListItemsResponse, WireFormat};
use listings_core::{Item, QueryDescriptor, QueryResult};
use reqwest::{header, StatusCode, Url};
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::fetch::{CatalogFetcher, FetchError, FetchOutcome};

/// Connection settings for [`HttpCatalogFetcher`].
#[derive(Debug, Clone)]
pub struct HttpFetcherConfig {
    /// Server root, without a trailing slash.
    pub base_url: String,
    /// Per-request timeout covering connect, send and body read.
    pub timeout: Duration,
    /// Body encoding requested through `Accept`.
    pub wire_format: WireFormat,
}

impl Default for HttpFetcherConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080".to_string(),
            timeout: Duration::from_secs(10),
            wire_format: WireFormat::Json,
        }
    }
}

/// Fetches catalog pages and items over HTTP.
#[derive(Debug, Clone)]
pub struct HttpCatalogFetcher {
    client: reqwest::Client,
    config: HttpFetcherConfig,
}

impl HttpCatalogFetcher {
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be built.
    pub fn new(config: HttpFetcherConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    #[must_use]
    pub fn config(&self) -> &HttpFetcherConfig {
        &self.config
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.config.base_url.trim_end_matches('/'))
    }

    /// `{base_url}/products/{id}` with `id` percent-encoded as a single path
    /// segment, so `/`, `?`, `#` and spaces stay part of the id.
    fn item_url(&self, id: &str) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(&self.config.base_url).map_err(|err| FetchError::Transport(err.to_string()))?;
        url.path_segments_mut()
            .map_err(|()| {
                FetchError::Transport(format!("{} cannot be a base URL", self.config.base_url))
            })?
            .pop_if_empty()
            .push("products")
            .push(id);
        Ok(url)
    }

    /// Sends `request` and decodes a successful body, racing both steps
    /// against `cancel`.
    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        cancel: &CancellationToken,
        on_not_found: impl FnOnce() -> FetchError,
    ) -> FetchOutcome<T> {
        let format = self.config.wire_format;
        let request = request.header(header::ACCEPT, format.content_type());

        let response = tokio::select! {
            biased;
            () = cancel.cancelled() => return FetchOutcome::Aborted,
            sent = request.send() => match sent {
                Ok(response) => response,
                Err(err) => return FetchOutcome::Failure(FetchError::Transport(err.to_string())),
            },
        };

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return FetchOutcome::Failure(on_not_found());
        }
        if !status.is_success() {
            return FetchOutcome::Failure(FetchError::Status {
                status: status.as_u16(),
            });
        }

        let body = tokio::select! {
            biased;
            () = cancel.cancelled() => return FetchOutcome::Aborted,
            body = response.bytes() => match body {
                Ok(body) => body,
                Err(err) => return FetchOutcome::Failure(FetchError::Transport(err.to_string())),
            },
        };

        match format.decode::<T>(&body) {
            Ok(value) => FetchOutcome::Success(value),
            Err(err) => FetchOutcome::Failure(FetchError::Decode(err.to_string())),
        }
    }
}

#[async_trait]
impl CatalogFetcher for HttpCatalogFetcher {
    async fn fetch_page(
        &self,
        query: &QueryDescriptor,
        cancel: &CancellationToken,
    ) -> FetchOutcome<QueryResult> {
        debug!(page = query.page, "GET /products");
        let request = self
            .client
            .get(self.url("/products"))
            .query(&ListItemsParams::from(query));
        match self
            .execute::<ListItemsResponse>(request, cancel, || FetchError::Status { status: 404 })
            .await
        {
            FetchOutcome::Success(response) => FetchOutcome::Success(response.into()),
            FetchOutcome::Failure(err) => FetchOutcome::Failure(err),
            FetchOutcome::Aborted => FetchOutcome::Aborted,
        }
    }

    async fn fetch_item(&self, id: &str, cancel: &CancellationToken) -> FetchOutcome<Item> {
        debug!(id, "GET /products/{{id}}");
        let url = match self.item_url(id) {
            Ok(url) => url,
            Err(err) => return FetchOutcome::Failure(err),
        };
        let request = self.client.get(url);
        self.execute(request, cancel, || FetchError::NotFound { id: id.to_string() })
            .await
    }
}
