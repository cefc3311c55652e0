//! Transport seam for the remote paginated collection.
//!
//! This module defines the `FeatureSource` trait and its implementations:
//! - Remote HTTP items endpoint (`limit`/`offset` query pagination)
//! - In-memory windowed source for tests and fixtures
//!
//! New transports can be added by implementing the `FeatureSource` trait.

use std::future::Future;
use std::pin::Pin;
use std::sync::Mutex;

use crate::feature::{CollectionMeta, FeaturePage};

/// Error type for collection fetches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// Non-success HTTP-equivalent status from the page or meta endpoint.
    BadStatus(u16),
    /// Network failure or malformed body; the whole page is discarded.
    Transport(String),
}

impl FetchError {
    pub fn transport(cause: impl Into<String>) -> Self {
        FetchError::Transport(cause.into())
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FetchError::BadStatus(code) => write!(f, "unexpected status {code}"),
            FetchError::Transport(cause) => write!(f, "transport failure: {cause}"),
        }
    }
}

impl std::error::Error for FetchError {}

/// Type alias for a boxed future that can be sent between threads.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Trait for paginated feature collection endpoints.
///
/// Implementations must be `Send + Sync` for use across async tasks.
/// Methods return boxed futures for dyn-compatibility.
pub trait FeatureSource: Send + Sync {
    /// Fetch one page window of the collection.
    fn fetch_page(&self, offset: u64, limit: u32)
        -> BoxFuture<'_, Result<FeaturePage, FetchError>>;

    /// Fetch the collection metadata (total matched count).
    ///
    /// Issued without pagination parameters; independent of page fetches.
    fn fetch_meta(&self) -> BoxFuture<'_, Result<CollectionMeta, FetchError>>;
}

/// A parsed page is only handed out whole; one bad feature rejects it.
fn validated(page: FeaturePage) -> Result<FeaturePage, FetchError> {
    for feature in &page.features {
        if !feature.lng_lat().is_finite() {
            return Err(FetchError::transport(format!(
                "feature {} has non-finite coordinates",
                feature.id
            )));
        }
    }
    Ok(page)
}

/// Remote items endpoint reached over HTTP.
pub struct HttpFeatureSource {
    items_url: String,
    api_key: Option<String>,
    client: reqwest::Client,
}

impl HttpFeatureSource {
    pub fn new(items_url: impl Into<String>) -> Self {
        Self {
            items_url: items_url.into(),
            api_key: None,
            client: reqwest::Client::new(),
        }
    }

    /// Endpoints that authenticate via an `api_key` query parameter.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    fn url_with(&self, params: &[(&str, String)]) -> String {
        let mut url = self.items_url.trim_end_matches('/').to_string();
        let mut sep = if url.contains('?') { '&' } else { '?' };
        for (name, value) in params {
            url.push(sep);
            url.push_str(name);
            url.push('=');
            url.push_str(value);
            sep = '&';
        }
        if let Some(key) = &self.api_key {
            url.push(sep);
            url.push_str("api_key=");
            url.push_str(key);
        }
        url
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, FetchError> {
        let resp = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::transport(format!("request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::BadStatus(status.as_u16()));
        }

        resp.json::<T>()
            .await
            .map_err(|e| FetchError::transport(format!("invalid response body: {e}")))
    }
}

impl FeatureSource for HttpFeatureSource {
    fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
    ) -> BoxFuture<'_, Result<FeaturePage, FetchError>> {
        let url = self.url_with(&[("limit", limit.to_string()), ("offset", offset.to_string())]);
        Box::pin(async move { validated(self.get_json::<FeaturePage>(url).await?) })
    }

    fn fetch_meta(&self) -> BoxFuture<'_, Result<CollectionMeta, FetchError>> {
        let url = self.url_with(&[]);
        Box::pin(async move { self.get_json::<CollectionMeta>(url).await })
    }
}

/// In-memory windowed source for tests and fixtures.
///
/// Failures can be scripted one-shot; `pages_served` counts every page
/// fetch that reached the source, so tests can assert that a call was
/// (or was not) issued.
pub struct MemoryFeatureSource {
    features: Vec<crate::feature::Feature>,
    matched: Option<u64>,
    fail_page: Mutex<Option<FetchError>>,
    fail_meta: Mutex<Option<FetchError>>,
    pages_served: Mutex<usize>,
}

impl MemoryFeatureSource {
    pub fn new(features: Vec<crate::feature::Feature>) -> Self {
        Self {
            features,
            matched: None,
            fail_page: Mutex::new(None),
            fail_meta: Mutex::new(None),
            pages_served: Mutex::new(0),
        }
    }

    /// Report a matched count different from the stored feature count.
    pub fn with_matched(mut self, matched: u64) -> Self {
        self.matched = Some(matched);
        self
    }

    /// Queue a one-shot failure for the next page fetch.
    pub fn fail_next_page(&self, err: FetchError) {
        *self.fail_page.lock().unwrap() = Some(err);
    }

    /// Queue a one-shot failure for the next meta fetch.
    pub fn fail_next_meta(&self, err: FetchError) {
        *self.fail_meta.lock().unwrap() = Some(err);
    }

    /// Number of page fetches that reached this source, failures included.
    pub fn pages_served(&self) -> usize {
        *self.pages_served.lock().unwrap()
    }
}

impl FeatureSource for MemoryFeatureSource {
    fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
    ) -> BoxFuture<'_, Result<FeaturePage, FetchError>> {
        Box::pin(async move {
            *self.pages_served.lock().unwrap() += 1;
            if let Some(err) = self.fail_page.lock().unwrap().take() {
                return Err(err);
            }
            let start = (offset as usize).min(self.features.len());
            let end = start.saturating_add(limit as usize).min(self.features.len());
            Ok(FeaturePage {
                features: self.features[start..end].to_vec(),
            })
        })
    }

    fn fetch_meta(&self) -> BoxFuture<'_, Result<CollectionMeta, FetchError>> {
        Box::pin(async move {
            if let Some(err) = self.fail_meta.lock().unwrap().take() {
                return Err(err);
            }
            Ok(CollectionMeta {
                number_matched: self.matched.unwrap_or(self.features.len() as u64),
            })
        })
    }
}
