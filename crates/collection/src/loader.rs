//! Incremental page loader for the remote feature collection.
//!
//! The loader owns the accumulated feature set, the paging cursor, the
//! total-matched count, and the single-flight loading flag. The bookkeeping
//! is a two-phase state machine (`begin_page` / `complete_page`) so it can
//! be driven without a transport; `load_next_page` composes the two phases
//! around an actual fetch.
//!
//! Invariants:
//! - the feature set never exceeds `capacity`; a page that does not fit is
//!   truncated in arrival order and the rest discarded
//! - the cursor advances exactly once per successful merge and never on
//!   failure, so a failed offset is retried by the next call
//! - at most one page fetch is in flight at a time

use foundation::LngLat;
use tracing::{debug, warn};

use crate::feature::{Feature, FeaturePage};
use crate::source::{FeatureSource, FetchError};

/// Default page window requested from the remote collection.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Default ceiling on accumulated features, regardless of the remote total.
pub const DEFAULT_CAPACITY: usize = 10_000;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct LoaderConfig {
    pub page_size: u32,
    pub capacity: usize,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// Offset/limit window for one page fetch.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: u64,
    pub limit: u32,
}

/// Paging bookkeeping; advances only on successful merges.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PagingCursor {
    page_index: u64,
    page_size: u32,
}

impl PagingCursor {
    fn new(page_size: u32) -> Self {
        Self {
            page_index: 0,
            page_size,
        }
    }

    pub fn page_index(&self) -> u64 {
        self.page_index
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    pub fn offset(&self) -> u64 {
        self.page_index * self.page_size as u64
    }

    fn advance(&mut self) {
        self.page_index += 1;
    }
}

/// Result of one load round.
#[derive(Debug, Clone, PartialEq)]
pub enum LoadOutcome {
    /// A page was merged; `discarded` counts features dropped at the ceiling.
    Merged {
        appended: usize,
        discarded: usize,
        /// Coordinates to recenter on, reported at most once per loader
        /// lifetime (first page, at least one feature).
        first_data: Option<LngLat>,
    },
    /// A fetch was already in flight; nothing was requested.
    InFlight,
    /// The feature set is at capacity; nothing was requested.
    AtCapacity,
}

#[derive(Debug)]
pub struct PageLoader {
    config: LoaderConfig,
    features: Vec<Feature>,
    cursor: PagingCursor,
    matched_count: Option<u64>,
    loading: bool,
    first_data_sent: bool,
    last_error: Option<FetchError>,
    revision: u64,
}

impl PageLoader {
    /// Zero-valued config entries are normalized to the defaults.
    pub fn new(config: LoaderConfig) -> Self {
        let config = LoaderConfig {
            page_size: if config.page_size == 0 {
                DEFAULT_PAGE_SIZE
            } else {
                config.page_size
            },
            capacity: if config.capacity == 0 {
                DEFAULT_CAPACITY
            } else {
                config.capacity
            },
        };
        Self {
            cursor: PagingCursor::new(config.page_size),
            config,
            features: Vec::new(),
            matched_count: None,
            loading: false,
            first_data_sent: false,
            last_error: None,
            revision: 0,
        }
    }

    /// Accumulated features, in arrival order.
    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn feature_count(&self) -> usize {
        self.features.len()
    }

    pub fn capacity(&self) -> usize {
        self.config.capacity
    }

    pub fn is_at_capacity(&self) -> bool {
        self.features.len() >= self.config.capacity
    }

    /// Server-reported total; `None` until the meta fetch succeeds.
    pub fn matched_count(&self) -> Option<u64> {
        self.matched_count
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Last page fetch error, kept for status display; cleared by the next
    /// successful merge.
    pub fn last_error(&self) -> Option<&FetchError> {
        self.last_error.as_ref()
    }

    /// Bumped on every published state change; the render loop republishes
    /// the collection when this moves.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn cursor(&self) -> PagingCursor {
        self.cursor
    }

    /// Open a page fetch, or report why none should be issued.
    ///
    /// Returns `None` without any state change when a fetch is already in
    /// flight or the feature set is at capacity; the capacity check happens
    /// here, before any network call is made.
    pub fn begin_page(&mut self) -> Option<PageRequest> {
        if self.loading || self.is_at_capacity() {
            return None;
        }
        self.loading = true;
        Some(PageRequest {
            offset: self.cursor.offset(),
            limit: self.cursor.page_size(),
        })
    }

    /// Close the fetch opened by `begin_page` and merge its result.
    ///
    /// Always clears the loading flag. On success the page is appended up to
    /// the remaining capacity and the cursor advances, truncated or not; on
    /// failure nothing else changes, so the same offset is retried next.
    pub fn complete_page(
        &mut self,
        result: Result<FeaturePage, FetchError>,
    ) -> Result<LoadOutcome, FetchError> {
        self.loading = false;

        let page = match result {
            Ok(page) => page,
            Err(err) => {
                warn!("page {} fetch failed: {err}", self.cursor.page_index());
                self.last_error = Some(err.clone());
                return Err(err);
            }
        };

        let first_page = self.cursor.page_index() == 0;
        let room = self.config.capacity.saturating_sub(self.features.len());
        let total = page.features.len();
        let appended = total.min(room);
        self.features.extend(page.features.into_iter().take(appended));
        self.cursor.advance();
        self.last_error = None;
        self.revision += 1;

        let first_data = if first_page && appended > 0 && !self.first_data_sent {
            self.first_data_sent = true;
            Some(self.features[0].lng_lat())
        } else {
            None
        };

        debug!(
            "merged page {}: kept {appended} of {total}, {} accumulated",
            self.cursor.page_index() - 1,
            self.features.len()
        );

        Ok(LoadOutcome::Merged {
            appended,
            discarded: total - appended,
            first_data,
        })
    }

    /// Fetch and merge the next page.
    ///
    /// Skips without a network call when a fetch is in flight or the ceiling
    /// is reached. Errors are logged and surfaced for display, never fatal;
    /// re-invoking retries the same offset.
    pub async fn load_next_page(
        &mut self,
        source: &dyn FeatureSource,
    ) -> Result<LoadOutcome, FetchError> {
        let Some(request) = self.begin_page() else {
            return Ok(if self.loading {
                LoadOutcome::InFlight
            } else {
                LoadOutcome::AtCapacity
            });
        };
        let result = source.fetch_page(request.offset, request.limit).await;
        self.complete_page(result)
    }

    /// One-shot fetch of the server-reported total matched count.
    ///
    /// A no-op once the count is known. On failure the count stays unknown;
    /// the error is logged and returned but does not disturb `last_error`.
    /// Independent of the page-loading flag.
    pub async fn fetch_matched_count(
        &mut self,
        source: &dyn FeatureSource,
    ) -> Result<(), FetchError> {
        if self.matched_count.is_some() {
            return Ok(());
        }
        match source.fetch_meta().await {
            Ok(meta) => {
                self.matched_count = Some(meta.number_matched);
                self.revision += 1;
                Ok(())
            }
            Err(err) => {
                warn!("matched-count fetch failed: {err}");
                Err(err)
            }
        }
    }

    /// Return to the construction state: empty feature set, cursor at page
    /// zero, latches and error cleared, count unknown.
    pub fn reset(&mut self) {
        self.features.clear();
        self.cursor = PagingCursor::new(self.config.page_size);
        self.matched_count = None;
        self.loading = false;
        self.first_data_sent = false;
        self.last_error = None;
        self.revision += 1;
    }
}
