//! UI-layer composition: the map view and its rendering-surface sink.
//!
//! `MapView` owns the page loader and the viewport controller, forwards the
//! first-data notification between them, and pushes their published state to
//! a `RenderSurface` only when the corresponding revision moved.

use collection::{FeatureSource, FetchError, LoadOutcome, LoaderConfig, PageLoader};
use serde_json::{json, Value};
use tracing::info;
use viewport::{ViewportConfig, ViewportController};

/// Sink half of the rendering surface: accepts a feature collection and a
/// camera directive as data, and is never queried back.
pub trait RenderSurface {
    fn set_shape(&mut self, collection: Value);
    fn set_camera(&mut self, camera: Value);
}

/// Rendering surface stand-in that writes NDJSON lines to stdout.
pub struct StdoutSurface;

impl RenderSurface for StdoutSurface {
    fn set_shape(&mut self, collection: Value) {
        println!("{}", json!({ "kind": "shape", "shape": collection }));
    }

    fn set_camera(&mut self, camera: Value) {
        println!("{}", json!({ "kind": "camera", "camera": camera }));
    }
}

/// Values for the status chrome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewStatus {
    pub loading: bool,
    pub number_matched: Option<u64>,
    pub feature_count: usize,
}

pub struct MapView {
    loader: PageLoader,
    viewport: ViewportController,
    pushed_shape: Option<u64>,
    pushed_camera: Option<u64>,
}

impl MapView {
    pub fn new(loader: LoaderConfig, viewport: ViewportConfig) -> Self {
        Self {
            loader: PageLoader::new(loader),
            viewport: ViewportController::new(viewport),
            pushed_shape: None,
            pushed_camera: None,
        }
    }

    /// Load and merge the next page, recentering on the first data.
    pub async fn load_more(
        &mut self,
        source: &dyn FeatureSource,
    ) -> Result<LoadOutcome, FetchError> {
        let outcome = self.loader.load_next_page(source).await?;
        match &outcome {
            LoadOutcome::Merged {
                appended,
                discarded,
                first_data,
            } => {
                info!(
                    "loaded {appended} features ({discarded} over the ceiling), {} held",
                    self.loader.feature_count()
                );
                if let Some(center) = first_data {
                    self.viewport.on_first_data(*center);
                }
            }
            LoadOutcome::InFlight => info!("load skipped: a page fetch is in flight"),
            LoadOutcome::AtCapacity => info!("load skipped: feature ceiling reached"),
        }
        Ok(outcome)
    }

    pub async fn refresh_matched_count(
        &mut self,
        source: &dyn FeatureSource,
    ) -> Result<(), FetchError> {
        self.loader.fetch_matched_count(source).await
    }

    pub fn zoom_in(&mut self) -> bool {
        self.viewport.zoom_in()
    }

    pub fn zoom_out(&mut self) -> bool {
        self.viewport.zoom_out()
    }

    pub fn reset(&mut self) {
        self.loader.reset();
        self.viewport.reset();
    }

    pub fn status(&self) -> ViewStatus {
        ViewStatus {
            loading: self.loader.is_loading(),
            number_matched: self.loader.matched_count(),
            feature_count: self.loader.feature_count(),
        }
    }

    pub fn last_error(&self) -> Option<String> {
        self.loader.last_error().map(|e| e.to_string())
    }

    /// Push state the rendering surface has not seen yet.
    pub fn sync(&mut self, surface: &mut dyn RenderSurface) {
        let shape_rev = self.loader.revision();
        if self.pushed_shape != Some(shape_rev) {
            surface.set_shape(json!({
                "type": "FeatureCollection",
                "features": self.loader.features(),
            }));
            self.pushed_shape = Some(shape_rev);
        }

        let camera_rev = self.viewport.revision();
        if self.pushed_camera != Some(camera_rev) {
            let directive = self.viewport.directive();
            surface.set_camera(json!({
                "center": directive.center.to_array(),
                "zoom": directive.zoom,
                "animation": {
                    "mode": directive.animation.mode.as_str(),
                    "durationMs": directive.animation.duration_ms,
                },
            }));
            self.pushed_camera = Some(camera_rev);
        }
    }
}
