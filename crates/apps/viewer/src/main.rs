use std::env;

use collection::{HttpFeatureSource, LoaderConfig};
use foundation::{LngLat, ZoomRange};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use viewport::ViewportConfig;

mod view;

use view::{MapView, StdoutSurface};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Ok(items_url) = env::var("VIEWER_COLLECTION_URL") else {
        error!("VIEWER_COLLECTION_URL is required (items endpoint of the collection)");
        std::process::exit(2);
    };

    let page_size: u32 = env::var("VIEWER_PAGE_SIZE")
        .unwrap_or_else(|_| "500".to_string())
        .parse()
        .expect("invalid VIEWER_PAGE_SIZE");
    let capacity: usize = env::var("VIEWER_CAPACITY")
        .unwrap_or_else(|_| "10000".to_string())
        .parse()
        .expect("invalid VIEWER_CAPACITY");
    let zoom_step: f64 = env::var("VIEWER_ZOOM_STEP")
        .unwrap_or_else(|_| "0.5".to_string())
        .parse()
        .expect("invalid VIEWER_ZOOM_STEP");
    let min_zoom: f64 = env::var("VIEWER_MIN_ZOOM")
        .unwrap_or_else(|_| "0".to_string())
        .parse()
        .expect("invalid VIEWER_MIN_ZOOM");
    let max_zoom: f64 = env::var("VIEWER_MAX_ZOOM")
        .unwrap_or_else(|_| "9".to_string())
        .parse()
        .expect("invalid VIEWER_MAX_ZOOM");
    let start_zoom: f64 = env::var("VIEWER_START_ZOOM")
        .unwrap_or_else(|_| "4".to_string())
        .parse()
        .expect("invalid VIEWER_START_ZOOM");

    let mut source = HttpFeatureSource::new(items_url);
    if let Ok(key) = env::var("VIEWER_API_KEY") {
        source = source.with_api_key(key);
    }

    let mut view = MapView::new(
        LoaderConfig {
            page_size,
            capacity,
        },
        ViewportConfig {
            zoom_step,
            zoom_range: ZoomRange::new(min_zoom, max_zoom),
            start_center: LngLat::new(0.0, 0.0),
            start_zoom,
        },
    );
    let mut surface = StdoutSurface;

    // Total count and the first page up front; failures are logged inside
    // the loader and stay retryable from the command loop.
    let _ = view.refresh_matched_count(&source).await;
    let _ = view.load_more(&source).await;
    view.sync(&mut surface);

    info!("commands: more | in | out | status | reset | quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        match line.trim() {
            "" => {}
            "more" => {
                let _ = view.load_more(&source).await;
            }
            "in" => {
                view.zoom_in();
            }
            "out" => {
                view.zoom_out();
            }
            "status" => {
                let status = view.status();
                println!(
                    "{}",
                    json!({
                        "kind": "status",
                        "loading": status.loading,
                        "numberMatched": status.number_matched,
                        "featureCount": status.feature_count,
                        "lastError": view.last_error(),
                    })
                );
            }
            "reset" => view.reset(),
            "quit" | "exit" => break,
            other => warn!("unknown command: {other}"),
        }
        view.sync(&mut surface);
    }
}
