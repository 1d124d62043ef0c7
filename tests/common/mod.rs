// Each integration test file is a separate binary; helpers not used in every
// binary would otherwise trigger dead_code warnings from clippy.
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    routing::get as get_route,
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use url::Url;

use wishlist_server::{
    extract::MetadataExtractor,
    fetch::{FetchError, PageFetcher},
    handlers,
    state::AppState,
};

pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

// ── Fixture fetcher ──────────────────────────────────────────────────────────

/// Canned response for one URL.
#[derive(Clone)]
pub enum Fixture {
    Page(String),
    Status(u16),
    /// Never completes; exercises the extractor's timeout.
    Hang,
}

/// In-memory [`PageFetcher`] that records every URL it is asked for.
#[derive(Default)]
pub struct FixtureFetcher {
    fixtures: HashMap<String, Fixture>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FixtureFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(mut self, url: &str, html: &str) -> Self {
        self.fixtures
            .insert(url.to_string(), Fixture::Page(html.to_string()));
        self
    }

    pub fn status(mut self, url: &str, code: u16) -> Self {
        self.fixtures.insert(url.to_string(), Fixture::Status(code));
        self
    }

    pub fn hang(mut self, url: &str) -> Self {
        self.fixtures.insert(url.to_string(), Fixture::Hang);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for FixtureFetcher {
    async fn fetch(&self, url: &Url) -> Result<String, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(url.to_string());

        // Yield so concurrent calls interleave.
        tokio::task::yield_now().await;

        match self.fixtures.get(url.as_str()) {
            Some(Fixture::Page(html)) => Ok(html.clone()),
            Some(Fixture::Status(code)) => Err(FetchError::Status(*code)),
            Some(Fixture::Hang) => std::future::pending().await,
            None => Err(FetchError::Status(404)),
        }
    }
}

// ── App builders ─────────────────────────────────────────────────────────────

pub fn extractor(fetcher: Arc<FixtureFetcher>) -> MetadataExtractor {
    MetadataExtractor::new(fetcher, TEST_TIMEOUT)
}

/// Build the application router around the given fetcher.
pub fn create_test_app(fetcher: Arc<FixtureFetcher>) -> Router {
    create_test_app_with_timeout(fetcher, TEST_TIMEOUT)
}

pub fn create_test_app_with_timeout(fetcher: Arc<FixtureFetcher>, timeout: Duration) -> Router {
    let state = AppState {
        extractor: Arc::new(MetadataExtractor::new(fetcher, timeout)),
    };
    Router::new()
        .route("/health", get_route(handlers::health_check))
        .route("/api/metadata", get_route(handlers::metadata::get_metadata))
        .with_state(state)
}

/// `/api/metadata?url=…` with `target` percent-encoded.
pub fn metadata_uri(target: &str) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(target.as_bytes()).collect();
    format!("/api/metadata?url={encoded}")
}

// ── Request helpers ──────────────────────────────────────────────────────────

pub async fn get(app: Router, uri: &str) -> (StatusCode, Value) {
    let req = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(app, req).await
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: Value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, json)
}
