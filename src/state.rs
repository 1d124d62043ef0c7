use std::sync::Arc;

use crate::extract::MetadataExtractor;

/// Shared application state passed to all handlers.
/// The extractor is built once at startup and holds no per-request data.
#[derive(Clone)]
pub struct AppState {
    pub extractor: Arc<MetadataExtractor>,
}
