use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;
use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::MetadataResult;
use crate::state::AppState;

// ── Query params ───────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct MetadataQuery {
    pub url: Option<String>,
}

// ── Handler ────────────────────────────────────────────────────────────────

/// GET /api/metadata?url=<encoded-url>
///
/// Fetches the page once and returns whatever title, price and og:image it
/// yields. Fields that could not be found are omitted from the response.
pub async fn get_metadata(
    State(state): State<AppState>,
    Query(params): Query<MetadataQuery>,
) -> AppResult<Json<MetadataResult>> {
    let url = params
        .url
        .filter(|u| !u.trim().is_empty())
        .ok_or_else(|| AppError::Validation("URL is required".into()))?;

    info!(url = %url, "Extracting metadata");
    let result = state.extractor.extract(&url).await?;

    Ok(Json(result))
}
