//! POST /api/v1/search — run the pipeline and persist the results.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};

use leadgrid_core::{Lead, SearchCriteria, SearchMode};
use leadgrid_db::UpsertSummary;

use super::{map_db_error, map_pipeline_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct SearchBody {
    pub state: Option<String>,
    /// Single-city form; merged with `cities`.
    pub city: Option<String>,
    #[serde(default)]
    pub cities: Vec<String>,
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    pub max_results: Option<u32>,
    pub pages_per_query: Option<u32>,
    /// `text` (default), `nearby`, or `grid`.
    pub mode: Option<String>,
    pub radius_m: Option<u32>,
    pub grid_points: Option<u32>,
}

/// Resolves the flat mode knobs into a [`SearchMode`].
pub(super) fn resolve_mode(
    mode: Option<&str>,
    radius_m: Option<u32>,
    grid_points: Option<u32>,
) -> Result<SearchMode, String> {
    SearchMode::from_knobs(mode, radius_m, grid_points).map_err(|unknown| {
        format!("unknown search mode '{unknown}' (expected text, nearby, or grid)")
    })
}

#[derive(Debug, Serialize)]
pub(super) struct SearchData {
    pub results: Vec<Lead>,
    pub total: usize,
    pub terms_used: Vec<String>,
    pub persisted: UpsertSummary,
}

pub(super) async fn run_search(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<SearchBody>,
) -> Result<impl IntoResponse, ApiError> {
    let mut cities = body.cities;
    if let Some(city) = body.city {
        cities.push(city);
    }

    let mode = resolve_mode(body.mode.as_deref(), body.radius_m, body.grid_points)
        .map_err(|message| ApiError::new(req_id.0.clone(), "validation_error", message))?;

    let criteria = SearchCriteria::new(
        body.state,
        cities,
        body.neighborhood,
        body.keywords,
        body.max_results,
        body.pages_per_query,
        mode,
    )
    .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let Some(runner) = state.runner.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "missing_credential",
            "GOOGLE_MAPS_API_KEY is not configured",
        ));
    };

    let outcome = runner
        .run(&criteria)
        .await
        .map_err(|e| map_pipeline_error(req_id.0.clone(), &e))?;

    let persisted = leadgrid_db::upsert_leads(&state.pool, &outcome.leads)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(
        inserted = persisted.inserted,
        updated = persisted.updated,
        skipped = persisted.skipped,
        "search results persisted"
    );

    let total = outcome.leads.len();
    Ok(Json(ApiResponse {
        data: SearchData {
            results: outcome.leads,
            total,
            terms_used: outcome.terms,
            persisted,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
