//! POST /api/v1/enrich — batch re-enrichment of stored leads by place id.
//!
//! One detail lookup per id; failures count against `enriched_fail` without
//! stopping the batch, and the successes are upserted in one round-trip.

use axum::{extract::State, response::IntoResponse, Extension, Json};
use serde::{Deserialize, Serialize};

use leadgrid_core::Lead;
use leadgrid_pipeline::enrich::apply_detail;
use leadgrid_pipeline::locality::extract_city;
use leadgrid_places::Candidate;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct EnrichBody {
    #[serde(default, alias = "placeIds")]
    pub place_ids: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct EnrichData {
    pub enriched_ok: usize,
    pub enriched_fail: usize,
}

pub(super) async fn enrich_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<EnrichBody>,
) -> Result<impl IntoResponse, ApiError> {
    let mut seen = std::collections::HashSet::new();
    let place_ids: Vec<String> = body
        .place_ids
        .iter()
        .map(|id| id.trim().to_owned())
        .filter(|id| !id.is_empty())
        .filter(|id| seen.insert(id.clone()))
        .collect();

    if place_ids.is_empty() {
        return Err(ApiError::new(
            req_id.0,
            "validation_error",
            "place_ids is required",
        ));
    }

    let Some(places) = state.places.as_ref() else {
        return Err(ApiError::new(
            req_id.0,
            "missing_credential",
            "GOOGLE_MAPS_API_KEY is not configured",
        ));
    };

    let mut enriched: Vec<Lead> = Vec::new();
    let mut enriched_fail = 0usize;

    for place_id in &place_ids {
        match places.place_details(place_id).await {
            Ok(detail) => {
                let candidate = Candidate {
                    place_id: Some(place_id.clone()),
                    ..Candidate::default()
                };
                let mut lead = leadgrid_pipeline::enrich::lead_from_candidate(&candidate);
                // City left blank when unresolvable; the upsert never
                // overwrites a stored value with a blank.
                lead.city = extract_city(&detail.address_components).unwrap_or_default();
                apply_detail(&mut lead, &detail);
                enriched.push(lead);
            }
            Err(err) => {
                tracing::warn!(place_id = %place_id, error = %err, "enrichment lookup failed");
                enriched_fail += 1;
            }
        }
    }

    let summary = leadgrid_db::upsert_leads(&state.pool, &enriched)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    tracing::info!(
        requested = place_ids.len(),
        enriched_ok = enriched.len(),
        enriched_fail,
        inserted = summary.inserted,
        updated = summary.updated,
        "enrichment batch complete"
    );

    Ok(Json(ApiResponse {
        data: EnrichData {
            enriched_ok: enriched.len(),
            enriched_fail,
        },
        meta: ResponseMeta::new(req_id.0),
    }))
}
