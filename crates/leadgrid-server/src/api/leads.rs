//! GET /api/v1/leads — stored-lead listing with optional filters.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use leadgrid_db::LeadFilter;

use super::{map_db_error, ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct LeadsQuery {
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    /// Substring match on the company name.
    pub q: Option<String>,
}

pub(super) async fn list_leads(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<LeadsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let filter = LeadFilter {
        city: query.city,
        neighborhood: query.neighborhood,
        name: query.q,
    };

    let rows = leadgrid_db::list_leads(&state.pool, &filter)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: rows,
        meta: ResponseMeta::new(req_id.0),
    }))
}
