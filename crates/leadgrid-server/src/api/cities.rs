//! GET /api/v1/cities — municipality list for a state, served from cache.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Extension, Json,
};
use serde::{Deserialize, Serialize};

use leadgrid_munis::MunisError;

use super::{ApiError, ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

#[derive(Debug, Deserialize)]
pub(super) struct CitiesQuery {
    pub uf: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct CitiesData {
    pub uf: String,
    pub cities: Vec<String>,
}

pub(super) async fn list_cities(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<CitiesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let uf = query
        .uf
        .map(|uf| uf.trim().to_uppercase())
        .filter(|uf| !uf.is_empty())
        .unwrap_or_else(|| "SP".to_owned());

    let cities = state
        .munis
        .list_cities(&uf)
        .await
        .map_err(|e| map_munis_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse {
        data: CitiesData { uf, cities },
        meta: ResponseMeta::new(req_id.0),
    }))
}

fn map_munis_error(request_id: String, error: &MunisError) -> ApiError {
    match error {
        MunisError::InvalidUf(uf) => ApiError::new(
            request_id,
            "validation_error",
            format!("invalid state code '{uf}'"),
        ),
        MunisError::Http(e) => {
            tracing::error!(error = %e, "municipality list request failed");
            ApiError::new(
                request_id,
                "upstream_error",
                "municipality list request failed",
            )
        }
        MunisError::Deserialize { context, .. } => {
            tracing::error!(context = %context, "municipality list returned an invalid response");
            ApiError::new(
                request_id,
                "upstream_error",
                "municipality list returned an invalid response",
            )
        }
    }
}
