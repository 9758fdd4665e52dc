//! POST /api/v1/export — lead rows as a downloadable XLSX workbook.

use axum::{
    http::header,
    response::IntoResponse,
    Extension, Json,
};
use serde::Deserialize;

use leadgrid_export::{sanitize_filename, write_workbook, ExportRow};

use super::ApiError;
use crate::middleware::RequestId;

const XLSX_CONTENT_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

#[derive(Debug, Deserialize)]
pub(super) struct ExportBody {
    #[serde(default)]
    pub rows: Vec<ExportRow>,
    pub filename: Option<String>,
}

pub(super) async fn export_xlsx(
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<ExportBody>,
) -> Result<impl IntoResponse, ApiError> {
    let filename = sanitize_filename(body.filename.as_deref().unwrap_or("leads"));

    let bytes = write_workbook(&body.rows).map_err(|e| {
        tracing::error!(error = %e, "workbook generation failed");
        ApiError::new(
            req_id.0.clone(),
            "internal_error",
            "failed to generate the spreadsheet",
        )
    })?;

    tracing::info!(rows = body.rows.len(), filename = %filename, "export generated");

    Ok((
        [
            (header::CONTENT_TYPE, XLSX_CONTENT_TYPE.to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}.xlsx\""),
            ),
        ],
        bytes,
    ))
}
