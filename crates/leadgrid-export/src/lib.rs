//! Spreadsheet export for lead rows.
//!
//! One worksheet, fixed column set, bold frozen header row with an
//! autofilter. Produces the workbook as in-memory bytes so the HTTP handler
//! and the CLI can decide where they go.

use rust_xlsxwriter::{Format, Workbook, XlsxError};
use serde::{Deserialize, Serialize};

use leadgrid_core::Lead;

const SHEET_NAME: &str = "Leads";

const HEADERS: &[(&str, f64)] = &[
    ("Company", 35.0),
    ("City", 18.0),
    ("Neighborhood", 22.0),
    ("Address", 45.0),
    ("Postal code", 12.0),
    ("Area code", 8.0),
    ("Phone", 20.0),
    ("Website", 30.0),
];

/// One spreadsheet row. Absent values render as empty cells.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExportRow {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub neighborhood: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub area_code: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub website: String,
}

impl From<&Lead> for ExportRow {
    fn from(lead: &Lead) -> Self {
        Self {
            name: lead.name.clone(),
            city: lead.city.clone(),
            neighborhood: lead.neighborhood.clone(),
            address: lead.address.clone(),
            postal_code: lead.postal_code.clone().unwrap_or_default(),
            area_code: lead.area_code.clone().unwrap_or_default(),
            phone: lead.phone.clone().unwrap_or_default(),
            website: lead.website.clone().unwrap_or_default(),
        }
    }
}

/// Builds the XLSX workbook and returns its bytes.
///
/// # Errors
///
/// Returns [`XlsxError`] if the workbook cannot be assembled.
pub fn write_workbook(rows: &[ExportRow]) -> Result<Vec<u8>, XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();
    sheet.set_name(SHEET_NAME)?;

    let header_format = Format::new().set_bold();
    for (col, (header, width)) in HEADERS.iter().enumerate() {
        let col = u16::try_from(col).unwrap_or(u16::MAX);
        sheet.write_string_with_format(0, col, *header, &header_format)?;
        sheet.set_column_width(col, *width)?;
    }
    sheet.set_freeze_panes(1, 0)?;

    for (i, row) in rows.iter().enumerate() {
        let r = u32::try_from(i + 1).unwrap_or(u32::MAX);
        sheet.write_string(r, 0, &row.name)?;
        sheet.write_string(r, 1, &row.city)?;
        sheet.write_string(r, 2, &row.neighborhood)?;
        sheet.write_string(r, 3, &row.address)?;
        sheet.write_string(r, 4, &row.postal_code)?;
        sheet.write_string(r, 5, &row.area_code)?;
        sheet.write_string(r, 6, &row.phone)?;
        sheet.write_string(r, 7, &row.website)?;
    }

    let last_row = u32::try_from(rows.len()).unwrap_or(u32::MAX);
    let last_col = u16::try_from(HEADERS.len() - 1).unwrap_or(u16::MAX);
    sheet.autofilter(0, 0, last_row, last_col)?;

    workbook.save_to_buffer()
}

/// Sanitizes a caller-supplied export filename (no extension).
///
/// Anything outside `[A-Za-z0-9-_]` becomes `_`; blank input falls back to
/// `leads`.
#[must_use]
pub fn sanitize_filename(raw: &str) -> String {
    let cleaned: String = raw
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '-' || c == '_' {
                c
            } else {
                '_'
            }
        })
        .collect();
    if cleaned.is_empty() {
        "leads".to_owned()
    } else {
        cleaned
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_row() -> ExportRow {
        ExportRow {
            name: "Munck Santos".to_owned(),
            city: "Santos".to_owned(),
            neighborhood: "Gonzaga".to_owned(),
            address: "Rua A, 1".to_owned(),
            postal_code: "11010-000".to_owned(),
            area_code: "13".to_owned(),
            phone: "(13) 3333-4444".to_owned(),
            website: "https://example.com".to_owned(),
        }
    }

    #[test]
    fn workbook_bytes_are_a_zip_archive() {
        let bytes = write_workbook(&[sample_row()]).expect("workbook");
        // XLSX is a zip container; check the magic header.
        assert!(bytes.len() > 4);
        assert_eq!(&bytes[..2], b"PK");
    }

    #[test]
    fn empty_row_set_still_produces_a_workbook() {
        let bytes = write_workbook(&[]).expect("workbook");
        assert!(!bytes.is_empty());
    }

    #[test]
    fn export_row_from_lead_fills_blanks() {
        let lead = Lead {
            name: "Alpha".to_owned(),
            city: "Santos".to_owned(),
            ..Lead::default()
        };
        let row = ExportRow::from(&lead);
        assert_eq!(row.name, "Alpha");
        assert_eq!(row.phone, "");
        assert_eq!(row.postal_code, "");
    }

    #[test]
    fn sanitize_filename_replaces_specials_and_defaults() {
        assert_eq!(sanitize_filename("leads são paulo"), "leads_s_o_paulo");
        assert_eq!(sanitize_filename("relatorio-2026_08"), "relatorio-2026_08");
        assert_eq!(sanitize_filename("  "), "leads");
        assert_eq!(sanitize_filename("../../etc/passwd"), "______etc_passwd");
    }
}
