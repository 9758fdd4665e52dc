//! Read and write operations for the `leads` table.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use leadgrid_core::Lead;

/// Hard cap on listing queries; the UI never pages past this.
const LIST_LIMIT: i64 = 2000;

/// One stored lead row.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct LeadRow {
    pub id: i64,
    pub place_id: String,
    pub name: String,
    pub city: String,
    pub neighborhood: String,
    pub address: String,
    pub postal_code: Option<String>,
    pub area_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub maps_url: Option<String>,
    pub enriched: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Optional ILIKE filters for lead listing.
#[derive(Debug, Clone, Default)]
pub struct LeadFilter {
    pub city: Option<String>,
    pub neighborhood: Option<String>,
    pub name: Option<String>,
}

/// Counts from one batch upsert.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct UpsertSummary {
    pub inserted: u64,
    pub updated: u64,
    /// Rows without a place id cannot be keyed and are not persisted.
    pub skipped: u64,
}

/// Insert new leads and update existing ones, keyed by place id.
///
/// Uses a single `INSERT … SELECT * FROM UNNEST(…) ON CONFLICT` so the whole
/// batch is one round-trip. On conflict, each incoming field only replaces
/// the stored value when it is non-blank — a degraded or partial record
/// never erases detail captured by an earlier run — and `enriched` only ever
/// latches from false to true.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn upsert_leads(pool: &PgPool, leads: &[Lead]) -> Result<UpsertSummary, sqlx::Error> {
    let mut place_ids: Vec<String> = Vec::with_capacity(leads.len());
    let mut names: Vec<String> = Vec::with_capacity(leads.len());
    let mut cities: Vec<String> = Vec::with_capacity(leads.len());
    let mut neighborhoods: Vec<String> = Vec::with_capacity(leads.len());
    let mut addresses: Vec<String> = Vec::with_capacity(leads.len());
    let mut postal_codes: Vec<Option<String>> = Vec::with_capacity(leads.len());
    let mut area_codes: Vec<Option<String>> = Vec::with_capacity(leads.len());
    let mut phones: Vec<Option<String>> = Vec::with_capacity(leads.len());
    let mut websites: Vec<Option<String>> = Vec::with_capacity(leads.len());
    let mut maps_urls: Vec<Option<String>> = Vec::with_capacity(leads.len());
    let mut enricheds: Vec<bool> = Vec::with_capacity(leads.len());

    let mut skipped = 0u64;
    for lead in leads {
        let Some(place_id) = lead.place_id.as_deref().filter(|id| !id.trim().is_empty()) else {
            skipped += 1;
            continue;
        };
        place_ids.push(place_id.to_owned());
        names.push(lead.name.clone());
        cities.push(lead.city.clone());
        neighborhoods.push(lead.neighborhood.clone());
        addresses.push(lead.address.clone());
        postal_codes.push(lead.postal_code.clone());
        area_codes.push(lead.area_code.clone());
        phones.push(lead.phone.clone());
        websites.push(lead.website.clone());
        maps_urls.push(lead.maps_url.clone());
        enricheds.push(lead.enriched);
    }

    if skipped > 0 {
        tracing::debug!(skipped, "leads without a place id were not persisted");
    }
    if place_ids.is_empty() {
        return Ok(UpsertSummary {
            skipped,
            ..UpsertSummary::default()
        });
    }

    let rows: Vec<bool> = sqlx::query_scalar::<_, bool>(
        "INSERT INTO leads \
             (place_id, name, city, neighborhood, address, postal_code, \
              area_code, phone, website, maps_url, enriched) \
         SELECT * FROM UNNEST(\
              $1::text[], $2::text[], $3::text[], $4::text[], $5::text[], $6::text[], \
              $7::text[], $8::text[], $9::text[], $10::text[], $11::bool[]) \
         ON CONFLICT (place_id) DO UPDATE SET \
             name         = COALESCE(NULLIF(EXCLUDED.name, ''), leads.name), \
             city         = COALESCE(NULLIF(EXCLUDED.city, ''), leads.city), \
             neighborhood = COALESCE(NULLIF(EXCLUDED.neighborhood, ''), leads.neighborhood), \
             address      = COALESCE(NULLIF(EXCLUDED.address, ''), leads.address), \
             postal_code  = COALESCE(NULLIF(EXCLUDED.postal_code, ''), leads.postal_code), \
             area_code    = COALESCE(NULLIF(EXCLUDED.area_code, ''), leads.area_code), \
             phone        = COALESCE(NULLIF(EXCLUDED.phone, ''), leads.phone), \
             website      = COALESCE(NULLIF(EXCLUDED.website, ''), leads.website), \
             maps_url     = COALESCE(NULLIF(EXCLUDED.maps_url, ''), leads.maps_url), \
             enriched     = leads.enriched OR EXCLUDED.enriched, \
             updated_at   = NOW() \
         RETURNING (xmax = 0) AS is_new",
    )
    .bind(&place_ids)
    .bind(&names)
    .bind(&cities)
    .bind(&neighborhoods)
    .bind(&addresses)
    .bind(&postal_codes)
    .bind(&area_codes)
    .bind(&phones)
    .bind(&websites)
    .bind(&maps_urls)
    .bind(&enricheds)
    .fetch_all(pool)
    .await?;

    let inserted = rows.iter().filter(|&&is_new| is_new).count() as u64;
    let updated = rows.len() as u64 - inserted;

    Ok(UpsertSummary {
        inserted,
        updated,
        skipped,
    })
}

/// List stored leads, newest first, optionally filtered.
///
/// Filters are substring matches (ILIKE) on city, neighborhood, and name.
///
/// # Errors
///
/// Returns [`sqlx::Error`] if the query fails.
pub async fn list_leads(pool: &PgPool, filter: &LeadFilter) -> Result<Vec<LeadRow>, sqlx::Error> {
    sqlx::query_as::<_, LeadRow>(
        "SELECT id, place_id, name, city, neighborhood, address, postal_code, \
                area_code, phone, website, maps_url, enriched, created_at, updated_at \
         FROM leads \
         WHERE ($1::text IS NULL OR city ILIKE '%' || $1 || '%') \
           AND ($2::text IS NULL OR neighborhood ILIKE '%' || $2 || '%') \
           AND ($3::text IS NULL OR name ILIKE '%' || $3 || '%') \
         ORDER BY created_at DESC \
         LIMIT $4",
    )
    .bind(filter.city.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    .bind(
        filter
            .neighborhood
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty()),
    )
    .bind(filter.name.as_deref().map(str::trim).filter(|s| !s.is_empty()))
    .bind(LIST_LIMIT)
    .fetch_all(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upsert_summary_defaults_to_zero() {
        let summary = UpsertSummary::default();
        assert_eq!(summary.inserted, 0);
        assert_eq!(summary.updated, 0);
        assert_eq!(summary.skipped, 0);
    }

    #[test]
    fn lead_filter_blank_strings_behave_like_absent_filters() {
        // The bind-site normalization is what guarantees this; mirror it here.
        let filter = LeadFilter {
            city: Some("  ".to_owned()),
            ..LeadFilter::default()
        };
        let normalized = filter
            .city
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty());
        assert!(normalized.is_none());
    }

    #[test]
    fn lead_row_serializes_for_the_api() {
        let row = LeadRow {
            id: 1,
            place_id: "pid-1".to_owned(),
            name: "Munck Santos".to_owned(),
            city: "Santos".to_owned(),
            neighborhood: "Gonzaga".to_owned(),
            address: "Rua A, 1".to_owned(),
            postal_code: Some("11010-000".to_owned()),
            area_code: Some("13".to_owned()),
            phone: Some("(13) 3333-4444".to_owned()),
            website: None,
            maps_url: None,
            enriched: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        let json = serde_json::to_string(&row).expect("serialize LeadRow");
        assert!(json.contains("\"place_id\":\"pid-1\""));
        assert!(json.contains("\"enriched\":true"));
    }
}
