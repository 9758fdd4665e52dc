//! Conversion of raw candidates into leads and merge of detail lookups.
//!
//! "Fill gaps, never overwrite with blank": a detail field replaces the
//! candidate's value only when the detail actually carries one, and a failed
//! lookup leaves the un-enriched lead intact.

use std::sync::OnceLock;

use leadgrid_core::Lead;
use leadgrid_places::{Candidate, PlaceDetail};
use regex::Regex;

use crate::locality::extract_neighborhood;

const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/?q=place_id:";

/// Extracts the two-digit area code from a `(11) 99999-0000` style phone.
#[must_use]
pub fn area_code(phone: &str) -> Option<String> {
    static AREA_CODE: OnceLock<Regex> = OnceLock::new();
    let re = AREA_CODE.get_or_init(|| {
        Regex::new(r"\((\d{2})\)").expect("area code pattern is valid")
    });
    re.captures(phone).map(|caps| caps[1].to_owned())
}

/// Extracts the postal code component from a detail payload.
#[must_use]
pub fn postal_code(detail: &PlaceDetail) -> Option<String> {
    detail
        .address_components
        .iter()
        .find(|c| c.types.iter().any(|t| t == "postal_code"))
        .map(|c| c.long_name.clone())
        .filter(|code| !code.is_empty())
}

/// Builds the un-enriched lead skeleton for a raw candidate.
///
/// City and neighborhood stay empty until the locality filter resolves them.
#[must_use]
pub fn lead_from_candidate(candidate: &Candidate) -> Lead {
    Lead {
        place_id: candidate.place_id.clone(),
        name: candidate.name.clone(),
        address: candidate.address().to_owned(),
        maps_url: candidate
            .place_id
            .as_deref()
            .map(|id| format!("{MAPS_PLACE_URL}{id}")),
        ..Lead::default()
    }
}

/// Merges a successful detail lookup into a lead.
///
/// Detail fields are authoritative when present; absent or blank detail
/// fields never clobber what the candidate already provided.
pub fn apply_detail(lead: &mut Lead, detail: &PlaceDetail) {
    fn prefer(slot: &mut String, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            *slot = v.to_owned();
        }
    }

    fn prefer_opt(slot: &mut Option<String>, value: Option<&str>) {
        if let Some(v) = value.map(str::trim).filter(|v| !v.is_empty()) {
            *slot = Some(v.to_owned());
        }
    }

    prefer(&mut lead.name, detail.name.as_deref());
    prefer(&mut lead.address, detail.formatted_address.as_deref());

    // International format first, local format as the fallback.
    let phone = detail
        .international_phone_number
        .as_deref()
        .or(detail.formatted_phone_number.as_deref());
    prefer_opt(&mut lead.phone, phone);

    // The area code reads best from the local format.
    if let Some(local) = detail
        .formatted_phone_number
        .as_deref()
        .or(detail.international_phone_number.as_deref())
    {
        if lead.area_code.is_none() {
            lead.area_code = area_code(local);
        }
    }

    prefer_opt(&mut lead.website, detail.website.as_deref());
    prefer_opt(&mut lead.maps_url, detail.url.as_deref());

    if lead.postal_code.is_none() {
        lead.postal_code = postal_code(detail);
    }
    if lead.neighborhood.is_empty() {
        lead.neighborhood = extract_neighborhood(&detail.address_components).unwrap_or_default();
    }

    lead.enriched = true;
}
