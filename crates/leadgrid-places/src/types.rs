//! Wire shapes for the places search, detail, and geocoding endpoints.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// Bounding box of a geocoded area, southwest/northeast corners.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub southwest: LatLng,
    pub northeast: LatLng,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
    #[serde(default)]
    pub viewport: Option<Viewport>,
}

/// One raw row from a search page, before enrichment. Never mutated after
/// creation; the dedup step produces merged copies.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub name: String,
    /// Full address from text search.
    #[serde(default)]
    pub formatted_address: Option<String>,
    /// Short address from nearby search (the API sets one or the other).
    #[serde(default)]
    pub vicinity: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub rating: Option<f64>,
    #[serde(default)]
    pub user_ratings_total: Option<u32>,
}

impl Candidate {
    /// The best raw address string available for this candidate.
    #[must_use]
    pub fn address(&self) -> &str {
        self.formatted_address
            .as_deref()
            .or(self.vicinity.as_deref())
            .unwrap_or("")
    }
}

/// Outcome of one page fetch, after status handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageStatus {
    Ok,
    ZeroResults,
    /// A supplied continuation token never became active within the retry
    /// budget. The page is empty; the run continues.
    TokenNotReady,
}

/// One page of search results.
#[derive(Debug, Clone)]
pub struct SearchPage {
    pub status: PageStatus,
    pub candidates: Vec<Candidate>,
    pub next_page_token: Option<String>,
}

impl SearchPage {
    pub(crate) fn empty(status: PageStatus) -> Self {
        Self {
            status,
            candidates: Vec::new(),
            next_page_token: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddressComponent {
    #[serde(default)]
    pub long_name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

/// Enrichment payload for a single place id.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PlaceDetail {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub formatted_address: Option<String>,
    #[serde(default)]
    pub address_components: Vec<AddressComponent>,
    #[serde(default)]
    pub formatted_phone_number: Option<String>,
    #[serde(default)]
    pub international_phone_number: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

// Raw envelopes. The client checks `status` before handing results out.

#[derive(Debug, Deserialize)]
pub(crate) struct SearchEnvelope {
    pub status: String,
    #[serde(default)]
    pub results: Vec<Candidate>,
    #[serde(default)]
    pub next_page_token: Option<String>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct DetailEnvelope {
    pub status: String,
    #[serde(default)]
    pub result: Option<PlaceDetail>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeEnvelope {
    pub status: String,
    #[serde(default)]
    pub results: Vec<GeocodeResult>,
    #[serde(default)]
    pub error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResult {
    pub geometry: Geometry,
}

/// A geocoded area: center point plus bounding viewport when the API
/// provides one.
#[derive(Debug, Clone, Copy)]
pub struct GeocodedArea {
    pub center: LatLng,
    pub viewport: Option<Viewport>,
}
