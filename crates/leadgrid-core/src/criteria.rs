//! Validated search input.
//!
//! [`SearchCriteria`] is built once per request, before any external call is
//! made. Construction normalizes cities and keywords (trim, drop empties,
//! case-insensitive dedup preserving the first spelling) and clamps the
//! numeric knobs to platform-safe ranges.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hard ceiling on results per run; protects external-API quota.
pub const MAX_RESULTS: u32 = 120;
/// Default result cap when the caller does not supply one.
pub const DEFAULT_MAX_RESULTS: u32 = 60;
/// The external search API serves at most three pages per query.
pub const MAX_PAGES_PER_QUERY: u32 = 3;
/// Default radius for nearby and grid sweeps, in meters.
pub const DEFAULT_RADIUS_M: u32 = 5_000;
/// Default sample count for grid sweeps.
pub const DEFAULT_GRID_POINTS: u32 = 9;

const DEFAULT_STATE: &str = "SP";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CriteriaError {
    #[error("at least one city is required")]
    NoCity,
}

/// How the pipeline sweeps the requested area.
///
/// One pipeline, parameterized — the mode only changes which
/// (location × term) combinations are fed to the paginated fetcher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SearchMode {
    /// Free-text search: one query per (city × expanded term).
    Text,
    /// Radius search around each city's geocoded center.
    Nearby {
        #[serde(default = "default_radius_m")]
        radius_m: u32,
    },
    /// Tile each city's geocoded viewport with `points` sample points and
    /// run a bounded-radius search at each one.
    Grid {
        #[serde(default = "default_grid_points")]
        points: u32,
        #[serde(default = "default_radius_m")]
        radius_m: u32,
    },
}

fn default_radius_m() -> u32 {
    DEFAULT_RADIUS_M
}

fn default_grid_points() -> u32 {
    DEFAULT_GRID_POINTS
}

impl Default for SearchMode {
    fn default() -> Self {
        Self::Text
    }
}

impl SearchMode {
    /// Resolves the flat wire/CLI knobs (`mode`, `radius_m`, `grid_points`)
    /// into a mode, applying the documented defaults.
    ///
    /// # Errors
    ///
    /// Returns the offending mode string when it is not one of `text`,
    /// `nearby`, or `grid`.
    pub fn from_knobs(
        mode: Option<&str>,
        radius_m: Option<u32>,
        grid_points: Option<u32>,
    ) -> Result<Self, String> {
        match mode.map(str::trim).filter(|m| !m.is_empty()) {
            None => Ok(Self::Text),
            Some(m) if m.eq_ignore_ascii_case("text") => Ok(Self::Text),
            Some(m) if m.eq_ignore_ascii_case("nearby") => Ok(Self::Nearby {
                radius_m: radius_m.unwrap_or(DEFAULT_RADIUS_M),
            }),
            Some(m) if m.eq_ignore_ascii_case("grid") => Ok(Self::Grid {
                points: grid_points.unwrap_or(DEFAULT_GRID_POINTS),
                radius_m: radius_m.unwrap_or(DEFAULT_RADIUS_M),
            }),
            Some(other) => Err(other.to_owned()),
        }
    }
}

/// Immutable, validated input for one search run.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCriteria {
    pub state: String,
    pub cities: Vec<String>,
    pub neighborhood: Option<String>,
    pub keywords: Vec<String>,
    pub max_results: u32,
    pub pages_per_query: u32,
    pub mode: SearchMode,
}

impl SearchCriteria {
    /// Normalizes and validates raw caller input.
    ///
    /// # Errors
    ///
    /// Returns [`CriteriaError::NoCity`] when no non-blank city survives
    /// normalization.
    pub fn new(
        state: Option<String>,
        cities: Vec<String>,
        neighborhood: Option<String>,
        keywords: Vec<String>,
        max_results: Option<u32>,
        pages_per_query: Option<u32>,
        mode: SearchMode,
    ) -> Result<Self, CriteriaError> {
        let cities = dedup_case_insensitive(cities);
        if cities.is_empty() {
            return Err(CriteriaError::NoCity);
        }

        let state = state
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_STATE.to_owned());

        let neighborhood = neighborhood
            .map(|n| n.trim().to_owned())
            .filter(|n| !n.is_empty());

        Ok(Self {
            state,
            cities,
            neighborhood,
            keywords: dedup_case_insensitive(keywords),
            max_results: max_results.unwrap_or(DEFAULT_MAX_RESULTS).clamp(1, MAX_RESULTS),
            pages_per_query: pages_per_query
                .unwrap_or(MAX_PAGES_PER_QUERY)
                .clamp(1, MAX_PAGES_PER_QUERY),
            mode,
        })
    }
}

/// Trims entries, drops blanks, and removes case-insensitive duplicates
/// while keeping the original spelling of the first occurrence.
fn dedup_case_insensitive(values: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for value in values {
        let trimmed = value.trim();
        if trimmed.is_empty() {
            continue;
        }
        if seen.insert(trimmed.to_lowercase()) {
            out.push(trimmed.to_owned());
        }
    }
    out
}
