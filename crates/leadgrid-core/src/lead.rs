//! The final row produced by the pipeline and stored per place id.

use serde::{Deserialize, Serialize};

/// One deduplicated, locality-filtered business record.
///
/// `place_id` is the external identifier assigned by the places API; records
/// found by search modes that do not return one carry `None` and are keyed
/// by normalized name+address instead (and skipped by the persistent store,
/// which upserts by place id).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Lead {
    pub place_id: Option<String>,
    pub name: String,
    pub city: String,
    pub neighborhood: String,
    pub address: String,
    pub postal_code: Option<String>,
    pub area_code: Option<String>,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub maps_url: Option<String>,
    /// True once a detail lookup succeeded for this record. A failed lookup
    /// leaves the basic fields in place with this flag unset.
    pub enriched: bool,
}
