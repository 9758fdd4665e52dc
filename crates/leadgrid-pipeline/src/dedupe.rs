//! Deduplication and gap-filling merge.
//!
//! The dedup key is the external place id when present, otherwise the
//! lowercase trimmed (name, address) tuple. First-seen wins: a later
//! duplicate never replaces a field that is already non-empty, it only
//! fills gaps. Records with no id, no name, and no address are unkeyable
//! and dropped.

use std::collections::HashMap;

use leadgrid_core::Lead;
use leadgrid_places::Candidate;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DedupKey {
    Place(String),
    NameAddress(String, String),
}

impl DedupKey {
    fn from_parts(place_id: Option<&str>, name: &str, address: &str) -> Option<Self> {
        if let Some(id) = place_id.map(str::trim).filter(|id| !id.is_empty()) {
            return Some(Self::Place(id.to_owned()));
        }
        let name = name.trim().to_lowercase();
        let address = address.trim().to_lowercase();
        if name.is_empty() && address.is_empty() {
            return None;
        }
        Some(Self::NameAddress(name, address))
    }

    #[must_use]
    pub fn for_candidate(candidate: &Candidate) -> Option<Self> {
        Self::from_parts(
            candidate.place_id.as_deref(),
            &candidate.name,
            candidate.address(),
        )
    }

    #[must_use]
    pub fn for_lead(lead: &Lead) -> Option<Self> {
        Self::from_parts(lead.place_id.as_deref(), &lead.name, &lead.address)
    }
}

/// Order-preserving accumulator of unique candidates.
///
/// Built up page by page so the overall result cap can short-circuit the
/// sweep on *unique* counts rather than raw row counts.
#[derive(Debug, Default)]
pub struct CandidateSet {
    order: Vec<Candidate>,
    index: HashMap<DedupKey, usize>,
}

impl CandidateSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a candidate, returning `true` when its key was new.
    ///
    /// Duplicates only fill fields the first-seen record was missing.
    /// Unkeyable candidates are discarded and count as not-new.
    pub fn insert(&mut self, candidate: Candidate) -> bool {
        let Some(key) = DedupKey::for_candidate(&candidate) else {
            tracing::debug!("dropping unkeyable candidate (no id, name, or address)");
            return false;
        };
        if let Some(&at) = self.index.get(&key) {
            fill_candidate_gaps(&mut self.order[at], &candidate);
            return false;
        }
        self.order.push(candidate);
        self.index.insert(key, self.order.len() - 1);
        true
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<Candidate> {
        self.order
    }
}

fn fill_candidate_gaps(existing: &mut Candidate, duplicate: &Candidate) {
    if existing.formatted_address.is_none() {
        existing.formatted_address = duplicate.formatted_address.clone();
    }
    if existing.vicinity.is_none() {
        existing.vicinity = duplicate.vicinity.clone();
    }
    if existing.geometry.is_none() {
        existing.geometry = duplicate.geometry.clone();
    }
    if existing.rating.is_none() {
        existing.rating = duplicate.rating;
    }
    if existing.user_ratings_total.is_none() {
        existing.user_ratings_total = duplicate.user_ratings_total;
    }
}

/// Collapses raw candidates into a unique, order-preserving list.
#[must_use]
pub fn dedup_candidates(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut set = CandidateSet::new();
    for candidate in candidates {
        set.insert(candidate);
    }
    set.into_vec()
}

/// Fills empty fields of `existing` from `duplicate`; never overwrites a
/// non-empty value (first-seen wins on conflicts).
pub fn merge_missing(existing: &mut Lead, duplicate: &Lead) {
    fn fill(slot: &mut Option<String>, value: &Option<String>) {
        if slot.as_deref().is_none_or(|s| s.trim().is_empty()) {
            if let Some(v) = value.as_deref().filter(|v| !v.trim().is_empty()) {
                *slot = Some(v.to_owned());
            }
        }
    }

    if existing.place_id.is_none() {
        existing.place_id = duplicate.place_id.clone();
    }
    if existing.name.trim().is_empty() {
        existing.name = duplicate.name.clone();
    }
    if existing.city.trim().is_empty() {
        existing.city = duplicate.city.clone();
    }
    if existing.neighborhood.trim().is_empty() {
        existing.neighborhood = duplicate.neighborhood.clone();
    }
    if existing.address.trim().is_empty() {
        existing.address = duplicate.address.clone();
    }
    fill(&mut existing.postal_code, &duplicate.postal_code);
    fill(&mut existing.area_code, &duplicate.area_code);
    fill(&mut existing.phone, &duplicate.phone);
    fill(&mut existing.website, &duplicate.website);
    fill(&mut existing.maps_url, &duplicate.maps_url);
    existing.enriched = existing.enriched || duplicate.enriched;
}

/// Collapses finished leads into one row per dedup key, merging gaps.
///
/// Running this over its own output is a no-op.
#[must_use]
pub fn dedup_leads(leads: Vec<Lead>) -> Vec<Lead> {
    let mut order: Vec<Lead> = Vec::with_capacity(leads.len());
    let mut index: HashMap<DedupKey, usize> = HashMap::new();
    for lead in leads {
        let Some(key) = DedupKey::for_lead(&lead) else {
            continue;
        };
        if let Some(&at) = index.get(&key) {
            merge_missing(&mut order[at], &lead);
        } else {
            order.push(lead);
            index.insert(key, order.len() - 1);
        }
    }
    order
}
