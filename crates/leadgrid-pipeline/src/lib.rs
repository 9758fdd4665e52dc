//! The search pipeline: keyword expansion → paginated sweep → dedup →
//! enrichment → locality filter.
//!
//! One pipeline serves every search mode; [`run::SearchRunner`] is the entry
//! point and the rest of the modules are its pure building blocks.

pub mod dedupe;
pub mod enrich;
pub mod expand;
pub mod fetch;
pub mod grid;
pub mod locality;
pub mod run;

use thiserror::Error;

pub use dedupe::{dedup_candidates, dedup_leads, CandidateSet, DedupKey};
pub use expand::{expand_keywords, DEFAULT_KEYWORDS, MAX_TERMS};
pub use run::{RunnerOptions, SearchOutcome, SearchRunner};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Places(#[from] leadgrid_places::PlacesError),
}
