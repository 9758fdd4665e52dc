//! The single search pipeline, parameterized by search mode.
//!
//! Sequential by design: one external call at a time, in (location × term)
//! order, so the dedup map's first-seen rule is deterministic and the
//! external API's pacing constraints are respected.

use leadgrid_core::{Lead, SearchCriteria, SearchMode};
use leadgrid_places::{AddressComponent, PlacesClient};

use crate::dedupe::{dedup_leads, CandidateSet};
use crate::enrich::{apply_detail, lead_from_candidate};
use crate::expand::expand_keywords;
use crate::fetch::{fetch_query, pace, QueryTarget};
use crate::grid::grid_points;
use crate::locality::{extract_city, match_city};
use crate::PipelineError;

#[derive(Debug, Clone, Copy)]
pub struct RunnerOptions {
    /// Delay between consecutive search queries (not pages; the client
    /// already paces continuation-token polls).
    pub inter_query_delay_ms: u64,
}

impl Default for RunnerOptions {
    fn default() -> Self {
        Self {
            inter_query_delay_ms: 250,
        }
    }
}

/// Result of one pipeline run.
#[derive(Debug, Clone)]
pub struct SearchOutcome {
    /// Deduplicated, enriched, locality-filtered rows.
    pub leads: Vec<Lead>,
    /// The expanded term list actually queried.
    pub terms: Vec<String>,
    /// Unique candidates collected before enrichment and filtering.
    pub unique_candidates: usize,
}

/// Drives one search run end to end against a [`PlacesClient`].
pub struct SearchRunner {
    places: PlacesClient,
    options: RunnerOptions,
}

impl SearchRunner {
    #[must_use]
    pub fn new(places: PlacesClient) -> Self {
        Self::with_options(places, RunnerOptions::default())
    }

    #[must_use]
    pub fn with_options(places: PlacesClient, options: RunnerOptions) -> Self {
        Self { places, options }
    }

    /// Runs the full pipeline for validated criteria.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::Places`] when the external API fails in a
    /// non-recoverable way (any status outside `OK`/`ZERO_RESULTS`, or a
    /// malformed body on a top-level text query). Per-record detail
    /// failures and stale continuation tokens are absorbed.
    pub async fn run(&self, criteria: &SearchCriteria) -> Result<SearchOutcome, PipelineError> {
        let terms = expand_keywords(&criteria.keywords);
        let cap = criteria.max_results as usize;

        let set = self.collect_candidates(criteria, &terms, cap).await?;
        let unique_candidates = set.len();

        let leads = self.enrich_and_filter(criteria, set).await;
        tracing::info!(
            unique_candidates,
            kept = leads.len(),
            terms = terms.len(),
            "search run complete"
        );

        Ok(SearchOutcome {
            leads,
            terms,
            unique_candidates,
        })
    }

    /// Sweeps every (location × term) combination for the requested mode,
    /// accumulating unique candidates until the cap is reached.
    async fn collect_candidates(
        &self,
        criteria: &SearchCriteria,
        terms: &[String],
        cap: usize,
    ) -> Result<CandidateSet, PipelineError> {
        let delay = self.options.inter_query_delay_ms;
        let mut set = CandidateSet::new();
        let mut first = true;

        match &criteria.mode {
            SearchMode::Text => {
                'sweep: for city in &criteria.cities {
                    for term in terms {
                        if set.len() >= cap {
                            break 'sweep;
                        }
                        pace(delay, &mut first).await;
                        let query = text_query(term, city, criteria);
                        fetch_query(
                            &self.places,
                            QueryTarget::Text(&query),
                            criteria.pages_per_query,
                            cap,
                            &mut set,
                        )
                        .await?;
                    }
                }
            }
            SearchMode::Nearby { radius_m } => {
                'sweep: for city in &criteria.cities {
                    let area = self.places.geocode(&geocode_query(city, criteria)).await?;
                    for term in terms {
                        if set.len() >= cap {
                            break 'sweep;
                        }
                        pace(delay, &mut first).await;
                        fetch_query(
                            &self.places,
                            QueryTarget::Nearby {
                                point: area.center,
                                radius_m: *radius_m,
                                keyword: term,
                            },
                            criteria.pages_per_query,
                            cap,
                            &mut set,
                        )
                        .await?;
                    }
                }
            }
            SearchMode::Grid { points, radius_m } => {
                'sweep: for city in &criteria.cities {
                    let area = self.places.geocode(&geocode_query(city, criteria)).await?;
                    let cells = match area.viewport {
                        Some(viewport) => grid_points(&viewport, *points),
                        None => {
                            tracing::warn!(
                                %city,
                                "geocode returned no viewport — sweeping the center only"
                            );
                            vec![area.center]
                        }
                    };
                    for point in cells {
                        for term in terms {
                            if set.len() >= cap {
                                break 'sweep;
                            }
                            pace(delay, &mut first).await;
                            fetch_query(
                                &self.places,
                                QueryTarget::Nearby {
                                    point,
                                    radius_m: *radius_m,
                                    keyword: term,
                                },
                                criteria.pages_per_query,
                                cap,
                                &mut set,
                            )
                            .await?;
                        }
                    }
                }
            }
        }

        Ok(set)
    }

    /// Enriches each unique candidate and applies the locality filter.
    ///
    /// A failed detail lookup degrades that record to its basic fields; the
    /// locality filter then works from the raw address alone.
    async fn enrich_and_filter(&self, criteria: &SearchCriteria, set: CandidateSet) -> Vec<Lead> {
        let mut leads = Vec::new();

        for candidate in set.into_vec() {
            let mut lead = lead_from_candidate(&candidate);
            let mut components: Vec<AddressComponent> = Vec::new();

            if let Some(place_id) = candidate.place_id.as_deref() {
                match self.places.place_details(place_id).await {
                    Ok(detail) => {
                        components.clone_from(&detail.address_components);
                        apply_detail(&mut lead, &detail);
                    }
                    Err(err) => {
                        tracing::warn!(
                            place_id,
                            error = %err,
                            "detail lookup failed — keeping un-enriched record"
                        );
                    }
                }
            }

            let extracted = extract_city(&components);
            let Some(city) = match_city(extracted.as_deref(), &lead.address, &criteria.cities)
            else {
                tracing::debug!(
                    name = %lead.name,
                    "record resolved outside the requested cities — dropped"
                );
                continue;
            };

            lead.city = city.to_owned();
            if lead.neighborhood.is_empty() {
                lead.neighborhood = criteria.neighborhood.clone().unwrap_or_default();
            }
            leads.push(lead);
        }

        dedup_leads(leads)
    }
}

/// Builds the free-text query: term, optional neighborhood, city, state.
fn text_query(term: &str, city: &str, criteria: &SearchCriteria) -> String {
    let mut parts: Vec<&str> = vec![term];
    if let Some(neighborhood) = criteria.neighborhood.as_deref() {
        parts.push(neighborhood);
    }
    parts.push(city);
    parts.push(&criteria.state);
    parts.join(" ")
}

fn geocode_query(city: &str, criteria: &SearchCriteria) -> String {
    format!("{city}, {}, Brasil", criteria.state)
}
