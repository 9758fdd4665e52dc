//! The paginated fetcher: one logical search, bounded pages.
//!
//! Stops paging when the continuation token is absent, the page ceiling is
//! reached, or the caller's overall cap is satisfied. A token that never
//! activates ends the query quietly; a malformed body is fatal for text
//! queries but tolerated per point in coordinate sweeps, where one bad cell
//! must not sink the run.

use std::time::Duration;

use leadgrid_places::{LatLng, PageStatus, PlacesClient, PlacesError};

use crate::dedupe::CandidateSet;
use crate::PipelineError;

/// One logical search to page through.
#[derive(Debug, Clone, Copy)]
pub enum QueryTarget<'a> {
    Text(&'a str),
    Nearby {
        point: LatLng,
        radius_m: u32,
        keyword: &'a str,
    },
}

impl QueryTarget<'_> {
    fn describe(&self) -> String {
        match self {
            QueryTarget::Text(query) => format!("text '{query}'"),
            QueryTarget::Nearby {
                point, keyword, ..
            } => format!("nearby '{}' @ {},{}", keyword, point.lat, point.lng),
        }
    }
}

/// Pages through one query, feeding unique candidates into `set`.
///
/// `max_pages` bounds the sweep per query; `max_total` is the overall
/// result cap measured on unique candidates.
///
/// # Errors
///
/// Propagates fatal API statuses. A malformed body propagates for
/// [`QueryTarget::Text`] and is absorbed (empty page, warn log) for
/// [`QueryTarget::Nearby`].
pub async fn fetch_query(
    client: &PlacesClient,
    target: QueryTarget<'_>,
    max_pages: u32,
    max_total: usize,
    set: &mut CandidateSet,
) -> Result<(), PipelineError> {
    let mut page_token: Option<String> = None;

    for page_number in 0..max_pages {
        if set.len() >= max_total {
            break;
        }

        let result = match target {
            QueryTarget::Text(query) => client.text_search(query, page_token.as_deref()).await,
            QueryTarget::Nearby {
                point,
                radius_m,
                keyword,
            } => {
                client
                    .nearby_search(point, radius_m, keyword, page_token.as_deref())
                    .await
            }
        };

        let page = match result {
            Ok(page) => page,
            Err(PlacesError::Deserialize { context, source })
                if matches!(target, QueryTarget::Nearby { .. }) =>
            {
                tracing::warn!(
                    query = %target.describe(),
                    context = %context,
                    error = %source,
                    "malformed response for one grid point — treating as empty page"
                );
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        if page.status == PageStatus::TokenNotReady {
            tracing::warn!(
                query = %target.describe(),
                page_number,
                "continuation token never became ready — ending query"
            );
            return Ok(());
        }

        let mut fresh = 0usize;
        for candidate in page.candidates {
            if set.len() >= max_total {
                break;
            }
            if set.insert(candidate) {
                fresh += 1;
            }
        }
        tracing::debug!(
            query = %target.describe(),
            page_number,
            fresh,
            unique_total = set.len(),
            "page collected"
        );

        page_token = page.next_page_token;
        if page_token.is_none() {
            break;
        }
    }

    Ok(())
}

/// Sleeps between consecutive queries to pace external calls.
pub(crate) async fn pace(delay_ms: u64, first: &mut bool) {
    if *first {
        *first = false;
    } else if delay_ms > 0 {
        tokio::time::sleep(Duration::from_millis(delay_ms)).await;
    }
}
