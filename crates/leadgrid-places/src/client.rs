//! HTTP client for the places search/detail and geocoding REST API.
//!
//! Wraps `reqwest` with typed envelope handling: every endpoint checks the
//! JSON `"status"` field and surfaces anything outside `OK`/`ZERO_RESULTS`
//! as [`PlacesError::Api`]. Continuation tokens that the upstream has issued
//! but not yet activated are polled with a fixed delay and degrade to an
//! empty [`PageStatus::TokenNotReady`] page when the budget runs out.

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::PlacesError;
use crate::retry::{poll_until_ready, retry_with_backoff};
use crate::types::{
    DetailEnvelope, GeocodeEnvelope, GeocodedArea, LatLng, PageStatus, PlaceDetail,
    SearchEnvelope, SearchPage,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

const STATUS_OK: &str = "OK";
const STATUS_ZERO_RESULTS: &str = "ZERO_RESULTS";
const STATUS_INVALID_REQUEST: &str = "INVALID_REQUEST";

/// Detail fields requested per lookup; keeps the per-call billing tier low.
const DETAIL_FIELDS: &str =
    "name,formatted_address,address_components,international_phone_number,formatted_phone_number,website,url";

/// Client for the places search/detail and geocoding API.
///
/// Use [`PlacesClient::new`] for production or
/// [`PlacesClient::with_base_url`] to point at a mock server in tests.
pub struct PlacesClient {
    client: Client,
    api_key: String,
    text_search_url: Url,
    nearby_search_url: Url,
    details_url: Url,
    geocode_url: Url,
    token_attempts: u32,
    token_delay: Duration,
    max_retries: u32,
    backoff_base_ms: u64,
}

impl PlacesClient {
    /// Creates a new client pointed at the production API.
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, timeout_secs: u64) -> Result<Self, PlacesError> {
        Self::with_base_url(api_key, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a new client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`PlacesError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`PlacesError::Api`] if `base_url` is not a
    /// valid URL.
    pub fn with_base_url(
        api_key: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, PlacesError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("leadgrid/0.1 (lead-generation)")
            .build()?;

        // Normalise: exactly one trailing slash so joins append path
        // segments instead of replacing the last one.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base = Url::parse(&normalised).map_err(|e| PlacesError::Api {
            status: "INVALID_BASE_URL".to_owned(),
            message: Some(format!("invalid base URL '{base_url}': {e}")),
        })?;

        let join = |path: &str| -> Result<Url, PlacesError> {
            base.join(path).map_err(|e| PlacesError::Api {
                status: "INVALID_BASE_URL".to_owned(),
                message: Some(format!("cannot build endpoint '{path}': {e}")),
            })
        };

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            text_search_url: join("place/textsearch/json")?,
            nearby_search_url: join("place/nearbysearch/json")?,
            details_url: join("place/details/json")?,
            geocode_url: join("geocode/json")?,
            token_attempts: 6,
            token_delay: Duration::from_millis(2500),
            max_retries: 3,
            backoff_base_ms: 1000,
        })
    }

    /// Overrides the continuation-token polling budget.
    #[must_use]
    pub fn token_retry(mut self, attempts: u32, delay_ms: u64) -> Self {
        self.token_attempts = attempts;
        self.token_delay = Duration::from_millis(delay_ms);
        self
    }

    /// Overrides the transient-error retry policy.
    #[must_use]
    pub fn transient_retry(mut self, max_retries: u32, backoff_base_ms: u64) -> Self {
        self.max_retries = max_retries;
        self.backoff_base_ms = backoff_base_ms;
        self
    }

    /// Runs one free-text search call, optionally continuing from a token.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] for any status outside `OK`/`ZERO_RESULTS`
    ///   (except a not-yet-active token, which yields a
    ///   [`PageStatus::TokenNotReady`] page instead).
    /// - [`PlacesError::Http`] on network failure or non-2xx HTTP status.
    /// - [`PlacesError::Deserialize`] if the body is not the expected JSON.
    pub async fn text_search(
        &self,
        query: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        let url = self.text_url(query, page_token);
        self.search_page(url, page_token.is_some(), &format!("textsearch({query})"))
            .await
    }

    /// Runs one keyword search around a coordinate, optionally continuing
    /// from a token.
    ///
    /// # Errors
    ///
    /// Same contract as [`Self::text_search`].
    pub async fn nearby_search(
        &self,
        point: LatLng,
        radius_m: u32,
        keyword: &str,
        page_token: Option<&str>,
    ) -> Result<SearchPage, PlacesError> {
        let url = self.nearby_url(point, radius_m, keyword, page_token);
        self.search_page(
            url,
            page_token.is_some(),
            &format!("nearbysearch({keyword})"),
        )
        .await
    }

    /// Fetches enrichment detail for one place id.
    ///
    /// # Errors
    ///
    /// - [`PlacesError::Api`] if the API returns a non-`OK` status.
    /// - [`PlacesError::Http`] / [`PlacesError::Deserialize`] as usual.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceDetail, PlacesError> {
        let mut url = self.details_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("place_id", place_id);
            pairs.append_pair("fields", DETAIL_FIELDS);
            pairs.append_pair("language", "pt-BR");
        }

        let context = format!("details({place_id})");
        let envelope: DetailEnvelope = self.request_json(&url, &context).await?;
        if envelope.status != STATUS_OK {
            return Err(PlacesError::Api {
                status: envelope.status,
                message: envelope.error_message,
            });
        }
        if envelope.result.is_none() {
            tracing::debug!(place_id, "detail response carried OK status but no result");
        }
        Ok(envelope.result.unwrap_or_default())
    }

    /// Geocodes a free-form address to a center point and viewport.
    ///
    /// # Errors
    ///
    /// [`PlacesError::Api`] when the status is not `OK` or the result list is
    /// empty — callers cannot seed a sweep without a center.
    pub async fn geocode(&self, address: &str) -> Result<GeocodedArea, PlacesError> {
        let mut url = self.geocode_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("address", address);
            pairs.append_pair("language", "pt-BR");
            pairs.append_pair("region", "br");
        }

        let context = format!("geocode({address})");
        let envelope: GeocodeEnvelope = self.request_json(&url, &context).await?;
        if envelope.status != STATUS_OK {
            return Err(PlacesError::Api {
                status: envelope.status,
                message: envelope.error_message,
            });
        }
        let first = envelope.results.into_iter().next();
        first.map_or_else(
            || {
                Err(PlacesError::Api {
                    status: STATUS_ZERO_RESULTS.to_owned(),
                    message: Some(format!("no geocode result for '{address}'")),
                })
            },
            |result| {
                Ok(GeocodedArea {
                    center: result.geometry.location,
                    viewport: result.geometry.viewport,
                })
            },
        )
    }

    /// Fetches a search envelope, polling while a supplied token is not yet
    /// active, and converts the final envelope into a [`SearchPage`].
    async fn search_page(
        &self,
        url: Url,
        has_token: bool,
        context: &str,
    ) -> Result<SearchPage, PlacesError> {
        let envelope = if has_token {
            let env = poll_until_ready(
                self.token_attempts,
                self.token_delay,
                |env: &SearchEnvelope| env.status != STATUS_INVALID_REQUEST,
                || self.request_json::<SearchEnvelope>(&url, context),
            )
            .await?;

            if env.status == STATUS_INVALID_REQUEST {
                tracing::warn!(
                    context,
                    attempts = self.token_attempts,
                    "continuation token never became active — returning empty page"
                );
                return Ok(SearchPage::empty(PageStatus::TokenNotReady));
            }
            env
        } else {
            self.request_json::<SearchEnvelope>(&url, context).await?
        };

        match envelope.status.as_str() {
            STATUS_OK => Ok(SearchPage {
                status: PageStatus::Ok,
                candidates: envelope.results,
                next_page_token: envelope.next_page_token,
            }),
            STATUS_ZERO_RESULTS => Ok(SearchPage::empty(PageStatus::ZeroResults)),
            _ => Err(PlacesError::Api {
                status: envelope.status,
                message: envelope.error_message,
            }),
        }
    }

    fn text_url(&self, query: &str, page_token: Option<&str>) -> Url {
        let mut url = self.text_search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("query", query);
            pairs.append_pair("language", "pt-BR");
            pairs.append_pair("region", "br");
            if let Some(token) = page_token {
                pairs.append_pair("pagetoken", token);
            }
        }
        url
    }

    fn nearby_url(
        &self,
        point: LatLng,
        radius_m: u32,
        keyword: &str,
        page_token: Option<&str>,
    ) -> Url {
        let mut url = self.nearby_search_url.clone();
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("key", &self.api_key);
            pairs.append_pair("location", &format!("{},{}", point.lat, point.lng));
            pairs.append_pair("radius", &radius_m.to_string());
            pairs.append_pair("keyword", keyword);
            pairs.append_pair("language", "pt-BR");
            if let Some(token) = page_token {
                pairs.append_pair("pagetoken", token);
            }
        }
        url
    }

    /// Sends a GET request with transient-error retries, asserts a 2xx HTTP
    /// status, and parses the body as JSON.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: &Url,
        context: &str,
    ) -> Result<T, PlacesError> {
        retry_with_backoff(self.max_retries, self.backoff_base_ms, || {
            let url = url.clone();
            let context = context.to_owned();
            async move {
                let response = self.client.get(url).send().await?;
                let response = response.error_for_status()?;
                let body = response.text().await?;
                serde_json::from_str(&body)
                    .map_err(|e| PlacesError::Deserialize { context, source: e })
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client(base_url: &str) -> PlacesClient {
        PlacesClient::with_base_url("test-key", 30, base_url)
            .expect("client construction should not fail")
    }

    #[test]
    fn text_url_carries_key_language_and_region() {
        let client = test_client("https://maps.example.com/api");
        let url = client.text_url("munck em Santos, SP", None);
        assert_eq!(url.path(), "/api/place/textsearch/json");
        let query = url.query().unwrap_or_default();
        assert!(query.contains("key=test-key"));
        assert!(query.contains("language=pt-BR"));
        assert!(query.contains("region=br"));
        assert!(!query.contains("pagetoken"));
    }

    #[test]
    fn text_url_appends_page_token() {
        let client = test_client("https://maps.example.com");
        let url = client.text_url("munck", Some("tok-1"));
        assert!(url.query().unwrap_or_default().contains("pagetoken=tok-1"));
    }

    #[test]
    fn text_url_encodes_special_characters() {
        let client = test_client("https://maps.example.com");
        let url = client.text_url("blocos & pré-moldados", None);
        let rendered = url.as_str();
        assert!(
            rendered.contains("blocos+%26+pr%C3%A9-moldados")
                || rendered.contains("blocos%20%26%20pr%C3%A9-moldados"),
            "query should be percent-encoded: {rendered}"
        );
    }

    #[test]
    fn nearby_url_formats_location_pair() {
        let client = test_client("https://maps.example.com");
        let url = client.nearby_url(
            LatLng {
                lat: -23.55,
                lng: -46.63,
            },
            5000,
            "guindaste",
            None,
        );
        assert_eq!(url.path(), "/place/nearbysearch/json");
        let query = url.query().unwrap_or_default();
        assert!(query.contains("location=-23.55%2C-46.63"));
        assert!(query.contains("radius=5000"));
    }

    #[test]
    fn base_url_trailing_slash_is_normalised() {
        let with_slash = test_client("https://maps.example.com/api/");
        let without = test_client("https://maps.example.com/api");
        assert_eq!(
            with_slash.text_search_url.as_str(),
            without.text_search_url.as_str()
        );
    }
}
