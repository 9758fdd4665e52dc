//! Client for the IBGE localidades API: state code → municipality names.
//!
//! Responses are cached in-process (default 12 h) — the municipality list of
//! a state changes on a census timescale, and the endpoint feeds selection
//! inputs on every page load.

use std::time::Duration;

use reqwest::Url;
use serde::Deserialize;
use thiserror::Error;

use crate::cache::TtlCache;

const DEFAULT_BASE_URL: &str = "https://servicodados.ibge.gov.br/api/v1/localidades/";
const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

#[derive(Debug, Error)]
pub enum MunisError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("invalid response for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid state code '{0}': expected two letters")]
    InvalidUf(String),
}

#[derive(Debug, Deserialize)]
struct Municipio {
    #[serde(default)]
    nome: Option<String>,
}

/// Client for the municipality list API with an in-process TTL cache.
pub struct MunisClient {
    client: reqwest::Client,
    base_url: Url,
    cache: TtlCache<String, Vec<String>>,
    cache_ttl: Duration,
}

impl MunisClient {
    /// Creates a client pointed at the production IBGE API.
    ///
    /// # Errors
    ///
    /// Returns [`MunisError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64) -> Result<Self, MunisError> {
        Self::with_base_url(timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MunisError::Http`] if the client cannot be constructed, or
    /// [`MunisError::InvalidUf`] if `base_url` is not a valid URL.
    pub fn with_base_url(timeout_secs: u64, base_url: &str) -> Result<Self, MunisError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("leadgrid/0.1 (lead-generation)")
            .build()?;

        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url =
            Url::parse(&normalised).map_err(|_| MunisError::InvalidUf(base_url.to_owned()))?;

        Ok(Self {
            client,
            base_url,
            cache: TtlCache::new(),
            cache_ttl: DEFAULT_CACHE_TTL,
        })
    }

    /// Overrides the cache time-to-live.
    #[must_use]
    pub fn cache_ttl(mut self, ttl: Duration) -> Self {
        self.cache_ttl = ttl;
        self
    }

    /// Returns the sorted municipality names for a two-letter state code.
    ///
    /// # Errors
    ///
    /// - [`MunisError::InvalidUf`] when `uf` is not two ASCII letters.
    /// - [`MunisError::Http`] on network failure or non-2xx status.
    /// - [`MunisError::Deserialize`] when the body is not the expected JSON.
    pub async fn list_cities(&self, uf: &str) -> Result<Vec<String>, MunisError> {
        let uf = normalize_uf(uf)?;

        if let Some(cached) = self.cache.get(&uf) {
            tracing::debug!(%uf, "municipality list served from cache");
            return Ok(cached);
        }

        let url = self
            .base_url
            .join(&format!("estados/{uf}/municipios"))
            .map_err(|_| MunisError::InvalidUf(uf.clone()))?;

        let response = self.client.get(url).send().await?.error_for_status()?;
        let body = response.text().await?;
        let raw: Vec<Municipio> =
            serde_json::from_str(&body).map_err(|e| MunisError::Deserialize {
                context: format!("municipios({uf})"),
                source: e,
            })?;

        let cities = sort_city_names(raw.into_iter().filter_map(|m| m.nome));
        self.cache.set(uf, cities.clone(), self.cache_ttl);
        Ok(cities)
    }
}

fn normalize_uf(uf: &str) -> Result<String, MunisError> {
    let trimmed = uf.trim();
    if trimmed.len() == 2 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(trimmed.to_uppercase())
    } else {
        Err(MunisError::InvalidUf(trimmed.to_owned()))
    }
}

/// Trims, drops blanks, and sorts case-insensitively.
fn sort_city_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut cities: Vec<String> = names
        .map(|n| n.trim().to_owned())
        .filter(|n| !n.is_empty())
        .collect();
    cities.sort_by(|a, b| a.to_lowercase().cmp(&b.to_lowercase()));
    cities
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_uf_uppercases_valid_codes() {
        assert_eq!(normalize_uf(" sp ").unwrap(), "SP");
        assert_eq!(normalize_uf("MG").unwrap(), "MG");
    }

    #[test]
    fn normalize_uf_rejects_bad_codes() {
        assert!(matches!(normalize_uf("S"), Err(MunisError::InvalidUf(_))));
        assert!(matches!(normalize_uf("S1"), Err(MunisError::InvalidUf(_))));
        assert!(matches!(normalize_uf("SAO"), Err(MunisError::InvalidUf(_))));
        assert!(matches!(normalize_uf(""), Err(MunisError::InvalidUf(_))));
    }

    #[test]
    fn sort_city_names_is_case_insensitive_and_drops_blanks() {
        let sorted = sort_city_names(
            vec![
                "santos".to_owned(),
                "Campinas".to_owned(),
                "  ".to_owned(),
                "Araraquara".to_owned(),
            ]
            .into_iter(),
        );
        assert_eq!(sorted, vec!["Araraquara", "Campinas", "santos"]);
    }
}
