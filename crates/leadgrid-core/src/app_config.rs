use std::net::SocketAddr;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub bind_addr: SocketAddr,
    pub log_level: String,
    /// Credential for the places/geocoding API. Optional at load time so
    /// read-only surfaces (lead listing, export) work without it; search
    /// and enrichment reject requests when it is absent.
    pub google_maps_api_key: Option<String>,
    pub ibge_base_url: String,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub places_timeout_secs: u64,
    pub page_token_attempts: u32,
    pub page_token_delay_ms: u64,
    pub inter_query_delay_ms: u64,
    pub places_max_retries: u32,
    pub places_backoff_base_ms: u64,
    pub cities_cache_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("bind_addr", &self.bind_addr)
            .field("log_level", &self.log_level)
            .field("database_url", &"[redacted]")
            .field(
                "google_maps_api_key",
                &self.google_maps_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("ibge_base_url", &self.ibge_base_url)
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("places_timeout_secs", &self.places_timeout_secs)
            .field("page_token_attempts", &self.page_token_attempts)
            .field("page_token_delay_ms", &self.page_token_delay_ms)
            .field("inter_query_delay_ms", &self.inter_query_delay_ms)
            .field("places_max_retries", &self.places_max_retries)
            .field("places_backoff_base_ms", &self.places_backoff_base_ms)
            .field("cities_cache_ttl_secs", &self.cities_cache_ttl_secs)
            .finish()
    }
}
