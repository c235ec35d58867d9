use std::path::PathBuf;

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
    pub env: Environment,
    pub log_level: String,
    pub partners_path: PathBuf,
    pub places_api_key: Option<String>,
    pub places_base_url: String,
    pub directory_timeout_ms: u64,
    pub search_timeout_ms: u64,
    pub default_result_limit: usize,
    /// Offset applied to the clock before reading the local hour for the
    /// open-now heuristic.
    pub utc_offset_hours: i32,
    pub cache_max_entries: usize,
    pub cache_sweep_interval_secs: u64,
    pub cache_lodging_ttl_secs: u64,
    pub cache_tourism_ttl_secs: u64,
    pub cache_proximity_ttl_secs: u64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("partners_path", &self.partners_path)
            .field(
                "places_api_key",
                &self.places_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("places_base_url", &self.places_base_url)
            .field("directory_timeout_ms", &self.directory_timeout_ms)
            .field("search_timeout_ms", &self.search_timeout_ms)
            .field("default_result_limit", &self.default_result_limit)
            .field("utc_offset_hours", &self.utc_offset_hours)
            .field("cache_max_entries", &self.cache_max_entries)
            .field("cache_sweep_interval_secs", &self.cache_sweep_interval_secs)
            .field("cache_lodging_ttl_secs", &self.cache_lodging_ttl_secs)
            .field("cache_tourism_ttl_secs", &self.cache_tourism_ttl_secs)
            .field("cache_proximity_ttl_secs", &self.cache_proximity_ttl_secs)
            .finish()
    }
}
