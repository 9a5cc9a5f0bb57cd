use std::env;
use std::time::Duration;

pub struct AppConfig {
    pub mongo_uri: String,
    pub db_name: String,
    pub search_url: Option<String>,
    pub search_index: String,
    /// Startup reindex: connection attempts before degrading to no search.
    pub search_max_retries: u32,
    /// Base delay for the exponential backoff between attempts.
    pub search_retry_base: Duration,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let _ = dotenvy::dotenv(); // ignore a missing .env

        let get = |k: &str, d: &str| env::var(k).unwrap_or_else(|_| d.to_string());

        let search_max_retries = get("SEARCH_MAX_RETRIES", "5").parse().unwrap_or(5);
        let retry_base_ms: u64 = get("SEARCH_RETRY_BASE_MS", "500").parse().unwrap_or(500);

        Self {
            mongo_uri: get("MONGO_URI", "mongodb://localhost:27017"),
            db_name: get("DB_NAME", "timtro_dev"),
            search_url: env::var("SEARCH_URL").ok(),
            search_index: get("SEARCH_INDEX", "rooms"),
            search_max_retries,
            search_retry_base: Duration::from_millis(retry_base_ms),
        }
    }
}
