/// Where the pipeline is running. Delay bounds are scaled down in CI, which
/// is assumed to have less IP diversity to burn but also far shorter job
/// time limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Ci,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_ci(self) -> bool {
        matches!(self, Environment::Ci)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Ci => write!(f, "ci"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Process-wide configuration, loaded once at startup from the environment.
#[derive(Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub env: Environment,
    pub log_level: String,
    /// Optional key for the third-party economic-data API. Absence degrades
    /// gracefully (the dashboard falls back to cached series); the scraper
    /// only reports whether it is present.
    pub fred_api_key: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    /// Per-navigation timeout; timeouts are retryable, not fatal.
    pub nav_timeout_secs: u64,
    /// Retry cap per navigation call site.
    pub nav_max_attempts: u32,
    /// Jittered delay bounds between pages within a category.
    pub page_delay_min_ms: u64,
    pub page_delay_max_ms: u64,
    /// Jittered delay bounds between regions.
    pub region_delay_min_ms: u64,
    pub region_delay_max_ms: u64,
    /// Extra delay added per consecutive navigation failure.
    pub failure_delay_step_ms: u64,
    /// Consecutive failures before the circuit breaker pauses the adapter.
    pub breaker_threshold: u32,
    pub breaker_cooldown_secs: u64,
    /// Regions between full browser teardowns (fresh TLS/network identity).
    pub recycle_interval_regions: usize,
    /// Pause between retailers, against cross-site fingerprint correlation.
    pub retailer_pause_secs: u64,
    /// Regions covered more recently than this are skipped for the run.
    pub freshness_window_hours: i64,
    /// Scraped records older than this are deleted during cleanup.
    pub retention_days: i64,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("database_url", &"[redacted]")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field(
                "fred_api_key",
                &self.fred_api_key.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("nav_timeout_secs", &self.nav_timeout_secs)
            .field("nav_max_attempts", &self.nav_max_attempts)
            .field("page_delay_min_ms", &self.page_delay_min_ms)
            .field("page_delay_max_ms", &self.page_delay_max_ms)
            .field("region_delay_min_ms", &self.region_delay_min_ms)
            .field("region_delay_max_ms", &self.region_delay_max_ms)
            .field("failure_delay_step_ms", &self.failure_delay_step_ms)
            .field("breaker_threshold", &self.breaker_threshold)
            .field("breaker_cooldown_secs", &self.breaker_cooldown_secs)
            .field("recycle_interval_regions", &self.recycle_interval_regions)
            .field("retailer_pause_secs", &self.retailer_pause_secs)
            .field("freshness_window_hours", &self.freshness_window_hours)
            .field("retention_days", &self.retention_days)
            .finish()
    }
}
