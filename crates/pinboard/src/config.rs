use std::{env, str::FromStr, time::Duration};

use pinboard_core::domain::RateLimitPolicy;

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default and listing cache TTL in seconds (default: 300)
    pub cache_ttl_seconds: u64,
    /// Single-pin cache TTL in seconds (default: 3600)
    pub pin_cache_ttl_seconds: u64,
    /// Image variant cache TTL in seconds (default: 86400)
    pub image_cache_ttl_seconds: u64,
    /// Maximum number of cache entries (default: 10,000)
    pub cache_max_entries: usize,
    /// Path to SQLite database file (default: "pinboard.db")
    /// Note: Only used when the `sqlite` feature is enabled.
    #[allow(dead_code)]
    pub sqlite_path: String,
    /// SQLite busy timeout in milliseconds (default: 5000)
    #[allow(dead_code)]
    pub sqlite_busy_timeout_ms: u64,
    /// Redis connection URL (default: "redis://localhost:6379")
    /// Note: Only used when the `redis` feature is enabled.
    #[allow(dead_code)]
    pub redis_url: String,
    /// Redis connection timeout in milliseconds (default: 10000)
    #[allow(dead_code)]
    pub redis_connect_timeout_ms: u64,
    /// Redis per-command response timeout in milliseconds (default: 5000)
    #[allow(dead_code)]
    pub redis_response_timeout_ms: u64,
    /// Requests allowed per IP in each API window (default: 100)
    pub api_rate_limit_max: u64,
    /// API rate-limit window in seconds (default: 900)
    pub api_rate_limit_window_seconds: u64,
    /// Pins a user may create in each window (default: 50)
    pub create_rate_limit_max: u64,
    /// Create rate-limit window in seconds (default: 3600)
    pub create_rate_limit_window_seconds: u64,
    /// Trust `x-forwarded-for` for the client IP (default: true)
    pub trust_proxy: bool,
    /// Allowed CORS origin; any origin when unset
    pub frontend_url: Option<String>,
    /// Maximum accepted request body in bytes (default: 10,240)
    pub body_limit_bytes: usize,
    /// Request timeout in seconds (default: 10)
    pub request_timeout_seconds: u64,
}

/// Parses `name`, falling back to `default` when unset or malformed.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `CACHE_TTL_SECONDS` - Listing cache TTL in seconds (default: 300)
    /// - `PIN_CACHE_TTL_SECONDS` - Single pin cache TTL (default: 3600)
    /// - `IMAGE_CACHE_TTL_SECONDS` - Image variant cache TTL (default: 86400)
    /// - `CACHE_MAX_ENTRIES` - Maximum cache entries (default: 10,000)
    /// - `SQLITE_PATH` - SQLite database path (default: "pinboard.db")
    /// - `SQLITE_BUSY_TIMEOUT_MS` - SQLite busy timeout (default: 5000)
    /// - `REDIS_URL` - Redis connection URL (default: "redis://localhost:6379")
    /// - `REDIS_CONNECT_TIMEOUT_MS` - Redis connect timeout (default: 10000)
    /// - `REDIS_RESPONSE_TIMEOUT_MS` - Redis response timeout (default: 5000)
    /// - `API_RATE_LIMIT_MAX` / `API_RATE_LIMIT_WINDOW_SECONDS` (default: 100 / 900)
    /// - `CREATE_RATE_LIMIT_MAX` / `CREATE_RATE_LIMIT_WINDOW_SECONDS` (default: 50 / 3600)
    /// - `TRUST_PROXY` - Use `x-forwarded-for` (default: true)
    /// - `FRONTEND_URL` - Allowed CORS origin (default: any)
    /// - `BODY_LIMIT_BYTES` - Request body limit (default: 10240)
    /// - `REQUEST_TIMEOUT_SECONDS` - Request timeout (default: 10)
    pub fn from_env() -> Self {
        Self {
            cache_ttl_seconds: env_or("CACHE_TTL_SECONDS", 300),
            pin_cache_ttl_seconds: env_or("PIN_CACHE_TTL_SECONDS", 3_600),
            image_cache_ttl_seconds: env_or("IMAGE_CACHE_TTL_SECONDS", 86_400),
            cache_max_entries: env_or("CACHE_MAX_ENTRIES", 10_000),
            sqlite_path: env::var("SQLITE_PATH").unwrap_or_else(|_| "pinboard.db".to_string()),
            sqlite_busy_timeout_ms: env_or("SQLITE_BUSY_TIMEOUT_MS", 5_000),
            redis_url: env::var("REDIS_URL")
                .unwrap_or_else(|_| "redis://localhost:6379".to_string()),
            redis_connect_timeout_ms: env_or("REDIS_CONNECT_TIMEOUT_MS", 10_000),
            redis_response_timeout_ms: env_or("REDIS_RESPONSE_TIMEOUT_MS", 5_000),
            api_rate_limit_max: env_or("API_RATE_LIMIT_MAX", 100),
            api_rate_limit_window_seconds: env_or("API_RATE_LIMIT_WINDOW_SECONDS", 900),
            create_rate_limit_max: env_or("CREATE_RATE_LIMIT_MAX", 50),
            create_rate_limit_window_seconds: env_or("CREATE_RATE_LIMIT_WINDOW_SECONDS", 3_600),
            trust_proxy: env_or("TRUST_PROXY", true),
            frontend_url: env::var("FRONTEND_URL").ok().filter(|v| !v.is_empty()),
            body_limit_bytes: env_or("BODY_LIMIT_BYTES", 10 * 1024),
            request_timeout_seconds: env_or("REQUEST_TIMEOUT_SECONDS", 10),
        }
    }

    /// Get cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn pin_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.pin_cache_ttl_seconds)
    }

    pub fn image_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.image_cache_ttl_seconds)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }

    /// Policy of the per-IP limiter applied to every API request.
    pub fn api_rate_limit(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            self.api_rate_limit_max,
            Duration::from_secs(self.api_rate_limit_window_seconds),
        )
    }

    /// Policy of the per-user limiter applied to pin creation.
    pub fn create_rate_limit(&self) -> RateLimitPolicy {
        RateLimitPolicy::new(
            self.create_rate_limit_max,
            Duration::from_secs(self.create_rate_limit_window_seconds),
        )
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttl_conversions() {
        let config = Config {
            cache_ttl_seconds: 600,
            pin_cache_ttl_seconds: 7_200,
            image_cache_ttl_seconds: 60,
            ..Config::from_env()
        };

        assert_eq!(config.cache_ttl(), Duration::from_secs(600));
        assert_eq!(config.pin_cache_ttl(), Duration::from_secs(7_200));
        assert_eq!(config.image_cache_ttl(), Duration::from_secs(60));
    }

    #[test]
    fn test_rate_limit_policies() {
        let config = Config {
            api_rate_limit_max: 5,
            api_rate_limit_window_seconds: 60,
            create_rate_limit_max: 2,
            create_rate_limit_window_seconds: 30,
            ..Config::from_env()
        };

        assert_eq!(
            config.api_rate_limit(),
            RateLimitPolicy::new(5, Duration::from_secs(60))
        );
        assert_eq!(
            config.create_rate_limit(),
            RateLimitPolicy::new(2, Duration::from_secs(30))
        );
    }

    #[test]
    fn test_default_values() {
        // Clear environment variables to test defaults
        for name in [
            "CACHE_TTL_SECONDS",
            "PIN_CACHE_TTL_SECONDS",
            "IMAGE_CACHE_TTL_SECONDS",
            "CACHE_MAX_ENTRIES",
            "SQLITE_PATH",
            "REDIS_URL",
            "API_RATE_LIMIT_MAX",
            "CREATE_RATE_LIMIT_MAX",
            "TRUST_PROXY",
            "BODY_LIMIT_BYTES",
        ] {
            env::remove_var(name);
        }

        let config = Config::from_env();

        assert_eq!(config.cache_ttl_seconds, 300);
        assert_eq!(config.pin_cache_ttl_seconds, 3_600);
        assert_eq!(config.image_cache_ttl_seconds, 86_400);
        assert_eq!(config.cache_max_entries, 10_000);
        assert_eq!(config.sqlite_path, "pinboard.db");
        assert_eq!(config.redis_url, "redis://localhost:6379");
        assert_eq!(config.api_rate_limit_max, 100);
        assert_eq!(config.create_rate_limit_max, 50);
        assert!(config.trust_proxy);
        assert_eq!(config.body_limit_bytes, 10_240);
    }
}
