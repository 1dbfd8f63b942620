//! Remote catalog connection configuration.
//!
//! # Example
//!
//! ```toml
//! [catalog]
//! shop = "example.myshopify.com"
//! api_version = "2023-10"
//! access_token = "${SHOP_ADMIN_TOKEN}"
//! page_size = 250
//! max_pages = 40
//!
//! [catalog.retry]
//! max_retries = 3
//! ```

use serde::{Deserialize, Serialize};

/// Largest page the admin API will return for a product listing.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Connection settings for the remote catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogConfig {
    /// Shop domain, e.g. `example.myshopify.com`. Used to build
    /// `https://{shop}` when `base_url` is not set.
    #[serde(default)]
    pub shop: Option<String>,

    /// Explicit base URL (scheme and host). Takes precedence over `shop`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Admin API version segment.
    #[serde(default = "default_api_version")]
    pub api_version: String,

    /// Admin access token. Sent on every request; never refreshed.
    pub access_token: String,

    /// How the access token is attached to requests.
    #[serde(default)]
    pub auth_scheme: AuthScheme,

    /// Items requested per page (1..=250).
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Hard cap on pages fetched in one enumeration.
    #[serde(default = "default_max_pages")]
    pub max_pages: u32,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Retry behaviour for listing requests. Deletes are never retried.
    #[serde(default)]
    pub retry: RetryConfig,
}

/// Header scheme used to present the access token.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthScheme {
    /// `X-Shopify-Access-Token: <token>`
    #[default]
    AccessToken,
    /// `Authorization: Bearer <token>`
    Bearer,
}

fn default_api_version() -> String {
    "2023-10".to_string()
}

fn default_page_size() -> u32 {
    MAX_PAGE_SIZE
}

fn default_max_pages() -> u32 {
    40
}

fn default_timeout_secs() -> u64 {
    30
}

impl CatalogConfig {
    /// Root of the admin REST API, without a trailing slash.
    pub fn api_root(&self) -> String {
        let base = match (&self.base_url, &self.shop) {
            (Some(url), _) => url.trim_end_matches('/').to_string(),
            (None, Some(shop)) => format!("https://{}", shop.trim_end_matches('/')),
            (None, None) => String::new(),
        };
        format!("{}/admin/api/{}", base, self.api_version)
    }

    /// Get the request timeout as a Duration.
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.timeout_secs)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        let has_target = self.base_url.as_deref().is_some_and(|s| !s.trim().is_empty())
            || self.shop.as_deref().is_some_and(|s| !s.trim().is_empty());
        if !has_target {
            return Err("catalog: either `shop` or `base_url` must be set".to_string());
        }
        if self.access_token.trim().is_empty() {
            return Err("catalog: `access_token` must not be empty".to_string());
        }
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            return Err(format!(
                "catalog: `page_size` must be between 1 and {}, got {}",
                MAX_PAGE_SIZE, self.page_size
            ));
        }
        if self.max_pages == 0 {
            return Err("catalog: `max_pages` must be at least 1".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("catalog: `timeout_secs` must be at least 1".to_string());
        }
        Ok(())
    }
}

/// Retry configuration for idempotent catalog reads.
///
/// Retries on connection errors and on status codes that indicate temporary
/// issues (429, 5xx) with exponential backoff.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RetryConfig {
    /// Whether retries are enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Maximum number of retry attempts (not including the initial request).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Initial delay before first retry in milliseconds.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,

    /// Maximum delay between retries in milliseconds.
    #[serde(default = "default_max_delay_ms")]
    pub max_delay_ms: u64,

    /// Multiplier for exponential backoff.
    #[serde(default = "default_backoff_multiplier")]
    pub backoff_multiplier: f64,

    /// Add random jitter to delays (percentage, 0.0-1.0).
    #[serde(default = "default_jitter")]
    pub jitter: f64,

    /// Status codes that should trigger a retry.
    #[serde(default = "default_retryable_status_codes")]
    pub retryable_status_codes: Vec<u16>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
            max_delay_ms: default_max_delay_ms(),
            backoff_multiplier: default_backoff_multiplier(),
            jitter: default_jitter(),
            retryable_status_codes: default_retryable_status_codes(),
        }
    }
}

impl RetryConfig {
    /// A config that performs exactly one attempt.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    /// Check if a status code should trigger a retry.
    pub fn should_retry_status(&self, status: u16) -> bool {
        self.enabled && self.retryable_status_codes.contains(&status)
    }

    /// Calculate the delay for a given retry attempt (0-indexed).
    pub fn delay_for_attempt(&self, attempt: u32) -> std::time::Duration {
        let base_delay =
            (self.initial_delay_ms as f64) * self.backoff_multiplier.powi(attempt as i32);
        let capped_delay = base_delay.min(self.max_delay_ms as f64);

        let jitter_range = capped_delay * self.jitter;
        let jitter = if jitter_range > 0.0 {
            use rand::Rng;
            rand::thread_rng().gen_range(-jitter_range..jitter_range)
        } else {
            0.0
        };

        let final_delay = (capped_delay + jitter).max(0.0);
        std::time::Duration::from_millis(final_delay as u64)
    }
}

fn default_true() -> bool {
    true
}

fn default_max_retries() -> u32 {
    3
}

fn default_initial_delay_ms() -> u64 {
    100
}

fn default_max_delay_ms() -> u64 {
    10_000
}

fn default_backoff_multiplier() -> f64 {
    2.0
}

fn default_jitter() -> f64 {
    0.1
}

fn default_retryable_status_codes() -> Vec<u16> {
    vec![429, 500, 502, 503, 504]
}
