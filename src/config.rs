//! Runtime configuration
//!
//! Everything tunable is resolved at process startup from the environment
//! (or CLI flags in the binary). The Gemini credential in particular is
//! never embedded in source or shipped to the browser.

use std::time::Duration;

use tracing::info;

use crate::retry::RetryPolicy;

/// Configuration for the generative-language API client.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// Base URL of the API (overridable for tests and proxies).
    pub api_base: String,
    /// API key, sent as a query parameter per the vendor's scheme.
    pub api_key: String,
    /// Model identifier.
    pub model: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Total attempts per use-case call.
    pub max_attempts: u32,
    /// Base backoff delay in milliseconds.
    pub base_delay_ms: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_base: std::env::var("GEMINI_API_BASE")
                .unwrap_or_else(|_| "https://generativelanguage.googleapis.com".to_string()),
            api_key: std::env::var("GEMINI_API_KEY").unwrap_or_default(),
            model: std::env::var("GEMINI_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string()),
            timeout_secs: 120,
            max_attempts: 5,
            base_delay_ms: 3000,
        }
    }
}

impl GeminiConfig {
    /// Resolve the config from the environment. Returns `None` when no
    /// credential is set; the server refuses to start in that case.
    pub fn from_env() -> Option<Self> {
        let config = Self::default();
        if config.api_key.is_empty() {
            return None;
        }

        info!(
            "Gemini client configured: model={}, base={}",
            config.model, config.api_base
        );
        Some(config)
    }

    /// Retry schedule for all use-case calls made with this config.
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_attempts, Duration::from_millis(self.base_delay_ms))
    }
}

/// Resource limits applied to every sandboxed submission run.
#[derive(Debug, Clone)]
pub struct SandboxConfig {
    /// Memory limit (e.g., "512m").
    pub memory_limit: String,
    /// CPU limit (1.0 = one core).
    pub cpu_limit: f64,
    /// Wall-clock timeout in seconds.
    pub timeout_secs: u64,
    /// Network mode; submissions get no network by default.
    pub network_mode: String,
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            memory_limit: "512m".to_string(),
            cpu_limit: 1.0,
            timeout_secs: 10,
            network_mode: "none".to_string(),
        }
    }
}
