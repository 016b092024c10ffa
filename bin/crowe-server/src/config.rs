//! Server configuration, loaded from environment variables at startup.

use crowe_core::{GeneratorConfig, StoreConfig};

/// Runtime configuration for crowe-server.
///
/// Everything except the language-model key has a default, so the server
/// starts with no environment at all (in-process storage, no generator).
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP address to bind (default: `"0.0.0.0:3000"`).
    pub bind_address: String,

    /// `tracing` filter string, e.g. `"info"` or `"debug,tower_http=warn"`.
    pub log_level: String,

    /// When `true`, emit log records as newline-delimited JSON.
    pub log_json: bool,

    /// Comma-separated list of allowed CORS origins; `None` allows any.
    pub cors_allowed_origins: Option<String>,

    pub store: StoreConfig,

    /// `None` when `OPENAI_API_KEY` is unset; generation routes then answer 503.
    pub generator: Option<GeneratorConfig>,
}

impl Config {
    /// Build [`Config`] from environment variables, falling back to defaults.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            bind_address: lookup("CROWE_BIND").unwrap_or_else(|| "0.0.0.0:3000".to_owned()),
            log_level: lookup("CROWE_LOG").unwrap_or_else(|| "info".to_owned()),
            log_json: lookup("CROWE_LOG_JSON")
                .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
                .unwrap_or(false),
            cors_allowed_origins: lookup("CROWE_CORS_ORIGINS").filter(|v| !v.trim().is_empty()),
            store: StoreConfig::from_lookup(&lookup),
            generator: GeneratorConfig::from_lookup(&lookup),
        }
    }
}
