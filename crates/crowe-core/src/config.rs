//! Process-wide configuration, read once from environment variables at
//! startup and then passed explicitly to whoever needs it.

/// Environment variable holding the hosted key-value service URL.
pub const KV_URL_VAR: &str = "KV_REST_API_URL";
/// Environment variable holding the hosted key-value service token.
pub const KV_TOKEN_VAR: &str = "KV_REST_API_TOKEN";

const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_OPENAI_MODEL: &str = "gpt-4o";

/// Which storage backend serves the process.
#[derive(Clone, PartialEq, Eq)]
pub enum BackendSelection {
    /// Hosted key-value service reached over HTTPS.
    Remote { url: String, token: String },
    /// Process memory. Lost on restart, never shared between processes.
    InProcess,
}

impl std::fmt::Debug for BackendSelection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            // The token never reaches logs.
            BackendSelection::Remote { url, .. } => f
                .debug_struct("Remote")
                .field("url", url)
                .field("token", &"<redacted>")
                .finish(),
            BackendSelection::InProcess => f.write_str("InProcess"),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub backend: BackendSelection,
}

impl StoreConfig {
    /// Build [`StoreConfig`] from `KV_REST_API_URL` / `KV_REST_API_TOKEN`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`StoreConfig::from_env`] with a custom variable source.
    ///
    /// The remote backend is chosen only when both values are present and
    /// non-blank; anything else selects the in-process backend.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let url = non_blank(lookup(KV_URL_VAR));
        let token = non_blank(lookup(KV_TOKEN_VAR));
        let backend = match (url, token) {
            (Some(url), Some(token)) => BackendSelection::Remote { url, token },
            _ => BackendSelection::InProcess,
        };
        Self { backend }
    }

    pub fn in_process() -> Self {
        Self {
            backend: BackendSelection::InProcess,
        }
    }
}

/// Settings for the OpenAI-compatible language-model client.
#[derive(Clone)]
pub struct GeneratorConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
}

impl std::fmt::Debug for GeneratorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeneratorConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .finish()
    }
}

impl GeneratorConfig {
    /// Returns `None` when `OPENAI_API_KEY` is unset or blank.
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Option<Self> {
        let api_key = non_blank(lookup("OPENAI_API_KEY"))?;
        Some(Self {
            api_key,
            base_url: non_blank(lookup("OPENAI_BASE_URL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_owned()),
            model: non_blank(lookup("OPENAI_MODEL"))
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_owned()),
        })
    }
}

// ── private helpers ──────────────────────────────────────────────────────────

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn both_values_select_remote() {
        let cfg = StoreConfig::from_lookup(lookup(&[
            (KV_URL_VAR, "https://kv.example.com"),
            (KV_TOKEN_VAR, "secret"),
        ]));
        assert_eq!(
            cfg.backend,
            BackendSelection::Remote {
                url: "https://kv.example.com".into(),
                token: "secret".into(),
            }
        );
    }

    #[test]
    fn missing_token_selects_in_process() {
        let cfg = StoreConfig::from_lookup(lookup(&[(KV_URL_VAR, "https://kv.example.com")]));
        assert_eq!(cfg.backend, BackendSelection::InProcess);
    }

    #[test]
    fn blank_url_selects_in_process() {
        let cfg = StoreConfig::from_lookup(lookup(&[(KV_URL_VAR, "  "), (KV_TOKEN_VAR, "secret")]));
        assert_eq!(cfg.backend, BackendSelection::InProcess);
    }

    #[test]
    fn debug_output_hides_token() {
        let sel = BackendSelection::Remote {
            url: "https://kv.example.com".into(),
            token: "secret".into(),
        };
        let rendered = format!("{sel:?}");
        assert!(!rendered.contains("secret"));
        assert!(rendered.contains("kv.example.com"));
    }

    #[test]
    fn generator_defaults() {
        let cfg = GeneratorConfig::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")]))
            .expect("key present");
        assert_eq!(cfg.base_url, DEFAULT_OPENAI_BASE_URL);
        assert_eq!(cfg.model, DEFAULT_OPENAI_MODEL);
        assert!(GeneratorConfig::from_lookup(lookup(&[])).is_none());
    }
}
