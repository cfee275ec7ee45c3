//! Configuration loading for blog-neta.
//!
//! Layered config: defaults -> config file -> `NETA_*` env vars ->
//! well-known vendor env vars for unset credentials -> CLI flags.
//! The default config file lives at ~/.config/blog-neta/config.toml.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::NetaError;

/// Qiita API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QiitaSettings {
    /// API host (e.g., "https://qiita.com")
    #[serde(default = "default_qiita_base_url")]
    pub base_url: String,

    /// Optional personal access token (raises the rate limit)
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_qiita_base_url() -> String {
    "https://qiita.com".to_string()
}

fn default_http_timeout_secs() -> u64 {
    10
}

impl Default for QiitaSettings {
    fn default() -> Self {
        Self {
            base_url: default_qiita_base_url(),
            access_token: None,
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Web search backend settings.
///
/// Google Custom Search is the primary backend, Tavily the secondary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchSettings {
    #[serde(default)]
    pub google_api_key: Option<String>,

    /// Programmable search engine id
    #[serde(default)]
    pub google_cse_id: Option<String>,

    #[serde(default = "default_google_base_url")]
    pub google_base_url: String,

    #[serde(default)]
    pub tavily_api_key: Option<String>,

    #[serde(default = "default_tavily_base_url")]
    pub tavily_base_url: String,

    /// Request timeout in seconds (both backends)
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_google_base_url() -> String {
    "https://www.googleapis.com/customsearch/v1".to_string()
}

fn default_tavily_base_url() -> String {
    "https://api.tavily.com".to_string()
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            google_api_key: None,
            google_cse_id: None,
            google_base_url: default_google_base_url(),
            tavily_api_key: None,
            tavily_base_url: default_tavily_base_url(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

/// Text-generation service settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationSettings {
    /// Provider name ("anthropic" or "openai")
    #[serde(default = "default_generation_provider")]
    pub provider: String,

    /// Model used for category synthesis
    #[serde(default = "default_category_model")]
    pub category_model: String,

    /// Model used for streamed idea proposals
    #[serde(default = "default_idea_model")]
    pub idea_model: String,

    /// API key (loaded from env var, not stored in config file)
    #[serde(default)]
    pub api_key: Option<String>,

    /// API base URL (for custom endpoints)
    #[serde(default)]
    pub base_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_generation_timeout_secs")]
    pub timeout_secs: u64,
}

/// Whether a provider name selects the OpenAI-compatible protocol.
///
/// Case and surrounding whitespace are ignored; "open_ai" is accepted.
pub fn is_openai_provider(name: &str) -> bool {
    matches!(name.trim().to_lowercase().as_str(), "openai" | "open_ai")
}

fn default_generation_provider() -> String {
    "anthropic".to_string()
}

fn default_category_model() -> String {
    "claude-3-haiku-20240307".to_string()
}

fn default_idea_model() -> String {
    "claude-3-7-sonnet-20250219".to_string()
}

fn default_generation_timeout_secs() -> u64 {
    60
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            provider: default_generation_provider(),
            category_model: default_category_model(),
            idea_model: default_idea_model(),
            api_key: None,
            base_url: None,
            timeout_secs: default_generation_timeout_secs(),
        }
    }
}

/// Optional Langfuse trace sink credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TracingSettings {
    #[serde(default)]
    pub langfuse_public_key: Option<String>,

    #[serde(default)]
    pub langfuse_secret_key: Option<String>,

    #[serde(default = "default_langfuse_host")]
    pub langfuse_host: String,
}

fn default_langfuse_host() -> String {
    "https://cloud.langfuse.com".to_string()
}

impl Default for TracingSettings {
    fn default() -> Self {
        Self {
            langfuse_public_key: None,
            langfuse_secret_key: None,
            langfuse_host: default_langfuse_host(),
        }
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub qiita: QiitaSettings,

    #[serde(default)]
    pub search: SearchSettings,

    #[serde(default)]
    pub generation: GenerationSettings,

    #[serde(default)]
    pub tracing: TracingSettings,

    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            qiita: QiitaSettings::default(),
            search: SearchSettings::default(),
            generation: GenerationSettings::default(),
            tracing: TracingSettings::default(),
            log_level: default_log_level(),
        }
    }
}

impl Settings {
    /// Load settings with layered precedence:
    /// 1. Built-in defaults
    /// 2. Config file (~/.config/blog-neta/config.toml)
    /// 3. CLI-specified config file (optional)
    /// 4. Environment variables (NETA_*, e.g. NETA_QIITA__BASE_URL)
    /// 5. Vendor environment variables for credentials still unset
    ///
    /// CLI flags should be applied by the caller after this returns.
    pub fn load(cli_config_path: Option<&str>) -> Result<Self, NetaError> {
        let config_dir = ProjectDirs::from("", "", "blog-neta")
            .map(|p| p.config_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."));

        let default_config_path = config_dir.join("config");

        let mut builder = Config::builder()
            .set_default("log_level", default_log_level())
            .map_err(|e| NetaError::Config(e.to_string()))?
            .set_default("generation.provider", default_generation_provider())
            .map_err(|e| NetaError::Config(e.to_string()))?
            .add_source(File::with_name(&default_config_path.to_string_lossy()).required(false));

        if let Some(path) = cli_config_path {
            builder = builder.add_source(File::with_name(path).required(true));
        }

        builder = builder.add_source(
            Environment::with_prefix("NETA")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder
            .build()
            .map_err(|e| NetaError::Config(e.to_string()))?;

        let mut settings: Settings = config
            .try_deserialize()
            .map_err(|e| NetaError::Config(e.to_string()))?;

        settings.fill_from_vendor_env(|key| std::env::var(key).ok());
        Ok(settings)
    }

    /// Fill unset credentials from the variables each vendor documents.
    ///
    /// The generation key is read from `ANTHROPIC_API_KEY` or
    /// `OPENAI_API_KEY` depending on the configured provider.
    pub fn fill_from_vendor_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        fill(&mut self.qiita.access_token, || get("QIITA_ACCESS_TOKEN"));
        fill(&mut self.search.google_api_key, || get("GOOGLE_API_KEY"));
        fill(&mut self.search.google_cse_id, || get("GOOGLE_CSE_ID"));
        fill(&mut self.search.tavily_api_key, || get("TAVILY_API_KEY"));
        fill(&mut self.tracing.langfuse_public_key, || {
            get("LANGFUSE_PUBLIC_KEY")
        });
        fill(&mut self.tracing.langfuse_secret_key, || {
            get("LANGFUSE_SECRET_KEY")
        });
        if let Some(host) = get("LANGFUSE_HOST") {
            if self.tracing.langfuse_host == default_langfuse_host() {
                self.tracing.langfuse_host = host;
            }
        }

        let key_var = if is_openai_provider(&self.generation.provider) {
            "OPENAI_API_KEY"
        } else {
            "ANTHROPIC_API_KEY"
        };
        fill(&mut self.generation.api_key, || get(key_var));
    }
}

fn fill(slot: &mut Option<String>, source: impl FnOnce() -> Option<String>) {
    if slot.as_deref().map_or(true, |v| v.trim().is_empty()) {
        if let Some(value) = source() {
            *slot = Some(value);
        }
    }
}

/// Trace tagging switch, built once at process start and passed by
/// reference to every component that tags generation calls.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    enabled: bool,
    host: String,
    auth_token: Option<SecretString>,
}

impl TracingConfig {
    /// A config with tagging turned off.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            host: default_langfuse_host(),
            auth_token: None,
        }
    }

    /// Enabled only when both Langfuse keys are present.
    pub fn from_settings(settings: &TracingSettings) -> Self {
        let public_key = settings
            .langfuse_public_key
            .as_deref()
            .filter(|k| !k.is_empty());
        let secret_key = settings
            .langfuse_secret_key
            .as_deref()
            .filter(|k| !k.is_empty());

        match (public_key, secret_key) {
            (Some(public_key), Some(secret_key)) => Self {
                enabled: true,
                host: settings.langfuse_host.trim_end_matches('/').to_string(),
                auth_token: Some(SecretString::from(
                    STANDARD.encode(format!("{public_key}:{secret_key}")),
                )),
            },
            _ => Self::disabled(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    /// OTLP trace ingestion endpoint of the Langfuse host.
    pub fn otlp_endpoint(&self) -> Option<String> {
        self.enabled
            .then(|| format!("{}/api/public/otel/v1/traces", self.host))
    }

    /// `Authorization` header value for the OTLP exporter.
    pub fn auth_header(&self) -> Option<String> {
        self.auth_token
            .as_ref()
            .map(|token| format!("Basic {}", token.expose_secret()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.qiita.base_url, "https://qiita.com");
        assert_eq!(settings.qiita.timeout_secs, 10);
        assert_eq!(settings.search.timeout_secs, 10);
        assert_eq!(settings.generation.provider, "anthropic");
        assert_eq!(settings.log_level, "info");
        assert!(settings.search.google_api_key.is_none());
    }

    #[test]
    fn test_load_with_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("neta.toml");
        std::fs::write(
            &path,
            r#"
log_level = "debug"

[qiita]
base_url = "http://localhost:9999"

[generation]
provider = "openai"
category_model = "gpt-4o-mini"
"#,
        )
        .unwrap();

        let settings = Settings::load(Some(path.to_str().unwrap())).unwrap();
        assert_eq!(settings.log_level, "debug");
        assert_eq!(settings.qiita.base_url, "http://localhost:9999");
        assert_eq!(settings.generation.provider, "openai");
        assert_eq!(settings.generation.category_model, "gpt-4o-mini");
        assert_eq!(settings.generation.idea_model, default_idea_model());
    }

    #[test]
    fn test_vendor_env_fills_unset_credentials() {
        let env: HashMap<&str, &str> = [
            ("GOOGLE_API_KEY", "g-key"),
            ("GOOGLE_CSE_ID", "cse"),
            ("TAVILY_API_KEY", "tvly"),
            ("ANTHROPIC_API_KEY", "sk-ant"),
            ("OPENAI_API_KEY", "sk-oai"),
            ("LANGFUSE_HOST", "https://langfuse.example.com"),
        ]
        .into_iter()
        .collect();

        let mut settings = Settings::default();
        settings.search.tavily_api_key = Some("configured".to_string());
        settings.fill_from_vendor_env(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(settings.search.google_api_key.as_deref(), Some("g-key"));
        assert_eq!(settings.search.google_cse_id.as_deref(), Some("cse"));
        assert_eq!(settings.search.tavily_api_key.as_deref(), Some("configured"));
        assert_eq!(settings.generation.api_key.as_deref(), Some("sk-ant"));
        assert_eq!(
            settings.tracing.langfuse_host,
            "https://langfuse.example.com"
        );
        assert!(settings.qiita.access_token.is_none());
    }

    #[test]
    fn test_vendor_env_openai_provider() {
        let mut settings = Settings::default();
        settings.generation.provider = "openai".to_string();
        settings.fill_from_vendor_env(|k| match k {
            "ANTHROPIC_API_KEY" => Some("sk-ant".to_string()),
            "OPENAI_API_KEY" => Some("sk-oai".to_string()),
            _ => None,
        });
        assert_eq!(settings.generation.api_key.as_deref(), Some("sk-oai"));
    }

    #[test]
    fn test_vendor_env_openai_aliases() {
        for provider in ["open_ai", " OpenAI ", "OPEN_AI"] {
            let mut settings = Settings::default();
            settings.generation.provider = provider.to_string();
            settings.fill_from_vendor_env(|k| match k {
                "ANTHROPIC_API_KEY" => Some("sk-ant".to_string()),
                "OPENAI_API_KEY" => Some("sk-oai".to_string()),
                _ => None,
            });
            assert_eq!(
                settings.generation.api_key.as_deref(),
                Some("sk-oai"),
                "provider {provider:?}"
            );
        }
    }

    #[test]
    fn test_is_openai_provider() {
        assert!(is_openai_provider("openai"));
        assert!(is_openai_provider("open_ai"));
        assert!(!is_openai_provider("anthropic"));
        assert!(!is_openai_provider("claude"));
    }

    #[test]
    fn test_tracing_disabled_without_both_keys() {
        let settings = TracingSettings {
            langfuse_public_key: Some("pk-lf".to_string()),
            ..Default::default()
        };
        let config = TracingConfig::from_settings(&settings);
        assert!(!config.is_enabled());
        assert!(config.otlp_endpoint().is_none());
        assert!(config.auth_header().is_none());
    }

    #[test]
    fn test_tracing_enabled() {
        let settings = TracingSettings {
            langfuse_public_key: Some("pk".to_string()),
            langfuse_secret_key: Some("sk".to_string()),
            langfuse_host: "https://cloud.langfuse.com/".to_string(),
        };
        let config = TracingConfig::from_settings(&settings);
        assert!(config.is_enabled());
        assert_eq!(
            config.otlp_endpoint().as_deref(),
            Some("https://cloud.langfuse.com/api/public/otel/v1/traces")
        );
        // base64("pk:sk")
        assert_eq!(config.auth_header().as_deref(), Some("Basic cGs6c2s="));
    }
}
