use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Default loopback port the browser extension talks to
pub const DEFAULT_HTTP_PORT: u16 = 9527;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub service: ServiceConfig,
    pub cache: CacheConfig,
    pub transcript: TranscriptConfig,
    pub chat: ChatConfig,
    pub extractor: ExtractorConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: "video-companion".to_string(),
            http: HttpConfig::default(),
        }
    }
}

/// Ingestion listener settings. The bind address is always 127.0.0.1.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub port: u16,
    /// Per-request response deadline (slow clients get 408)
    pub request_timeout_secs: u64,
    /// Hard cap on the accumulated request body
    pub max_body_bytes: usize,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_HTTP_PORT,
            request_timeout_secs: 30,
            max_body_bytes: 10 * 1024,
        }
    }
}

impl HttpConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    pub result_ttl_secs: u64,
    pub transcript_ttl_secs: u64,
    pub cleanup_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            result_ttl_secs: 30 * 60,
            transcript_ttl_secs: 30 * 60,
            cleanup_interval_secs: 5 * 60,
        }
    }
}

impl CacheConfig {
    pub fn result_ttl(&self) -> Duration {
        Duration::from_secs(self.result_ttl_secs)
    }

    pub fn transcript_ttl(&self) -> Duration {
        Duration::from_secs(self.transcript_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        // tokio::time::interval panics on a zero period
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TranscriptConfig {
    pub fetch_timeout_secs: u64,
    /// Caption languages in order of preference (e.g. ["en", "de"])
    pub preferred_languages: Vec<String>,
}

impl Default for TranscriptConfig {
    fn default() -> Self {
        Self {
            fetch_timeout_secs: 10,
            preferred_languages: vec!["en".to_string()],
        }
    }
}

impl TranscriptConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// OpenAI-compatible API root (without the trailing /chat/completions)
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            base_url: "https://generativelanguage.googleapis.com/v1beta/openai".to_string(),
            model: "gemini-2.0-flash".to_string(),
            api_key_env: "COMPANION_CHAT_API_KEY".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub program: String,
    pub timeout_secs: u64,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            program: "yt-dlp".to_string(),
            timeout_secs: 60,
        }
    }
}

impl ExtractorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from an optional file plus `COMPANION__*` environment overrides.
    ///
    /// `path` is passed to `config::File::with_name`, so the extension may be omitted.
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("COMPANION")
                    .prefix_separator("__")
                    .separator("__"),
            )
            .build()
            .with_context(|| format!("Failed to read configuration from {}", path))?;

        settings
            .try_deserialize()
            .context("Failed to parse configuration")
    }
}
