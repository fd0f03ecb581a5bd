use std::time::Duration;

use url::Url;

pub const DEFAULT_BASE_URL: &str = "https://api.skilljar.com";

/// Validated settings for a download run.
#[derive(Clone)]
pub struct Config {
    pub api_key: String,
    pub base_url: Url,
    /// Accept invalid TLS certificates on every outbound request.
    pub insecure: bool,
    /// Pause between two page requests of a paginated listing.
    pub page_delay: Duration,
    /// Pause after a lesson has been fully processed.
    pub lesson_delay: Duration,
}

#[derive(thiserror::Error)]
pub enum ConfigError {
    #[error(
        "API key must be provided via --api-key argument or SKILLJAR_API_KEY environment variable"
    )]
    MissingApiKey,
    #[error("invalid base URL {url}: {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
}

impl std::fmt::Debug for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self)
    }
}

impl Config {
    pub fn new(api_key: Option<String>, base_url: &str) -> Result<Self, ConfigError> {
        let api_key = api_key
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|source| {
            ConfigError::InvalidBaseUrl {
                url: base_url.to_string(),
                source,
            }
        })?;

        Ok(Self {
            api_key,
            base_url,
            insecure: false,
            page_delay: Duration::from_millis(100),
            lesson_delay: Duration::from_millis(200),
        })
    }

    pub fn insecure(mut self, insecure: bool) -> Self {
        self.insecure = insecure;
        self
    }

    pub fn delays(mut self, page_delay: Duration, lesson_delay: Duration) -> Self {
        self.page_delay = page_delay;
        self.lesson_delay = lesson_delay;
        self
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("insecure", &self.insecure)
            .field("page_delay", &self.page_delay)
            .field("lesson_delay", &self.lesson_delay)
            .finish()
    }
}
