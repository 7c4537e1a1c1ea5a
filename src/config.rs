use crate::error::{CraiyonError, Result};
use std::env;
use std::time::Duration;

pub const DEFAULT_MAX_RETRIES: u32 = 3;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_MODEL_VERSION: &str = "35s5hfwn9n78gb06";
pub const DEFAULT_IMAGE_HOST: &str = "https://img.craiyon.com";

/// Connection settings shared by every protocol client.
///
/// Fields left as `None` are filled with the protocol's defaults when a client
/// is built, so one config can be handed to either `ClientV1` or `ClientV3`.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    pub base_url: Option<String>,
    pub max_retries: Option<u32>,
    pub api_token: Option<String>,
    pub model_version: Option<String>,
    pub timeout: Option<Duration>,
    pub image_host: Option<String>,
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the `CRAIYON_*` variables. Unset variables stay `None`; set but
    /// unparseable numbers are a configuration error.
    pub fn from_env() -> Result<Self> {
        let max_retries = parse_env::<u32>("CRAIYON_MAX_RETRIES")?;
        let timeout = parse_env::<u64>("CRAIYON_TIMEOUT_SECS")?.map(Duration::from_secs);

        Ok(ClientConfig {
            base_url: env::var("CRAIYON_BASE_URL").ok(),
            max_retries,
            api_token: env::var("CRAIYON_API_TOKEN").ok(),
            model_version: env::var("CRAIYON_MODEL_VERSION").ok(),
            timeout,
            image_host: env::var("CRAIYON_IMAGE_HOST").ok(),
        })
    }

    /// Base URL of the backend, without the endpoint path.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Default retry budget; `RequestOptions::with_max_retries` overrides it per call.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// Token sent in the v3 payload. Ignored by v1.
    pub fn with_api_token(mut self, api_token: impl Into<String>) -> Self {
        self.api_token = Some(api_token.into());
        self
    }

    /// Model version sent in the v3 payload. Ignored by v1.
    pub fn with_model_version(mut self, model_version: impl Into<String>) -> Self {
        self.model_version = Some(model_version.into());
        self
    }

    /// Per-request timeout of the reqwest transport.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Host for v3 image downloads.
    pub fn with_image_host(mut self, image_host: impl Into<String>) -> Self {
        self.image_host = Some(image_host.into());
        self
    }

    pub(crate) fn resolved_base_url(&self, default: &str) -> String {
        self.base_url
            .as_deref()
            .unwrap_or(default)
            .trim_end_matches('/')
            .to_string()
    }

    pub(crate) fn resolved_max_retries(&self) -> u32 {
        self.max_retries.unwrap_or(DEFAULT_MAX_RETRIES)
    }

    pub(crate) fn resolved_timeout(&self) -> Duration {
        self.timeout.unwrap_or(DEFAULT_TIMEOUT)
    }
}

fn parse_env<T: std::str::FromStr>(key: &str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| CraiyonError::Config(format!("{} has an invalid value: {}", key, raw))),
        Err(_) => Ok(None),
    }
}
