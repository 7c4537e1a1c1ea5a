use crate::{
    api::{
        retry::RetryPolicy,
        transport::{ReqwestTransport, Transport},
    },
    config::ClientConfig,
    error::Result,
    logger,
    models::{GenerationResult, RequestOptions},
};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

/// Client for the original `/generate` endpoint, which returns base64 images
/// inline together with the model version.
#[derive(Clone)]
pub struct ClientV1 {
    transport: Arc<dyn Transport>,
    base_url: String,
    max_retries: u32,
}

impl fmt::Debug for ClientV1 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientV1")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .finish()
    }
}

impl ClientV1 {
    pub const DEFAULT_BASE_URL: &'static str = "https://backend.craiyon.com";
    pub const GENERATE_PATH: &'static str = "/generate";

    /// Builds a client on a reqwest transport using the config's timeout.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.resolved_timeout())?;
        Ok(Self::with_transport(config, Arc::new(transport)))
    }

    /// Builds a client on a caller-supplied transport.
    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            base_url: config.resolved_base_url(Self::DEFAULT_BASE_URL),
            max_retries: config.resolved_max_retries(),
        }
    }

    /// Resolved base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Retry budget used when a request does not override it.
    pub fn max_retries(&self) -> u32 {
        self.max_retries
    }

    /// Sends the prompt and parses the inline images, retrying per `RetryPolicy`.
    pub async fn generate(&self, options: &RequestOptions) -> Result<GenerationResult> {
        options.validate()?;
        if options.model.is_some() || options.negative_prompt.is_some() {
            log::warn!("The v1 backend ignores model and negative prompt options");
        }

        let url = format!("{}{}", self.base_url, Self::GENERATE_PATH);
        let payload = json!({ "prompt": options.prompt });
        let policy = RetryPolicy::new(options.max_retries.unwrap_or(self.max_retries));
        let _timer = logger::timer("craiyon v1 generate");

        let url = url.as_str();
        let payload = &payload;
        let transport = &self.transport;
        let output = policy
            .run(|attempt| async move {
                log::debug!("POST {} (attempt {})", url, attempt);
                let raw = transport.post_json(url, payload).await?;
                GenerationResult::from_response(raw)
            })
            .await?;

        log::info!(
            "Received {} images (version {})",
            output.len(),
            output.version().unwrap_or("unknown")
        );
        Ok(output)
    }
}
