use crate::{
    api::{
        retry::RetryPolicy,
        transport::{ReqwestTransport, Transport},
    },
    config::{ClientConfig, DEFAULT_IMAGE_HOST, DEFAULT_MODEL_VERSION},
    error::{CraiyonError, Result},
    logger,
    models::{GenerationResult, ImageAsset, RequestOptions, V3Payload, V3Response},
};
use futures::future::try_join_all;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Client for the `/v3` endpoint.
///
/// The backend answers with image ids. Each id is downloaded from the image
/// host concurrently and re-encoded as base64, keeping the order of the ids.
#[derive(Clone)]
pub struct ClientV3 {
    transport: Arc<dyn Transport>,
    base_url: String,
    max_retries: u32,
    api_token: Option<String>,
    model_version: String,
    image_host: String,
}

impl fmt::Debug for ClientV3 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientV3")
            .field("base_url", &self.base_url)
            .field("max_retries", &self.max_retries)
            .field("api_token", &self.api_token.as_ref().map(|_| "<redacted>"))
            .field("model_version", &self.model_version)
            .field("image_host", &self.image_host)
            .finish()
    }
}

impl ClientV3 {
    pub const DEFAULT_BASE_URL: &'static str = "https://api.craiyon.com";
    pub const GENERATE_PATH: &'static str = "/v3";

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
            image_host: config
                .image_host
                .as_deref()
                .unwrap_or(DEFAULT_IMAGE_HOST)
                .trim_end_matches('/')
                .to_string(),
            model_version: config
                .model_version
                .unwrap_or_else(|| DEFAULT_MODEL_VERSION.to_string()),
            api_token: config.api_token,
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

    /// Model version sent with every request.
    pub fn model_version(&self) -> &str {
        &self.model_version
    }

    /// Host the returned image ids are resolved against.
    pub fn image_host(&self) -> &str {
        &self.image_host
    }

    fn build_payload(&self, options: &RequestOptions) -> Result<Value> {
        let payload = V3Payload {
            prompt: &options.prompt,
            version: &self.model_version,
            token: self.api_token.as_deref(),
            model: options.model.unwrap_or_default(),
            negative_prompt: options.negative_prompt.as_deref().unwrap_or(""),
        };
        serde_json::to_value(&payload).map_err(|e| CraiyonError::InvalidRequest(e.to_string()))
    }

    /// Sends the prompt, then downloads every referenced image. Each attempt
    /// covers both steps, so a failed download retries the whole request.
    pub async fn generate(&self, options: &RequestOptions) -> Result<GenerationResult> {
        options.validate()?;

        let url = format!("{}{}", self.base_url, Self::GENERATE_PATH);
        let payload = self.build_payload(options)?;
        let policy = RetryPolicy::new(options.max_retries.unwrap_or(self.max_retries));
        let _timer = logger::timer("craiyon v3 generate");

        let url = url.as_str();
        let payload = &payload;
        let output = policy
            .run(|attempt| async move {
                log::debug!("POST {} (attempt {})", url, attempt);
                let raw = self.transport.post_json(url, payload).await?;
                self.fetch_images(raw).await
            })
            .await?;

        log::info!("Received {} images", output.len());
        Ok(output)
    }

    /// Resolves the ids in a `/v3` response against the image host. A single
    /// failed download fails the whole batch.
    async fn fetch_images(&self, raw: Value) -> Result<GenerationResult> {
        let response: V3Response = serde_json::from_value(raw)
            .map_err(|e| CraiyonError::MalformedResponse(e.to_string()))?;

        if response.images.is_empty() {
            return Err(CraiyonError::MalformedResponse(
                "response contains no images".into(),
            ));
        }

        log::debug!("Fetching {} images from {}", response.images.len(), self.image_host);

        let downloads = response.images.iter().map(|id| {
            let url = format!("{}/{}", self.image_host, id.trim_start_matches('/'));
            async move { self.transport.get_bytes(&url).await }
        });
        let blobs = try_join_all(downloads).await?;

        let images = blobs
            .iter()
            .map(|bytes| ImageAsset::from_bytes(bytes))
            .collect();
        Ok(GenerationResult::new(images, response.version))
    }
}
