use crate::error::{CraiyonError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Drawing style understood by the v3 backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Model {
    #[default]
    None,
    Art,
    Drawing,
    Photo,
}

impl Model {
    pub fn as_str(&self) -> &'static str {
        match self {
            Model::None => "none",
            Model::Art => "art",
            Model::Drawing => "drawing",
            Model::Photo => "photo",
        }
    }
}

impl fmt::Display for Model {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Model {
    type Err = CraiyonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(Model::None),
            "art" => Ok(Model::Art),
            "drawing" => Ok(Model::Drawing),
            "photo" => Ok(Model::Photo),
            other => Err(CraiyonError::Config(format!("Unknown model: {}", other))),
        }
    }
}

/// Options for a single `generate` call. Nothing here touches client state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestOptions {
    pub prompt: String,
    pub max_retries: Option<u32>,
    pub negative_prompt: Option<String>,
    pub model: Option<Model>,
}

impl RequestOptions {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            max_retries: None,
            negative_prompt: None,
            model: None,
        }
    }

    /// Overrides the client's retry budget for this call only.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = Some(max_retries);
        self
    }

    /// What the image should avoid. Only the v3 backend uses it.
    pub fn with_negative_prompt(mut self, negative_prompt: impl Into<String>) -> Self {
        self.negative_prompt = Some(negative_prompt.into());
        self
    }

    pub fn with_model(mut self, model: Model) -> Self {
        self.model = Some(model);
        self
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.prompt.trim().is_empty() {
            return Err(CraiyonError::InvalidRequest("prompt must not be empty".into()));
        }
        Ok(())
    }
}

impl From<&str> for RequestOptions {
    fn from(prompt: &str) -> Self {
        RequestOptions::new(prompt)
    }
}

impl From<String> for RequestOptions {
    fn from(prompt: String) -> Self {
        RequestOptions::new(prompt)
    }
}

#[derive(Debug, Serialize)]
pub(crate) struct V3Payload<'a> {
    pub prompt: &'a str,
    pub version: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<&'a str>,
    pub model: Model,
    pub negative_prompt: &'a str,
}

/// The v3 endpoint answers with image ids, not image data.
#[derive(Debug, Deserialize)]
pub(crate) struct V3Response {
    pub images: Vec<String>,
    #[serde(default)]
    pub version: Option<String>,
}
