pub mod retry;
pub mod transport;
pub mod v1;
pub mod v3;

#[cfg(test)]
pub(crate) mod mock;

use crate::{
    config::ClientConfig,
    error::{CraiyonError, Result},
    models::{GenerationResult, RequestOptions},
};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

pub use retry::{RetryPolicy, RATE_LIMIT_BACKOFF};
pub use transport::{ReqwestTransport, Transport};
pub use v1::ClientV1;
pub use v3::ClientV3;

/// The recommended client for the current backend.
pub type DefaultClient = ClientV3;

/// Backend protocol generation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Protocol {
    V1,
    #[default]
    V3,
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::V1 => f.write_str("v1"),
            Protocol::V3 => f.write_str("v3"),
        }
    }
}

impl FromStr for Protocol {
    type Err = CraiyonError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "v1" | "1" => Ok(Protocol::V1),
            "v3" | "3" => Ok(Protocol::V3),
            other => Err(CraiyonError::Config(format!("Unknown protocol: {}", other))),
        }
    }
}

/// A generation client for either protocol, chosen once at construction.
#[derive(Debug, Clone)]
pub enum Client {
    V1(ClientV1),
    V3(ClientV3),
}

impl Client {
    pub fn new(protocol: Protocol, config: ClientConfig) -> Result<Self> {
        Ok(match protocol {
            Protocol::V1 => Client::V1(ClientV1::new(config)?),
            Protocol::V3 => Client::V3(ClientV3::new(config)?),
        })
    }

    pub fn with_transport(
        protocol: Protocol,
        config: ClientConfig,
        transport: Arc<dyn Transport>,
    ) -> Self {
        match protocol {
            Protocol::V1 => Client::V1(ClientV1::with_transport(config, transport)),
            Protocol::V3 => Client::V3(ClientV3::with_transport(config, transport)),
        }
    }

    pub fn protocol(&self) -> Protocol {
        match self {
            Client::V1(_) => Protocol::V1,
            Client::V3(_) => Protocol::V3,
        }
    }

    pub async fn generate(&self, options: &RequestOptions) -> Result<GenerationResult> {
        match self {
            Client::V1(client) => client.generate(options).await,
            Client::V3(client) => client.generate(options).await,
        }
    }
}

impl From<ClientV1> for Client {
    fn from(client: ClientV1) -> Self {
        Client::V1(client)
    }
}

impl From<ClientV3> for Client {
    fn from(client: ClientV3) -> Self {
        Client::V3(client)
    }
}
