//! Async client for the Craiyon text-to-image backend.
//!
//! ```no_run
//! use craiyon::{ClientConfig, DefaultClient, Model, RequestOptions};
//!
//! # async fn run() -> craiyon::Result<()> {
//! let client = DefaultClient::new(ClientConfig::new().with_max_retries(5))?;
//! let output = client
//!     .generate(&RequestOptions::new("a watercolor fox").with_model(Model::Art))
//!     .await?;
//!
//! for (i, image) in output.images().iter().enumerate() {
//!     image.save(format!("fox-{}.jpg", i))?;
//! }
//! # Ok(())
//! # }
//! ```

pub mod api;
pub mod config;
pub mod error;
pub mod logger;
pub mod models;

pub use api::{
    Client, ClientV1, ClientV3, DefaultClient, Protocol, ReqwestTransport, RetryPolicy, Transport,
};
pub use config::ClientConfig;
pub use error::{CraiyonError, Result};
pub use models::{GenerationResult, ImageAsset, Model, RequestOptions};
