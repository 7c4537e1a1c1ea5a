use crate::error::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::Stream;
use std::io::Write;
use std::path::Path;
use tokio::io::AsyncWriteExt;

const STREAM_CHUNK_SIZE: usize = 64 * 1024;

/// One generated image, held as base64 text.
///
/// Backend responses may wrap the base64 payload over several lines, so line
/// breaks are removed on construction. Decoding happens on demand and never
/// mutates the asset.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageAsset {
    base64: String,
}

impl ImageAsset {
    pub fn new(base64: impl Into<String>) -> Self {
        let mut base64 = base64.into();
        base64.retain(|c| c != '\n' && c != '\r');
        Self { base64 }
    }

    /// Wraps raw image bytes, encoding them as standard base64.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        Self {
            base64: STANDARD.encode(bytes),
        }
    }

    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    /// Decodes the stored base64. Pure; call it as often as needed.
    pub fn decode(&self) -> Result<Vec<u8>> {
        Ok(STANDARD.decode(&self.base64)?)
    }

    /// Writes the decoded image to `path`, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.decode()?;
        let mut file = std::fs::File::create(path.as_ref())?;
        file.write_all(&bytes)?;
        file.flush()?;
        log::debug!("Saved {} bytes to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }

    /// Async counterpart of [`ImageAsset::save`].
    pub async fn save_async(&self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = self.decode()?;
        let mut file = tokio::fs::File::create(path.as_ref()).await?;
        file.write_all(&bytes).await?;
        file.flush().await?;
        log::debug!("Saved {} bytes to {}", bytes.len(), path.as_ref().display());
        Ok(())
    }

    /// Single-pass stream over the decoded bytes in fixed-size chunks.
    pub fn open_stream(&self) -> Result<impl Stream<Item = Vec<u8>> + Unpin> {
        let bytes = self.decode()?;
        let chunks: Vec<Vec<u8>> = bytes
            .chunks(STREAM_CHUNK_SIZE)
            .map(|chunk| chunk.to_vec())
            .collect();
        Ok(tokio_stream::iter(chunks))
    }
}
