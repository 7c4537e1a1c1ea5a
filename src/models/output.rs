use crate::{
    error::{CraiyonError, Result},
    models::image::ImageAsset,
};
use serde::Deserialize;
use serde_json::Value;

#[derive(Deserialize)]
struct RawOutput {
    images: Vec<String>,
    #[serde(default)]
    version: Option<String>,
}

/// Images produced by one `generate` call, in the order the backend returned them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    images: Vec<ImageAsset>,
    version: Option<String>,
}

impl GenerationResult {
    pub fn new(images: Vec<ImageAsset>, version: Option<String>) -> Self {
        Self { images, version }
    }

    /// Parses `{ "images": [base64, ...], "version": "..." }`.
    pub fn from_response(raw: Value) -> Result<Self> {
        let raw: RawOutput = serde_json::from_value(raw)
            .map_err(|e| CraiyonError::MalformedResponse(e.to_string()))?;

        if raw.images.is_empty() {
            return Err(CraiyonError::MalformedResponse(
                "response contains no images".into(),
            ));
        }

        Ok(Self {
            images: raw.images.into_iter().map(ImageAsset::new).collect(),
            version: raw.version,
        })
    }

    pub fn images(&self) -> &[ImageAsset] {
        &self.images
    }

    pub fn into_images(self) -> Vec<ImageAsset> {
        self.images
    }

    /// Model version reported by the backend, unchanged.
    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn as_base64(&self) -> Vec<&str> {
        self.images.iter().map(ImageAsset::as_base64).collect()
    }

    pub fn as_buffers(&self) -> Result<Vec<Vec<u8>>> {
        self.images.iter().map(ImageAsset::decode).collect()
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ImageAsset> {
        self.images.iter()
    }
}

impl<'a> IntoIterator for &'a GenerationResult {
    type Item = &'a ImageAsset;
    type IntoIter = std::slice::Iter<'a, ImageAsset>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.iter()
    }
}

impl IntoIterator for GenerationResult {
    type Item = ImageAsset;
    type IntoIter = std::vec::IntoIter<ImageAsset>;

    fn into_iter(self) -> Self::IntoIter {
        self.images.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_version_is_passed_through() {
        let output =
            GenerationResult::from_response(json!({ "images": ["YQ=="], "version": "v3-test" }))
                .unwrap();
        assert_eq!(output.version(), Some("v3-test"));
        assert_eq!(output.as_buffers().unwrap(), vec![b"a".to_vec()]);
    }

    #[test]
    fn test_order_is_preserved() {
        let output = GenerationResult::from_response(json!({
            "images": ["YQ==", "Yg==", "Yw==\n"],
            "version": "1"
        }))
        .unwrap();

        assert_eq!(output.len(), 3);
        assert_eq!(output.as_base64(), vec!["YQ==", "Yg==", "Yw=="]);
        let decoded: Vec<Vec<u8>> = output.iter().map(|i| i.decode().unwrap()).collect();
        assert_eq!(decoded, vec![b"a".to_vec(), b"b".to_vec(), b"c".to_vec()]);
    }

    #[test]
    fn test_missing_version_is_none() {
        let output = GenerationResult::from_response(json!({ "images": ["YQ=="] })).unwrap();
        assert_eq!(output.version(), None);
    }

    #[test]
    fn test_malformed_shapes() {
        for raw in [
            json!({ "version": "1" }),
            json!({ "images": "YQ==" }),
            json!({ "images": [1, 2] }),
            json!({ "images": [] }),
            json!(null),
        ] {
            assert!(matches!(
                GenerationResult::from_response(raw),
                Err(CraiyonError::MalformedResponse(_))
            ));
        }
    }
}
