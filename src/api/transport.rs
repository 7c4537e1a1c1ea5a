use crate::error::{CraiyonError, Result};
use async_trait::async_trait;
use reqwest::{
    header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE},
    Client, Response, StatusCode,
};
use serde_json::Value;
use std::time::Duration;

/// The HTTP capabilities the generation clients need.
///
/// Implementations must map a 429 status to `CraiyonError::RateLimited`, any
/// other non-success status to `CraiyonError::Backend`, and network failures to
/// `CraiyonError::Transport`, since the retry loop classifies on those.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value>;
    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>>;
}

#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CraiyonError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self { client })
    }

    pub fn from_client(client: Client) -> Self {
        Self { client }
    }

    fn build_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers
    }
}

async fn check_status(response: Response) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    if status == StatusCode::TOO_MANY_REQUESTS {
        Err(CraiyonError::RateLimited { body })
    } else {
        Err(CraiyonError::Backend {
            status: status.as_u16(),
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        let response = self
            .client
            .post(url)
            .headers(Self::build_headers())
            .json(body)
            .send()
            .await
            .map_err(|e| CraiyonError::Transport(format!("POST {} failed: {}", url, e)))?;

        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| CraiyonError::Transport(format!("Reading body of {} failed: {}", url, e)))?;

        serde_json::from_slice(&bytes).map_err(|e| CraiyonError::MalformedResponse(e.to_string()))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| CraiyonError::Transport(format!("GET {} failed: {}", url, e)))?;

        let bytes = check_status(response)
            .await?
            .bytes()
            .await
            .map_err(|e| CraiyonError::Transport(format!("Reading body of {} failed: {}", url, e)))?;

        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned HTTP/1.1 response on a local port and returns its base URL.
    async fn serve_once(status_line: &'static str, body: &'static str) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            read_request(&mut socket).await;
            let response = format!(
                "HTTP/1.1 {}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            );
            socket.write_all(response.as_bytes()).await.unwrap();
            socket.shutdown().await.unwrap();
        });

        format!("http://{}", addr)
    }

    /// Reads headers and a `content-length` body so the client never sees a reset.
    async fn read_request(socket: &mut tokio::net::TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);

            let Some(header_end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
                continue;
            };
            let headers = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
            let body_len = headers
                .lines()
                .find_map(|line| line.strip_prefix("content-length:"))
                .and_then(|len| len.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= header_end + 4 + body_len {
                return;
            }
        }
    }

    fn transport() -> ReqwestTransport {
        let client = Client::builder()
            .no_proxy()
            .timeout(Duration::from_secs(5))
            .build()
            .unwrap();
        ReqwestTransport::from_client(client)
    }

    #[tokio::test]
    async fn test_429_maps_to_rate_limited() {
        let base = serve_once("429 Too Many Requests", "slow down").await;

        let err = transport()
            .post_json(&format!("{}/v3", base), &serde_json::json!({ "prompt": "cat" }))
            .await
            .unwrap_err();

        match err {
            CraiyonError::RateLimited { body } => assert_eq!(body, "slow down"),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_other_status_maps_to_backend() {
        let base = serve_once("503 Service Unavailable", "busy").await;

        let err = transport()
            .post_json(&format!("{}/generate", base), &serde_json::json!({ "prompt": "cat" }))
            .await
            .unwrap_err();

        match err {
            CraiyonError::Backend { status, body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "busy");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_non_json_success_is_malformed() {
        let base = serve_once("200 OK", "<html>maintenance</html>").await;

        let err = transport()
            .post_json(&format!("{}/generate", base), &serde_json::json!({ "prompt": "cat" }))
            .await
            .unwrap_err();

        assert!(matches!(err, CraiyonError::MalformedResponse(_)));
        assert!(!err.is_retryable());
    }

    #[tokio::test]
    async fn test_json_success_is_parsed() {
        let base = serve_once("200 OK", r#"{"images":["YQ=="],"version":"1"}"#).await;

        let value = transport()
            .post_json(&format!("{}/generate", base), &serde_json::json!({ "prompt": "cat" }))
            .await
            .unwrap();

        assert_eq!(value["version"], "1");
        assert_eq!(value["images"][0], "YQ==");
    }

    #[tokio::test]
    async fn test_get_bytes_status_mapping() {
        let base = serve_once("200 OK", "raw-image").await;
        let bytes = transport().get_bytes(&format!("{}/abc.webp", base)).await.unwrap();
        assert_eq!(bytes, b"raw-image");

        let base = serve_once("404 Not Found", "").await;
        let err = transport()
            .get_bytes(&format!("{}/missing.webp", base))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(404));
        assert!(!err.is_rate_limited());
    }

    #[test]
    fn test_json_headers() {
        let headers = ReqwestTransport::build_headers();
        assert_eq!(headers.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(headers.get(ACCEPT).unwrap(), "application/json");
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let transport = ReqwestTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 (discard) is not expected to accept HTTP connections locally.
        let err = transport
            .post_json("http://127.0.0.1:9/generate", &serde_json::json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, CraiyonError::Transport(_)));
        assert!(err.is_retryable());
    }
}
