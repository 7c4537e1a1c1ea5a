//! Scripted in-memory transport for client tests.

use crate::{
    api::transport::Transport,
    error::{CraiyonError, Result},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) enum Reply {
    Json(Value),
    Status(u16),
    Unreachable,
}

impl Reply {
    fn into_result(self) -> Result<Value> {
        match self {
            Reply::Json(value) => Ok(value),
            Reply::Status(429) => Err(CraiyonError::RateLimited {
                body: String::new(),
            }),
            Reply::Status(status) => Err(CraiyonError::Backend {
                status,
                body: String::new(),
            }),
            Reply::Unreachable => Err(CraiyonError::Transport("connection refused".into())),
        }
    }
}

#[derive(Default)]
pub(crate) struct MockTransport {
    posts: Mutex<VecDeque<Reply>>,
    images: Mutex<HashMap<String, VecDeque<(Duration, Option<Vec<u8>>)>>>,
    pub post_calls: Mutex<Vec<(String, Value)>>,
    pub get_calls: Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(self, reply: Reply) -> Self {
        self.posts.lock().unwrap().push_back(reply);
        self
    }

    /// Queues one response for `url`; `None` answers with HTTP 404.
    pub fn image(self, url: &str, delay: Duration, bytes: Option<&[u8]>) -> Self {
        self.images
            .lock()
            .unwrap()
            .entry(url.to_string())
            .or_default()
            .push_back((delay, bytes.map(<[u8]>::to_vec)));
        self
    }

    pub fn post_count(&self) -> usize {
        self.post_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn post_json(&self, url: &str, body: &Value) -> Result<Value> {
        self.post_calls
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        let reply = self.posts.lock().unwrap().pop_front();
        reply.unwrap_or(Reply::Unreachable).into_result()
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        self.get_calls.lock().unwrap().push(url.to_string());
        let scripted = self
            .images
            .lock()
            .unwrap()
            .get_mut(url)
            .and_then(VecDeque::pop_front);

        match scripted {
            Some((delay, bytes)) => {
                tokio::time::sleep(delay).await;
                bytes.ok_or_else(|| CraiyonError::Backend {
                    status: 404,
                    body: String::new(),
                })
            }
            None => Err(CraiyonError::Transport(format!("no image scripted for {}", url))),
        }
    }
}
