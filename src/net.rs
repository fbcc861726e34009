use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Runtime;
use tracing::debug;

use crate::error::ConfigError;

pub const DESKTOP_UA: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// Status + body of a completed request.
#[derive(Debug, Clone)]
pub struct HttpResponse<T> {
    pub status: u16,
    pub body: T,
}

impl<T> HttpResponse<T> {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// Blocking facade over a `wreq` client driven by a private current-thread runtime.
#[derive(Clone)]
pub struct HttpClient {
    runtime: Arc<Runtime>,
    client: wreq::Client,
}

impl HttpClient {
    /// Chrome-emulating client with a hard per-request timeout.
    pub fn new(timeout: Duration) -> Result<Self, ConfigError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|e| ConfigError::Runtime(e.to_string()))?;
        let client = wreq::Client::builder()
            .emulation(wreq_util::Profile::Chrome131)
            .timeout(timeout)
            .build()
            .map_err(|e| ConfigError::Runtime(e.to_string()))?;
        Ok(Self {
            runtime: Arc::new(runtime),
            client,
        })
    }

    pub fn get_text(&self, url: &str) -> Result<HttpResponse<String>, String> {
        self.runtime.block_on(async {
            let resp = self
                .client
                .get(url)
                .header("User-Agent", DESKTOP_UA)
                .send()
                .await
                .map_err(|e| e.to_string())?;
            let status = resp.status().as_u16();
            let body = resp.text().await.map_err(|e| e.to_string())?;
            debug!("GET {} status={} bytes={}", url, status, body.len());
            Ok(HttpResponse { status, body })
        })
    }

    pub fn get_bytes(&self, url: &str) -> Result<HttpResponse<Vec<u8>>, String> {
        self.runtime.block_on(async {
            let resp = self
                .client
                .get(url)
                .header("User-Agent", DESKTOP_UA)
                .send()
                .await
                .map_err(|e| e.to_string())?;
            let status = resp.status().as_u16();
            let body = resp.bytes().await.map_err(|e| e.to_string())?.to_vec();
            debug!("GET {} status={} bytes={}", url, status, body.len());
            Ok(HttpResponse { status, body })
        })
    }

    pub fn get_json(&self, url: &str) -> Result<HttpResponse<serde_json::Value>, String> {
        let resp = self.get_text(url)?;
        if !resp.is_success() {
            return Ok(HttpResponse {
                status: resp.status,
                body: serde_json::Value::Null,
            });
        }
        let body = serde_json::from_str(&resp.body).map_err(|e| e.to_string())?;
        Ok(HttpResponse {
            status: resp.status,
            body,
        })
    }

    pub fn post_json(
        &self,
        url: &str,
        payload: &serde_json::Value,
    ) -> Result<HttpResponse<serde_json::Value>, String> {
        self.runtime.block_on(async {
            let resp = self
                .client
                .post(url)
                .json(payload)
                .send()
                .await
                .map_err(|e| e.to_string())?;
            let status = resp.status().as_u16();
            if !resp.status().is_success() {
                return Ok(HttpResponse {
                    status,
                    body: serde_json::Value::Null,
                });
            }
            let body: serde_json::Value = resp.json().await.map_err(|e| e.to_string())?;
            Ok(HttpResponse { status, body })
        })
    }
}
