use tracing::{info, warn};
use url::Url;

use crate::error::ScrapeError;
use crate::net::HttpClient;

pub const DEFAULT_BASE_URL: &str = "https://www.grail.bz/disp/item/";

/// Source of raw product-page HTML.
pub trait PageFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError>;
}

/// Accepts an absolute URL or a bare product code such as `DK988`.
pub fn product_url(input: &str, base_url: &str) -> Result<String, ScrapeError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(ScrapeError::InvalidInput("empty product reference".to_string()));
    }
    if input.contains("https") {
        return Url::parse(input)
            .map(|u| u.to_string())
            .map_err(|e| ScrapeError::InvalidInput(format!("{input}: {e}")));
    }
    if input.contains('/') || input.chars().any(char::is_whitespace) {
        return Err(ScrapeError::InvalidInput(input.to_string()));
    }
    let base = base_url.trim_end_matches('/');
    Ok(format!("{}/{}/", base, input.to_lowercase()))
}

/// `/item/dk9881112/` -> `dk9881112`.
pub fn product_code_from_url(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let segments: Vec<&str> = parsed
        .path_segments()?
        .filter(|s| !s.is_empty())
        .collect();
    let idx = segments.iter().position(|s| *s == "item")?;
    segments.get(idx + 1).map(|s| s.to_lowercase())
}

pub struct HttpPageFetcher {
    client: HttpClient,
}

impl HttpPageFetcher {
    pub fn new(client: HttpClient) -> Self {
        Self { client }
    }
}

impl PageFetcher for HttpPageFetcher {
    fn fetch(&self, url: &str) -> Result<String, ScrapeError> {
        let resp = self.client.get_text(url).map_err(|message| ScrapeError::Network {
            url: url.to_string(),
            message,
        })?;
        if resp.status != 200 {
            warn!("page fetch failed status={} url={}", resp.status, url);
            return Err(ScrapeError::Fetch {
                url: url.to_string(),
                status: resp.status,
            });
        }
        info!("fetched {} bytes url={}", resp.body.len(), url);
        Ok(resp.body)
    }
}
