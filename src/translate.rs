use tracing::warn;

use crate::error::TranslateError;
use crate::net::HttpClient;

const GOOGLE_TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";

/// Machine translation collaborator.
pub trait Translator {
    fn translate(&self, text: &str) -> Result<String, TranslateError>;
}

/// Translation that never fails: any error degrades to the original text.
pub fn translate_or_original(translator: &dyn Translator, text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }
    match translator.translate(text) {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => {
            warn!("translation came back empty, keeping original text");
            text.to_string()
        }
        Err(e) => {
            warn!("translation failed: {e}");
            text.to_string()
        }
    }
}

/// Google's public `translate_a/single` endpoint.
pub struct GoogleTranslator {
    client: HttpClient,
    source: String,
    target: String,
}

impl GoogleTranslator {
    pub fn new(client: HttpClient, source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            client,
            source: source.into(),
            target: target.into(),
        }
    }

    fn request_url(&self, text: &str) -> String {
        format!(
            "{}?client=gtx&sl={}&tl={}&dt=t&q={}",
            GOOGLE_TRANSLATE_URL,
            self.source,
            self.target,
            urlencoding::encode(text)
        )
    }
}

impl Translator for GoogleTranslator {
    fn translate(&self, text: &str) -> Result<String, TranslateError> {
        let resp = self
            .client
            .get_json(&self.request_url(text))
            .map_err(TranslateError::Request)?;
        if !resp.is_success() {
            return Err(TranslateError::Status(resp.status));
        }
        parse_translation(&resp.body)
    }
}

/// Response shape: `[[["訳文", "原文", ...], ...], ...]`; segments are concatenated.
fn parse_translation(body: &serde_json::Value) -> Result<String, TranslateError> {
    let segments = body
        .get(0)
        .and_then(|v| v.as_array())
        .ok_or_else(|| TranslateError::Response(truncate(&body.to_string(), 200)))?;

    let translated: String = segments
        .iter()
        .filter_map(|seg| seg.get(0).and_then(|s| s.as_str()))
        .collect();

    if translated.is_empty() {
        return Err(TranslateError::Response("no translated segments".to_string()));
    }
    Ok(translated)
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}
