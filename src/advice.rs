use std::fmt::Write as _;

use tracing::{info, warn};

use crate::error::AdviceError;
use crate::model::WardrobeItem;
use crate::net::HttpClient;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_MATCH_LIMIT: usize = 4;
const TITLE_MATCH_CHARS: usize = 5;

/// LLM-backed outfit suggestions over the current wardrobe.
pub trait StylingAdvisor {
    fn advise(&self, request: &str, items: &[WardrobeItem]) -> Result<String, AdviceError>;
}

pub fn build_stylist_prompt(request: &str, items: &[WardrobeItem]) -> String {
    let mut inventory = String::from("我的衣櫥清單如下:\n");
    for (idx, item) in items.iter().enumerate() {
        let _ = writeln!(
            inventory,
            "- ID: {}, 名稱: {}, 顏色: {}, 類別: {}",
            idx,
            item.title,
            item.color_label,
            item.category.as_deref().unwrap_or("-")
        );
    }

    format!(
        r#"你是一位專業的個人穿搭造型師。
{inventory}
使用者的需求是："{request}"

請從上述「我的衣櫥清單」中，挑選適合的單品組合成一套穿搭。
請明確指出你要我穿哪一件（講出名稱和顏色），並說明為什麼這樣搭配適合這個場合。
如果衣櫥裡沒有適合的，請直說。
"#
    )
}

/// Items the advice text mentions by title prefix or color label, at most `limit`.
pub fn matching_items<'a>(advice: &str, items: &'a [WardrobeItem], limit: usize) -> Vec<&'a WardrobeItem> {
    items
        .iter()
        .filter(|item| {
            let prefix: String = item.title.chars().take(TITLE_MATCH_CHARS).collect();
            (!prefix.is_empty() && advice.contains(&prefix))
                || (!item.color_label.is_empty() && advice.contains(&item.color_label))
        })
        .take(limit)
        .collect()
}

pub struct GeminiAdvisor {
    client: HttpClient,
    api_key: Option<String>,
    model: String,
}

impl GeminiAdvisor {
    pub fn new(client: HttpClient, api_key: Option<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_key,
            model: model.into(),
        }
    }
}

impl StylingAdvisor for GeminiAdvisor {
    fn advise(&self, request: &str, items: &[WardrobeItem]) -> Result<String, AdviceError> {
        let key = self.api_key.as_deref().ok_or(AdviceError::MissingApiKey)?;
        let url = format!("{}/{}:generateContent?key={}", GEMINI_BASE_URL, self.model, key);

        let payload = serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": build_stylist_prompt(request, items)}]
            }]
        });

        info!("asking {} for advice over {} items", self.model, items.len());
        let resp = self
            .client
            .post_json(&url, &payload)
            .map_err(AdviceError::Request)?;
        if !resp.is_success() {
            warn!("gemini returned status {}", resp.status);
            return Err(AdviceError::Status(resp.status));
        }
        candidate_text(&resp.body).ok_or(AdviceError::EmptyResponse)
    }
}

fn candidate_text(body: &serde_json::Value) -> Option<String> {
    let text = body
        .get("candidates")?
        .get(0)?
        .get("content")?
        .get("parts")?
        .get(0)?
        .get("text")?
        .as_str()?
        .trim();
    if text.is_empty() {
        return None;
    }
    Some(text.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn item(title: &str, color: &str, category: Option<&str>) -> WardrobeItem {
        WardrobeItem {
            key: WardrobeItem::make_key(title, color, "M"),
            product_code: "dk988".to_string(),
            title: title.to_string(),
            color_label: color.to_string(),
            category: category.map(str::to_string),
            subcategory: None,
            size: "M".to_string(),
            image_url: String::new(),
            price_target_currency: None,
            material_text: None,
        }
    }

    #[test]
    fn prompt_lists_every_item_and_the_request() {
        let items = vec![
            item("針織上衣", "黑色的（ブラック）", Some("トップス")),
            item("百褶裙", "米色（ベージュ）", None),
        ];
        let prompt = build_stylist_prompt("明天要去面試", &items);
        assert!(prompt.contains("- ID: 0, 名稱: 針織上衣, 顏色: 黑色的（ブラック）, 類別: トップス"));
        assert!(prompt.contains("- ID: 1, 名稱: 百褶裙, 顏色: 米色（ベージュ）, 類別: -"));
        assert!(prompt.contains("使用者的需求是：\"明天要去面試\""));
    }

    #[test]
    fn matches_by_title_prefix_or_color() {
        let items = vec![
            item("針織高領上衣（ニット）", "白色（ホワイト）", None),
            item("百褶裙", "米色（ベージュ）", None),
            item("皮外套", "棕色的（ブラウン）", None),
        ];
        let advice = "推薦穿針織高領上衣，搭配米色（ベージュ）的裙子。";
        let hits: Vec<&str> = matching_items(advice, &items, DEFAULT_MATCH_LIMIT)
            .iter()
            .map(|i| i.title.as_str())
            .collect();
        assert_eq!(hits, vec!["針織高領上衣（ニット）", "百褶裙"]);
    }

    #[test]
    fn match_count_is_capped() {
        let items: Vec<WardrobeItem> = (0..6).map(|i| item(&format!("上衣{i}"), "黑色", None)).collect();
        assert_eq!(matching_items("全部黑色", &items, 4).len(), 4);
    }

    #[test]
    fn reads_first_candidate_text() {
        let body = json!({"candidates": [{"content": {"parts": [{"text": "  穿這件  "}]}}]});
        assert_eq!(candidate_text(&body).as_deref(), Some("穿這件"));
        assert_eq!(candidate_text(&json!({"candidates": []})), None);
        assert_eq!(
            candidate_text(&json!({"candidates": [{"content": {"parts": [{"text": ""}]}}]})),
            None
        );
    }

    #[test]
    fn missing_key_fails_before_any_request() {
        let client = HttpClient::new(std::time::Duration::from_secs(1)).unwrap();
        let advisor = GeminiAdvisor::new(client, None, "gemini-1.5-flash");
        assert!(matches!(advisor.advise("x", &[]), Err(AdviceError::MissingApiKey)));
    }
}
