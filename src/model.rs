use serde::{Deserialize, Serialize};

/// One purchasable color variant and its high-quality swatch image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorImage {
    pub color_label: String,
    pub image_url: String,
}

/// Assembled result of a single product-page scrape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedProduct {
    pub title_original: String,
    pub title_translated: String,
    pub product_code: String,
    pub source_url: String,
    pub colors: Vec<ColorImage>,
    pub recommendation_images: Vec<String>,
    pub detail_text: Option<String>,
    pub detail_text_translated: Option<String>,
    pub material_text: Option<String>,
    pub material_text_translated: Option<String>,
    pub sizes: Vec<String>,
    pub price_source_currency: Option<i64>,
    pub price_target_currency: Option<i64>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
}

impl ScrapedProduct {
    /// `翻訳（原文）`, the form the wardrobe stores as a product title.
    pub fn display_title(&self) -> String {
        if self.title_translated.is_empty() || self.title_translated == self.title_original {
            return self.title_original.clone();
        }
        format!("{}（{}）", self.title_translated, self.title_original)
    }

    pub fn color_labels(&self) -> Vec<&str> {
        self.colors.iter().map(|c| c.color_label.as_str()).collect()
    }

    pub fn color(&self, label: &str) -> Option<&ColorImage> {
        self.colors.iter().find(|c| c.color_label == label)
    }
}

/// A row of the wardrobe (color x size variant) table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeItem {
    pub key: String,
    pub product_code: String,
    pub title: String,
    pub color_label: String,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub size: String,
    pub image_url: String,
    pub price_target_currency: Option<i64>,
    pub material_text: Option<String>,
}

impl WardrobeItem {
    pub fn make_key(title: &str, color_label: &str, size: &str) -> String {
        format!("{}_{}_{}", title, color_label, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn product() -> ScrapedProduct {
        ScrapedProduct {
            title_original: "ニットトップス".to_string(),
            title_translated: "針織上衣".to_string(),
            product_code: "dk988".to_string(),
            source_url: "https://www.grail.bz/disp/item/dk988/".to_string(),
            colors: vec![ColorImage {
                color_label: "黑色的（ブラック）".to_string(),
                image_url: "https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg".to_string(),
            }],
            recommendation_images: vec![],
            detail_text: None,
            detail_text_translated: None,
            material_text: None,
            material_text_translated: None,
            sizes: vec!["M".to_string()],
            price_source_currency: None,
            price_target_currency: None,
            category: None,
            subcategory: None,
        }
    }

    #[test]
    fn display_title_is_bilingual() {
        assert_eq!(product().display_title(), "針織上衣（ニットトップス）");
    }

    #[test]
    fn display_title_without_translation() {
        let mut p = product();
        p.title_translated = p.title_original.clone();
        assert_eq!(p.display_title(), "ニットトップス");
    }

    #[test]
    fn color_lookup_by_label() {
        let p = product();
        assert!(p.color("黑色的（ブラック）").is_some());
        assert!(p.color("ブラック").is_none());
        assert_eq!(p.color_labels(), vec!["黑色的（ブラック）"]);
    }

    #[test]
    fn wardrobe_key_format() {
        assert_eq!(WardrobeItem::make_key("t", "c", "M"), "t_c_M");
    }
}
