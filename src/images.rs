use std::collections::{BTreeMap, HashSet};

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

pub const CDN_BASE: &str = "https://cdn.grail.bz/images/goods";
pub const LEGACY_IMAGE_BASE: &str = "https://img.grail.bz/item";

const LOW_QUALITY_SEGMENT: &str = "/images/goods/t/";
const HIGH_QUALITY_SEGMENT: &str = "/images/goods/d/";

/// Swatch URLs look like `.../dk988_col_11.jpg`.
pub const COLOR_MARKER: &str = "col";

/// Model photos observed on the site run v1..=v11.
pub const MODEL_PHOTO_MIN: u32 = 1;
pub const MODEL_PHOTO_MAX: u32 = 11;

lazy_static! {
    static ref PIXEL_SUFFIX_RE: Regex = Regex::new(r"(?:_\d+x\d+)+(\.\w+)$").unwrap();
    static ref COLOR_CODE_RE: Regex = Regex::new(r"col_(\d+)").unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ImageQuality {
    #[default]
    High,
    Low,
}

impl ImageQuality {
    pub fn path_segment(self) -> &'static str {
        match self {
            ImageQuality::High => "d",
            ImageQuality::Low => "t",
        }
    }
}

/// Rewrites a thumbnail URL to its full-resolution form. Idempotent.
pub fn upgrade_image_url(url: &str) -> String {
    if url.is_empty() {
        return String::new();
    }
    let upgraded = url.replace(LOW_QUALITY_SEGMENT, HIGH_QUALITY_SEGMENT);
    let upgraded = PIXEL_SUFFIX_RE.replace(&upgraded, "$1").into_owned();
    if upgraded != url {
        debug!("image upgraded: {} -> {}", url, upgraded);
    }
    upgraded
}

pub fn is_color_swatch(upgraded_url: &str, alt: &str) -> bool {
    upgraded_url.contains(COLOR_MARKER) && !alt.trim().is_empty()
}

/// `<img>` as it appears on the page, before any rewriting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawImage {
    pub src: String,
    pub alt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ClassifiedImages {
    /// (alt text, upgraded url), page order, unique by url.
    pub swatches: Vec<(String, String)>,
    pub recommendations: Vec<String>,
}

/// Splits page images into color swatches and recommendation images.
pub fn classify_images(images: &[RawImage]) -> ClassifiedImages {
    let mut swatches = Vec::new();
    let mut recommendations = Vec::new();
    let mut swatch_urls = HashSet::new();

    for img in images {
        let src = img.src.trim();
        if src.is_empty() {
            continue;
        }
        let url = upgrade_image_url(src);
        let alt = img.alt.trim();
        if is_color_swatch(&url, alt) {
            if swatch_urls.insert(url.clone()) {
                swatches.push((alt.to_string(), url));
            }
        } else {
            recommendations.push(url);
        }
    }

    recommendations.retain(|u| !swatch_urls.contains(u));
    ClassifiedImages {
        swatches,
        recommendations,
    }
}

pub fn color_code_from_url(url: &str) -> Option<String> {
    COLOR_CODE_RE
        .captures(url)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

/// Old `img.grail.bz` layout, still served for delisted items.
pub fn legacy_color_image_url(product_code: &str, color_code: &str, quality: ImageQuality) -> String {
    match quality {
        ImageQuality::High => format!("{}/{}/col_{}.jpg", LEGACY_IMAGE_BASE, product_code, color_code),
        ImageQuality::Low => format!(
            "{}/{}/col_{}_300x300.jpg",
            LEGACY_IMAGE_BASE, product_code, color_code
        ),
    }
}

pub fn color_swatch_url(product_code: &str, color_code: &str, quality: ImageQuality) -> String {
    format!(
        "{}/{}/{}/{}_col_{}.jpg",
        CDN_BASE,
        quality.path_segment(),
        product_code,
        product_code,
        color_code
    )
}

pub fn model_photo_url(product_code: &str, n: u32, quality: ImageQuality) -> String {
    format!(
        "{}/{}/{}/{}_v{}.jpg",
        CDN_BASE,
        quality.path_segment(),
        product_code,
        product_code,
        n
    )
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModelPhoto {
    pub v_number: u32,
    pub url: String,
}

/// Every candidate model photo; callers check which ones exist.
pub fn all_model_photo_urls(product_code: &str, quality: ImageQuality) -> Vec<ModelPhoto> {
    model_photo_urls(product_code, MODEL_PHOTO_MIN..=MODEL_PHOTO_MAX, quality)
}

pub fn model_photo_urls<I>(product_code: &str, numbers: I, quality: ImageQuality) -> Vec<ModelPhoto>
where
    I: IntoIterator<Item = u32>,
{
    numbers
        .into_iter()
        .map(|v_number| ModelPhoto {
            v_number,
            url: model_photo_url(product_code, v_number, quality),
        })
        .collect()
}

/// Bilingual color label -> site color code(s). The first code is the default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ColorCodeTable {
    codes: BTreeMap<String, Vec<String>>,
}

impl ColorCodeTable {
    pub fn builtin() -> Self {
        let codes = BUILTIN_COLOR_CODES
            .iter()
            .map(|(label, codes)| {
                (
                    label.to_string(),
                    codes.iter().map(|c| c.to_string()).collect(),
                )
            })
            .collect();
        Self { codes }
    }

    pub fn from_entries<I, L, C>(entries: I) -> Self
    where
        I: IntoIterator<Item = (L, Vec<C>)>,
        L: Into<String>,
        C: Into<String>,
    {
        let codes = entries
            .into_iter()
            .map(|(label, codes)| (label.into(), codes.into_iter().map(Into::into).collect()))
            .collect();
        Self { codes }
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.codes.keys().map(String::as_str)
    }

    /// Out-of-range `index` falls back to the first code.
    pub fn code(&self, label: &str, index: usize) -> Option<&str> {
        let codes = self.codes.get(label)?;
        codes
            .get(index)
            .or_else(|| codes.first())
            .map(String::as_str)
    }

    pub fn codes(&self, label: &str) -> &[String] {
        self.codes.get(label).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn color_image_url(
        &self,
        product_code: &str,
        label: &str,
        quality: ImageQuality,
        index: usize,
    ) -> Option<String> {
        self.code(label, index)
            .map(|code| color_swatch_url(product_code, code, quality))
    }

    pub fn all_color_image_urls(
        &self,
        product_code: &str,
        label: &str,
        quality: ImageQuality,
    ) -> Vec<String> {
        self.codes(label)
            .iter()
            .map(|code| color_swatch_url(product_code, code, quality))
            .collect()
    }
}

const BUILTIN_COLOR_CODES: &[(&str, &[&str])] = &[
    ("沒有任何（なし）", &["0"]),
    ("黑色的（ブラック）", &["11"]),
    ("紅色的（レッド）", &["13"]),
    ("藍色的（ブルー）", &["15"]),
    ("粉色的（ピンク）", &["17"]),
    ("棕色的（ブラウン）", &["19"]),
    ("海軍（ネイビー）", &["21"]),
    ("灰色的（グレー）", &["26"]),
    ("象牙（アイボリー）", &["28"]),
    ("薰衣草（ラベンダー）", &["39"]),
    ("淺褐色的（ベージュ）", &["40"]),
    ("珍珠從白色（パールオフホワイト）", &["50"]),
    ("卡其色（カーキ）", &["52"]),
    ("木炭（チャコール）", &["56"]),
    ("米白色（オフホワイト）", &["59"]),
    ("米色（オフベージュ）", &["91"]),
    ("白色X黑色（オフホワイト×ブラック）", &["138"]),
    ("黑色X象牙（ブラック×アイボリー）", &["157"]),
    ("粉紅色X偏離白色（ピンク×オフホワイト）", &["279"]),
    ("薰衣草灰色（ラベンダーグレー）", &["338"]),
    ("摩卡（モカ）", &["561"]),
    ("淺灰色（ライトグレー）", &["564"]),
    ("格雷格（グレージュ）", &["588"]),
    ("12件套件（12点セット）", &["983"]),
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn upgrades_cdn_thumbnail_path() {
        assert_eq!(
            upgrade_image_url("https://cdn.grail.bz/images/goods/t/dk988/dk988_v1.jpg"),
            "https://cdn.grail.bz/images/goods/d/dk988/dk988_v1.jpg"
        );
    }

    #[test]
    fn strips_legacy_pixel_suffix() {
        assert_eq!(
            upgrade_image_url("https://img.grail.bz/item/GRL-S3225/col_01_150x150.jpg"),
            "https://img.grail.bz/item/GRL-S3225/col_01.jpg"
        );
        assert_eq!(
            upgrade_image_url("https://img.grail.bz/item/GRL-S3225/col_01_300x300.png"),
            "https://img.grail.bz/item/GRL-S3225/col_01.png"
        );
    }

    #[test]
    fn upgrade_is_idempotent() {
        let urls = [
            "https://cdn.grail.bz/images/goods/t/dk988/dk988_v1.jpg",
            "https://img.grail.bz/item/GRL-S3225/col_01_150x150.jpg",
            "https://cdn.grail.bz/images/goods/t/ab1/ab1_col_11_80x80.jpg",
            "https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg",
            "https://img.grail.bz/item/GRL-S3225/col_01_300x300_150x150.jpg",
            "",
        ];
        for url in urls {
            let once = upgrade_image_url(url);
            assert_eq!(upgrade_image_url(&once), once, "not idempotent for {url}");
        }
    }

    #[test]
    fn stacked_pixel_suffixes_are_stripped_together() {
        assert_eq!(
            upgrade_image_url("https://img.grail.bz/item/GRL-S3225/col_01_300x300_150x150.jpg"),
            "https://img.grail.bz/item/GRL-S3225/col_01.jpg"
        );
    }

    #[test]
    fn pixel_suffix_only_stripped_before_extension() {
        let url = "https://img.grail.bz/item/a_10x10/col_01.jpg";
        assert_eq!(upgrade_image_url(url), url);
    }

    #[test]
    fn swatch_needs_marker_and_alt() {
        assert!(is_color_swatch("https://x/a_col_11.jpg", "ブラック"));
        assert!(!is_color_swatch("https://x/a_col_11.jpg", "   "));
        assert!(!is_color_swatch("https://x/a_v1.jpg", "ブラック"));
    }

    #[test]
    fn classification_partitions_and_dedups() {
        let img = |src: &str, alt: &str| RawImage {
            src: src.to_string(),
            alt: alt.to_string(),
        };
        let images = vec![
            img("https://cdn.grail.bz/images/goods/t/dk988/dk988_col_11.jpg", "ブラック"),
            img("https://cdn.grail.bz/images/goods/t/dk988/dk988_v1.jpg", ""),
            img("https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg", "ブラック"),
            // same swatch url without alt: recommendation candidate, removed
            img("https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg", ""),
            img("https://cdn.grail.bz/images/goods/t/dk988/dk988_v1.jpg", ""),
            img("  ", "ignored"),
        ];
        let classified = classify_images(&images);
        assert_eq!(
            classified.swatches,
            vec![(
                "ブラック".to_string(),
                "https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg".to_string()
            )]
        );
        // recommendations are not deduplicated against themselves
        assert_eq!(
            classified.recommendations,
            vec![
                "https://cdn.grail.bz/images/goods/d/dk988/dk988_v1.jpg".to_string(),
                "https://cdn.grail.bz/images/goods/d/dk988/dk988_v1.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn extracts_color_code() {
        assert_eq!(
            color_code_from_url("https://img.grail.bz/item/GRL-S3225/col_01.jpg"),
            Some("01".to_string())
        );
        assert_eq!(color_code_from_url("https://x/dk988_v1.jpg"), None);
    }

    #[test]
    fn builds_cdn_urls_bit_exact() {
        assert_eq!(
            color_swatch_url("dk988", "11", ImageQuality::High),
            "https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg"
        );
        assert_eq!(
            model_photo_url("dk909", 6, ImageQuality::Low),
            "https://cdn.grail.bz/images/goods/t/dk909/dk909_v6.jpg"
        );
        assert_eq!(
            legacy_color_image_url("GRL-S3225", "01", ImageQuality::High),
            "https://img.grail.bz/item/GRL-S3225/col_01.jpg"
        );
        assert_eq!(
            legacy_color_image_url("GRL-S3225", "01", ImageQuality::Low),
            "https://img.grail.bz/item/GRL-S3225/col_01_300x300.jpg"
        );
    }

    #[test]
    fn model_photos_cover_v1_to_v11() {
        let photos = all_model_photo_urls("dk909", ImageQuality::High);
        assert_eq!(photos.len(), 11);
        assert_eq!(photos[0].v_number, 1);
        assert_eq!(
            photos[5].url,
            "https://cdn.grail.bz/images/goods/d/dk909/dk909_v6.jpg"
        );
        let picked = model_photo_urls("dk909", [1, 10], ImageQuality::High);
        assert_eq!(picked[1].url, "https://cdn.grail.bz/images/goods/d/dk909/dk909_v10.jpg");
    }

    #[test]
    fn color_code_lookup_with_index_fallback() {
        let table = ColorCodeTable::from_entries([
            ("黑色的（ブラック）", vec!["11"]),
            ("粉色的（ピンク）", vec!["17", "71"]),
        ]);
        assert_eq!(table.code("粉色的（ピンク）", 1), Some("71"));
        assert_eq!(table.code("粉色的（ピンク）", 5), Some("17"));
        assert_eq!(table.code("不明", 0), None);
        assert!(table.codes("不明").is_empty());
        assert_eq!(
            table.all_color_image_urls("dk1", "粉色的（ピンク）", ImageQuality::High),
            vec![
                "https://cdn.grail.bz/images/goods/d/dk1/dk1_col_17.jpg".to_string(),
                "https://cdn.grail.bz/images/goods/d/dk1/dk1_col_71.jpg".to_string(),
            ]
        );
    }

    #[test]
    fn builtin_table_has_black() {
        let table = ColorCodeTable::builtin();
        assert_eq!(
            table.color_image_url("dk988", "黑色的（ブラック）", ImageQuality::High, 0),
            Some("https://cdn.grail.bz/images/goods/d/dk988/dk988_col_11.jpg".to_string())
        );
    }
}
