use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::ConfigError;

/// Promotional tag the site prepends to subcategory labels during sales.
pub const SALE_MARKER: &str = "[セール}";

pub const BOTTOMS: &str = "ボトムス";
pub const GENERIC_SKIRT: &str = "スカート";

/// Breadcrumb categories the site files under the wrong parent:
/// (scraped category, corrected category, corrected subcategory).
pub const KNOWN_MISCLASSIFICATIONS: &[(&str, &str, &str)] = &[("浴衣", "ワンピース", "浴衣")];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    pub subcategory: String,
    pub keywords: Vec<String>,
}

impl KeywordRule {
    pub fn matches(&self, title: &str) -> bool {
        self.keywords.iter().any(|k| title.contains(k.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryDef {
    pub name: String,
    pub subcategories: Vec<String>,
    #[serde(default)]
    pub rules: Vec<KeywordRule>,
    /// Catch-all stored when neither the breadcrumb nor the title says anything useful.
    #[serde(default)]
    pub fallback: Option<String>,
}

impl CategoryDef {
    pub fn contains(&self, subcategory: &str) -> bool {
        self.subcategories.iter().any(|s| s == subcategory)
    }
}

/// Canonical categories, their valid subcategories and title keyword rules.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryTaxonomy {
    pub categories: Vec<CategoryDef>,
}

impl CategoryTaxonomy {
    pub fn get(&self, category: &str) -> Option<&CategoryDef> {
        self.categories.iter().find(|c| c.name == category)
    }

    pub fn is_valid(&self, category: &str, subcategory: &str) -> bool {
        self.get(category).is_some_and(|c| c.contains(subcategory))
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let taxonomy: Self = serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        info!(
            "loaded taxonomy with {} categories from {}",
            taxonomy.categories.len(),
            path.display()
        );
        Ok(taxonomy)
    }

    /// The site's own taxonomy, plus the skirt subtypes split out of `スカート`.
    pub fn builtin() -> Self {
        let categories = BUILTIN_TAXONOMY
            .iter()
            .map(|(name, subcategories, rules)| CategoryDef {
                name: name.to_string(),
                subcategories: subcategories.iter().map(|s| s.to_string()).collect(),
                rules: rules
                    .iter()
                    .map(|(sub, keywords)| KeywordRule {
                        subcategory: sub.to_string(),
                        keywords: keywords.iter().map(|k| k.to_string()).collect(),
                    })
                    .collect(),
                fallback: Some(format!("{}_その他", name)),
            })
            .collect();
        Self { categories }
    }
}

/// Outcome of subcategory normalization.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Subcategory {
    /// A member of the category's canonical set.
    Canonical(String),
    /// Category unknown to the taxonomy; the category label is echoed back.
    UnknownCategory(String),
    /// Nothing matched. Carries the category's candidate set; not a usable value.
    Uncategorized(Vec<String>),
}

pub struct CategoryNormalizer<'a> {
    taxonomy: &'a CategoryTaxonomy,
}

impl<'a> CategoryNormalizer<'a> {
    pub fn new(taxonomy: &'a CategoryTaxonomy) -> Self {
        Self { taxonomy }
    }

    pub fn normalize(&self, category: &str, subcategory: &str, title: &str) -> Subcategory {
        let subcategory = subcategory.replace(SALE_MARKER, "");
        let subcategory = subcategory.trim();

        let Some(def) = self.taxonomy.get(category) else {
            return Subcategory::UnknownCategory(category.to_string());
        };

        // A generic skirt may really be a mermaid/flare/mini skirt; let the title decide.
        let skirt_exception = category == BOTTOMS && subcategory == GENERIC_SKIRT;
        if !skirt_exception && def.contains(subcategory) {
            return Subcategory::Canonical(subcategory.to_string());
        }

        if let Some(rule) = def.rules.iter().find(|r| r.matches(title)) {
            info!("subcategory from title keywords: {} -> {}", category, rule.subcategory);
            return Subcategory::Canonical(rule.subcategory.clone());
        }

        Subcategory::Uncategorized(def.subcategories.clone())
    }

    /// Breadcrumb (category, subcategory) -> stored pair.
    pub fn resolve(
        &self,
        category: Option<&str>,
        subcategory: Option<&str>,
        title: &str,
    ) -> (Option<String>, Option<String>) {
        let Some(category) = category else {
            return (None, None);
        };

        if let Some((_, fixed_cat, fixed_sub)) = KNOWN_MISCLASSIFICATIONS
            .iter()
            .find(|(scraped, _, _)| *scraped == category)
        {
            info!("category override: {} -> {} / {}", category, fixed_cat, fixed_sub);
            return (Some(fixed_cat.to_string()), Some(fixed_sub.to_string()));
        }

        let Some(subcategory) = subcategory else {
            return (Some(category.to_string()), None);
        };

        let resolved = match self.normalize(category, subcategory, title) {
            Subcategory::Canonical(sub) => Some(sub),
            Subcategory::UnknownCategory(echo) => {
                warn!("category '{}' not in taxonomy, keeping as-is", category);
                Some(echo)
            }
            Subcategory::Uncategorized(_) => {
                let fallback = self.taxonomy.get(category).and_then(|d| d.fallback.clone());
                warn!(
                    "no subcategory for '{}' / '{}' (title: {}), using {:?}",
                    category, subcategory, title, fallback
                );
                fallback
            }
        };
        info!("category: {} -> {:?}", category, resolved);
        (Some(category.to_string()), resolved)
    }
}

type Rules = &'static [(&'static str, &'static [&'static str])];

const BUILTIN_TAXONOMY: &[(&str, &[&str], Rules)] = &[
    (
        "トップス",
        &[
            "ニット",
            "シャツ・ブラウス",
            "カットソー",
            "スウェット",
            "プリントTシャツ",
            "Tシャツ[無地]",
            "パーカー",
            "タンクトップ・キャミソール",
            "ベスト",
            "トップスセット",
            "ベアトップ・チューブトップ",
            "トップス_その他",
        ],
        &[
            ("ニット", &["ニット"]),
            ("シャツ・ブラウス", &["シャツ", "ブラウス"]),
            ("カットソー", &["カットソー"]),
            ("スウェット", &["スウェット"]),
            ("プリントTシャツ", &["プリントTシャツ", "プリント"]),
            ("Tシャツ[無地]", &["無地Tシャツ", "無地 Tシャツ"]),
            ("パーカー", &["パーカー"]),
            ("タンクトップ・キャミソール", &["タンクトップ", "キャミソール"]),
            ("ベスト", &["ベスト"]),
            ("トップスセット", &["セット"]),
            ("ベアトップ・チューブトップ", &["ベアトップ", "チューブトップ"]),
        ],
    ),
    (
        "アウター",
        &["ジャケット", "カーディガン", "コート", "アウターセット", "アウター_その他"],
        &[
            ("ジャケット", &["ジャケット"]),
            ("カーディガン", &["カーディガン"]),
            ("コート", &["コート"]),
            ("アウターセット", &["セット"]),
        ],
    ),
    (
        "ワンピース",
        &[
            "柄",
            "無地",
            "ニットワンピース",
            "ロングワンピース",
            "シャツワンピース",
            "キャミワンピース",
            "オールインワン・サロペット",
            "ジャンパースカート",
            "浴衣",
            "ワンピース_その他",
        ],
        &[
            ("柄", &["柄"]),
            ("無地", &["無地"]),
            ("ニットワンピース", &["ニットワンピース", "ニット ドレス"]),
            ("ロングワンピース", &["ロングワンピース", "ロングドレス"]),
            ("シャツワンピース", &["シャツワンピース", "シャツ ドレス"]),
            ("キャミワンピース", &["キャミワンピース", "キャミソール ドレス"]),
            ("オールインワン・サロペット", &["オールインワン", "サロペット"]),
            ("ジャンパースカート", &["ジャンパースカート"]),
            ("浴衣", &["浴衣"]),
        ],
    ),
    (
        "ボトムス",
        &[
            "パンツ・デニム",
            "ショートパンツ",
            "マーメイドスカート",
            "フレアスカート",
            "ミニスカート",
            "スカート",
            "ボトムスセット",
            "ボトムス_その他",
        ],
        &[
            ("マーメイドスカート", &["マーメイドスカート"]),
            ("フレアスカート", &["フレアスカート"]),
            ("ミニスカート", &["ミニスカート"]),
            ("パンツ・デニム", &["パンツ", "デニム"]),
            ("ショートパンツ", &["ショートパンツ"]),
            ("スカート", &["スカート"]),
            ("ボトムスセット", &["セット"]),
        ],
    ),
    (
        "シューズ",
        &[
            "パンプス",
            "サンダル",
            "ショートブーツ・ブーティ",
            "ロングブーツ",
            "スニーカー",
            "ローファー",
            "シューズ_その他",
        ],
        &[
            ("パンプス", &["パンプス"]),
            ("サンダル", &["サンダル"]),
            ("ショートブーツ・ブーティ", &["ショートブーツ", "ブーティ"]),
            ("ロングブーツ", &["ロングブーツ"]),
            ("スニーカー", &["スニーカー"]),
            ("ローファー", &["ローファー"]),
        ],
    ),
    (
        "バッグ・カバン",
        &[
            "ショルダーバッグ",
            "ハンドバッグ",
            "リュック",
            "トートバッグ",
            "クラッチバッグ",
            "かごバッグ",
            "ポシェット",
            "バッグ・カバン_その他",
        ],
        &[
            ("ショルダーバッグ", &["ショルダーバッグ"]),
            ("ハンドバッグ", &["ハンドバッグ"]),
            ("リュック", &["リュック"]),
            ("トートバッグ", &["トートバッグ"]),
            ("クラッチバッグ", &["クラッチバッグ"]),
            ("かごバッグ", &["かごバッグ"]),
            ("ポシェット", &["ポシェット"]),
        ],
    ),
    (
        "アクセサリー",
        &[
            "ピアス・リング",
            "ネックレス",
            "ベルト",
            "ブレス",
            "帽子",
            "ヘッドアクセ",
            "スカーフ",
            "ストール・マフラー",
            "レッグウェア",
            "インナー",
            "メガネ・サングラス",
            "時計",
            "アクセサリー_その他",
        ],
        &[
            ("ピアス・リング", &["ピアス", "リング"]),
            ("ネックレス", &["ネックレス"]),
            ("ベルト", &["ベルト"]),
            ("ブレス", &["ブレスレット"]),
            ("帽子", &["帽子"]),
            ("ヘッドアクセ", &["ヘッドアクセ"]),
            ("スカーフ", &["スカーフ"]),
            ("ストール・マフラー", &["ストール", "マフラー"]),
            ("レッグウェア", &["レッグウェア", "靴下"]),
            ("インナー", &["インナー"]),
            ("メガネ・サングラス", &["メガネ", "サングラス"]),
            ("時計", &["時計"]),
        ],
    ),
    (
        "セットアイテム",
        &["セットアップ", "その他セット", "セットアイテム_その他"],
        &[
            ("セットアップ", &["セットアップ"]),
            ("その他セット", &["その他セット"]),
            ("セットアイテム_その他", &["ルームウェア", "パジャマ"]),
        ],
    ),
];
