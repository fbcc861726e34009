use std::path::PathBuf;
use std::time::Duration;

use tracing::{info, warn};

use crate::category::CategoryTaxonomy;
use crate::colors::ColorLookupTable;
use crate::currency::JPY_TO_TWD_RATE;
use crate::error::ConfigError;
use crate::fetch::DEFAULT_BASE_URL;
use crate::images::ColorCodeTable;

const DEFAULT_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DB_PATH: &str = "database/wardrobe.db";
const DEFAULT_COLOR_MAPPING: &str = "color_mapping.json";
const DEFAULT_IMAGE_CACHE_DIR: &str = "images/cache";
const DEFAULT_IMAGE_BACKUP_DIR: &str = "images/backup";
const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-flash";

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

#[derive(Debug, Clone)]
pub struct Config {
    pub base_url: String,
    pub exchange_rate: f64,
    pub http_timeout: Duration,
    pub db_path: PathBuf,
    pub color_mapping_path: PathBuf,
    pub taxonomy_path: Option<PathBuf>,
    pub image_cache_dir: PathBuf,
    pub image_backup_dir: PathBuf,
    pub source_lang: String,
    pub target_lang: String,
    pub genai_api_key: Option<String>,
    pub gemini_model: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            exchange_rate: JPY_TO_TWD_RATE,
            http_timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            db_path: PathBuf::from(DEFAULT_DB_PATH),
            color_mapping_path: PathBuf::from(DEFAULT_COLOR_MAPPING),
            taxonomy_path: None,
            image_cache_dir: PathBuf::from(DEFAULT_IMAGE_CACHE_DIR),
            image_backup_dir: PathBuf::from(DEFAULT_IMAGE_BACKUP_DIR),
            source_lang: "ja".to_string(),
            target_lang: "zh-TW".to_string(),
            genai_api_key: None,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(env_var)
    }

    /// Same as `from_env`, with the variable source injected.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(v) = lookup("WARDROBE_BASE_URL") {
            cfg.base_url = v;
        }
        if let Some(v) = lookup("WARDROBE_EXCHANGE_RATE") {
            cfg.exchange_rate = v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|r| r.is_finite() && *r > 0.0)
                .ok_or(ConfigError::InvalidValue {
                    name: "WARDROBE_EXCHANGE_RATE",
                    value: v,
                })?;
        }
        if let Some(v) = lookup("WARDROBE_HTTP_TIMEOUT_SECS") {
            let secs = v
                .trim()
                .parse::<u64>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or(ConfigError::InvalidValue {
                    name: "WARDROBE_HTTP_TIMEOUT_SECS",
                    value: v,
                })?;
            cfg.http_timeout = Duration::from_secs(secs);
        }
        if let Some(v) = lookup("WARDROBE_DB_PATH") {
            cfg.db_path = PathBuf::from(v);
        }
        if let Some(v) = lookup("WARDROBE_COLOR_MAPPING") {
            cfg.color_mapping_path = PathBuf::from(v);
        }
        cfg.taxonomy_path = lookup("WARDROBE_TAXONOMY").map(PathBuf::from);
        if let Some(v) = lookup("WARDROBE_IMAGE_CACHE_DIR") {
            cfg.image_cache_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("WARDROBE_IMAGE_BACKUP_DIR") {
            cfg.image_backup_dir = PathBuf::from(v);
        }
        if let Some(v) = lookup("WARDROBE_SOURCE_LANG") {
            cfg.source_lang = v;
        }
        if let Some(v) = lookup("WARDROBE_TARGET_LANG") {
            cfg.target_lang = v;
        }
        cfg.genai_api_key = lookup("GENAI_API_KEY");
        if let Some(v) = lookup("WARDROBE_GEMINI_MODEL") {
            cfg.gemini_model = v;
        }

        Ok(cfg)
    }
}

/// Read-only lookup tables, loaded once per process.
#[derive(Debug, Clone)]
pub struct StaticTables {
    pub colors: ColorLookupTable,
    pub color_codes: ColorCodeTable,
    pub taxonomy: CategoryTaxonomy,
}

impl StaticTables {
    pub fn builtin() -> Self {
        let color_codes = ColorCodeTable::builtin();
        Self {
            colors: ColorLookupTable::from_bilingual_labels(color_codes.labels()),
            color_codes,
            taxonomy: CategoryTaxonomy::builtin(),
        }
    }

    pub fn load(config: &Config) -> Result<Self, ConfigError> {
        let mut tables = Self::builtin();

        if config.color_mapping_path.exists() {
            tables.colors = ColorLookupTable::from_json_file(&config.color_mapping_path)?;
        } else {
            info!(
                "{} not found, using built-in color table ({} colors)",
                config.color_mapping_path.display(),
                tables.colors.len()
            );
        }

        if let Some(path) = &config.taxonomy_path {
            tables.taxonomy = CategoryTaxonomy::from_json_file(path)?;
        }
        if tables.taxonomy.categories.is_empty() {
            warn!("category taxonomy is empty, every category will be kept as scraped");
        }

        Ok(tables)
    }
}
