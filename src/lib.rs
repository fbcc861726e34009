pub mod advice;
pub mod category;
pub mod colors;
pub mod config;
pub mod currency;
pub mod display;
pub mod error;
pub mod fetch;
pub mod html_extractor;
pub mod image_cache;
pub mod images;
pub mod model;
pub mod net;
pub mod sizes;
pub mod store;
pub mod translate;

use tracing::{info, warn};

use crate::category::CategoryNormalizer;
use crate::colors::ColorResolver;
use crate::html_extractor::{ProductPageExtractor, RawProductFields};
use crate::images::classify_images;

pub use crate::config::{Config, StaticTables};
pub use crate::error::{ExtractionError, ScrapeError};
pub use crate::fetch::{HttpPageFetcher, PageFetcher};
pub use crate::model::{ColorImage, ScrapedProduct, WardrobeItem};
pub use crate::store::{ProductStore, SqliteStore};
pub use crate::translate::{GoogleTranslator, Translator};

// ==================== PIPELINE ====================

/// Fetch, extract and normalize one product page.
///
/// Only an unusable reference, a failed page fetch or a page without a usable
/// title abort; every other problem degrades a single field.
pub fn scrape_product(
    input: &str,
    fetcher: &dyn PageFetcher,
    translator: &dyn Translator,
    tables: &StaticTables,
    config: &Config,
) -> Result<ScrapedProduct, ScrapeError> {
    let url = fetch::product_url(input, &config.base_url)?;
    info!("scraping {}", url);
    let html = fetcher.fetch(&url)?;
    let raw = ProductPageExtractor::new().extract(&html)?;
    Ok(assemble_product(raw, &url, translator, tables, config.exchange_rate))
}

pub fn assemble_product(
    raw: RawProductFields,
    source_url: &str,
    translator: &dyn Translator,
    tables: &StaticTables,
    exchange_rate: f64,
) -> ScrapedProduct {
    let product_code = raw
        .product_code
        .or_else(|| fetch::product_code_from_url(source_url))
        .unwrap_or_else(|| {
            warn!("no product code in title or url: {}", source_url);
            String::new()
        });

    let title_translated = translate::translate_or_original(translator, &raw.title);

    let images = classify_images(&raw.images);
    let resolver = ColorResolver::new(&tables.colors, translator);
    let colors: Vec<ColorImage> = images
        .swatches
        .into_iter()
        .map(|(alt, image_url)| ColorImage {
            color_label: resolver.resolve(&alt),
            image_url,
        })
        .collect();

    let detail_text_translated = raw
        .detail_text
        .as_deref()
        .map(|t| translate::translate_or_original(translator, t));
    let material_text_translated = raw
        .material_text
        .as_deref()
        .map(|t| translate::translate_or_original(translator, t));

    let (category, subcategory) = CategoryNormalizer::new(&tables.taxonomy).resolve(
        raw.category.as_deref(),
        raw.subcategory.as_deref(),
        &raw.title,
    );

    let product = ScrapedProduct {
        title_original: raw.title,
        title_translated,
        product_code,
        source_url: source_url.to_string(),
        colors,
        recommendation_images: images.recommendations,
        detail_text: raw.detail_text,
        detail_text_translated,
        material_text: raw.material_text,
        material_text_translated,
        sizes: raw.sizes,
        price_source_currency: raw.price,
        price_target_currency: currency::convert(raw.price, exchange_rate),
        category,
        subcategory,
    };
    info!(
        "assembled {} colors={} sizes={} recommendations={}",
        product.product_code,
        product.colors.len(),
        product.sizes.len(),
        product.recommendation_images.len()
    );
    product
}

// ==================== PYO3 BINDINGS ====================

#[cfg(feature = "python")]
mod python {
    use std::time::Duration;

    use pyo3::prelude::*;
    use pyo3::types::PyDict;

    use crate::net::HttpClient;
    use crate::{Config, GoogleTranslator, HttpPageFetcher, ScrapedProduct, StaticTables};

    fn scrape_blocking(url: &str, timeout_secs: Option<f64>) -> Result<ScrapedProduct, String> {
        let mut config = Config::from_env().map_err(|e| e.to_string())?;
        if let Some(secs) = timeout_secs.filter(|s| s.is_finite() && *s > 0.0) {
            config.http_timeout = Duration::from_secs_f64(secs);
        }
        let tables = StaticTables::load(&config).map_err(|e| e.to_string())?;
        let client = HttpClient::new(config.http_timeout).map_err(|e| e.to_string())?;
        let fetcher = HttpPageFetcher::new(client.clone());
        let translator = GoogleTranslator::new(client, &config.source_lang, &config.target_lang);
        crate::scrape_product(url, &fetcher, &translator, &tables, &config).map_err(|e| e.to_string())
    }

    #[pyfunction]
    #[pyo3(signature = (url, timeout_secs=None))]
    fn scrape_url(py: Python, url: String, timeout_secs: Option<f64>) -> PyResult<PyObject> {
        let result = py.allow_threads(|| scrape_blocking(&url, timeout_secs));
        match result {
            Ok(product) => {
                let dict = PyDict::new_bound(py);
                dict.set_item("title_original", product.title_original)?;
                dict.set_item("title_translated", product.title_translated)?;
                dict.set_item("product_code", product.product_code)?;
                dict.set_item("source_url", product.source_url)?;

                let colors = product
                    .colors
                    .into_iter()
                    .map(|c| {
                        let color = PyDict::new_bound(py);
                        color.set_item("color_label", c.color_label)?;
                        color.set_item("image_url", c.image_url)?;
                        Ok::<_, PyErr>(color)
                    })
                    .collect::<PyResult<Vec<_>>>()?;
                dict.set_item("colors", colors)?;

                dict.set_item("recommendation_images", product.recommendation_images)?;
                dict.set_item("detail_text", product.detail_text)?;
                dict.set_item("detail_text_translated", product.detail_text_translated)?;
                dict.set_item("material_text", product.material_text)?;
                dict.set_item("material_text_translated", product.material_text_translated)?;
                dict.set_item("sizes", product.sizes)?;
                dict.set_item("price_source_currency", product.price_source_currency)?;
                dict.set_item("price_target_currency", product.price_target_currency)?;
                dict.set_item("category", product.category)?;
                dict.set_item("subcategory", product.subcategory)?;

                Ok(dict.into())
            }
            Err(e) => Err(pyo3::exceptions::PyRuntimeError::new_err(e)),
        }
    }

    #[pymodule]
    fn wardrobe_scraper(m: &Bound<'_, PyModule>) -> PyResult<()> {
        m.add_function(wrap_pyfunction!(scrape_url, m)?)?;
        Ok(())
    }
}
