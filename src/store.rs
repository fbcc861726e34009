use std::path::Path;

use rusqlite::{Connection, OptionalExtension, Row};
use tracing::info;

use crate::error::StoreError;
use crate::model::{ScrapedProduct, WardrobeItem};

/// Persistence for scraped products and the wardrobe variants built from them.
pub trait ProductStore {
    fn save_product(&self, product: &ScrapedProduct) -> Result<(), StoreError>;
    fn add_to_wardrobe(
        &self,
        product: &ScrapedProduct,
        color_label: &str,
        size: &str,
    ) -> Result<WardrobeItem, StoreError>;
    fn get_product(&self, product_code: &str) -> Result<Option<ScrapedProduct>, StoreError>;
    fn list_wardrobe(&self) -> Result<Vec<WardrobeItem>, StoreError>;
    /// `false` when no row had that key.
    fn remove_from_wardrobe(&self, key: &str) -> Result<bool, StoreError>;
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        info!("opened wardrobe database {}", path.display());
        Ok(store)
    }

    pub fn open_in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS products (
                product_code             TEXT PRIMARY KEY,
                title_original           TEXT NOT NULL,
                title_translated         TEXT NOT NULL,
                source_url               TEXT NOT NULL,
                colors                   TEXT NOT NULL,
                recommendation_images    TEXT NOT NULL,
                detail_text              TEXT,
                detail_text_translated   TEXT,
                material_text            TEXT,
                material_text_translated TEXT,
                sizes                    TEXT NOT NULL,
                price_jpy                INTEGER,
                price_twd                INTEGER,
                category                 TEXT,
                subcategory              TEXT,
                updated_at               TEXT NOT NULL DEFAULT (datetime('now'))
            );

            CREATE TABLE IF NOT EXISTS wardrobe (
                key          TEXT PRIMARY KEY,
                product_code TEXT NOT NULL REFERENCES products(product_code),
                title        TEXT NOT NULL,
                color_name   TEXT NOT NULL,
                category     TEXT,
                subcategory  TEXT,
                size         TEXT NOT NULL,
                image_url    TEXT NOT NULL,
                price_twd    INTEGER,
                material     TEXT,
                added_at     TEXT NOT NULL DEFAULT (datetime('now'))
            );
            CREATE INDEX IF NOT EXISTS idx_wardrobe_category ON wardrobe(category);
            ",
        )?;
        Ok(())
    }
}

fn product_from_row(row: &Row) -> rusqlite::Result<ScrapedProductRow> {
    Ok(ScrapedProductRow {
        product_code: row.get(0)?,
        title_original: row.get(1)?,
        title_translated: row.get(2)?,
        source_url: row.get(3)?,
        colors: row.get(4)?,
        recommendation_images: row.get(5)?,
        detail_text: row.get(6)?,
        detail_text_translated: row.get(7)?,
        material_text: row.get(8)?,
        material_text_translated: row.get(9)?,
        sizes: row.get(10)?,
        price_jpy: row.get(11)?,
        price_twd: row.get(12)?,
        category: row.get(13)?,
        subcategory: row.get(14)?,
    })
}

/// `products` row before the JSON-text columns are decoded.
struct ScrapedProductRow {
    product_code: String,
    title_original: String,
    title_translated: String,
    source_url: String,
    colors: String,
    recommendation_images: String,
    detail_text: Option<String>,
    detail_text_translated: Option<String>,
    material_text: Option<String>,
    material_text_translated: Option<String>,
    sizes: String,
    price_jpy: Option<i64>,
    price_twd: Option<i64>,
    category: Option<String>,
    subcategory: Option<String>,
}

impl ScrapedProductRow {
    fn decode(self) -> Result<ScrapedProduct, StoreError> {
        Ok(ScrapedProduct {
            title_original: self.title_original,
            title_translated: self.title_translated,
            product_code: self.product_code,
            source_url: self.source_url,
            colors: serde_json::from_str(&self.colors)?,
            recommendation_images: serde_json::from_str(&self.recommendation_images)?,
            detail_text: self.detail_text,
            detail_text_translated: self.detail_text_translated,
            material_text: self.material_text,
            material_text_translated: self.material_text_translated,
            sizes: serde_json::from_str(&self.sizes)?,
            price_source_currency: self.price_jpy,
            price_target_currency: self.price_twd,
            category: self.category,
            subcategory: self.subcategory,
        })
    }
}

fn wardrobe_from_row(row: &Row) -> rusqlite::Result<WardrobeItem> {
    Ok(WardrobeItem {
        key: row.get(0)?,
        product_code: row.get(1)?,
        title: row.get(2)?,
        color_label: row.get(3)?,
        category: row.get(4)?,
        subcategory: row.get(5)?,
        size: row.get(6)?,
        image_url: row.get(7)?,
        price_target_currency: row.get(8)?,
        material_text: row.get(9)?,
    })
}

impl ProductStore for SqliteStore {
    fn save_product(&self, p: &ScrapedProduct) -> Result<(), StoreError> {
        self.conn.execute(
            "INSERT INTO products (
                product_code, title_original, title_translated, source_url, colors,
                recommendation_images, detail_text, detail_text_translated, material_text,
                material_text_translated, sizes, price_jpy, price_twd, category, subcategory
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15)
            ON CONFLICT(product_code) DO UPDATE SET
                title_original = excluded.title_original,
                title_translated = excluded.title_translated,
                source_url = excluded.source_url,
                colors = excluded.colors,
                recommendation_images = excluded.recommendation_images,
                detail_text = excluded.detail_text,
                detail_text_translated = excluded.detail_text_translated,
                material_text = excluded.material_text,
                material_text_translated = excluded.material_text_translated,
                sizes = excluded.sizes,
                price_jpy = excluded.price_jpy,
                price_twd = excluded.price_twd,
                category = excluded.category,
                subcategory = excluded.subcategory,
                updated_at = datetime('now')",
            rusqlite::params![
                p.product_code,
                p.title_original,
                p.title_translated,
                p.source_url,
                serde_json::to_string(&p.colors)?,
                serde_json::to_string(&p.recommendation_images)?,
                p.detail_text,
                p.detail_text_translated,
                p.material_text,
                p.material_text_translated,
                serde_json::to_string(&p.sizes)?,
                p.price_source_currency,
                p.price_target_currency,
                p.category,
                p.subcategory,
            ],
        )?;
        info!("saved product {}", p.product_code);
        Ok(())
    }

    fn add_to_wardrobe(
        &self,
        product: &ScrapedProduct,
        color_label: &str,
        size: &str,
    ) -> Result<WardrobeItem, StoreError> {
        if self.get_product(&product.product_code)?.is_none() {
            return Err(StoreError::UnknownProduct(product.product_code.clone()));
        }
        let color = product
            .color(color_label)
            .ok_or_else(|| StoreError::UnknownColor {
                product_code: product.product_code.clone(),
                color: color_label.to_string(),
            })?;

        let title = product.display_title();
        let size = size.trim();
        let item = WardrobeItem {
            key: WardrobeItem::make_key(&title, &color.color_label, size),
            product_code: product.product_code.clone(),
            title,
            color_label: color.color_label.clone(),
            category: product.category.clone(),
            subcategory: product.subcategory.clone(),
            size: size.to_string(),
            image_url: color.image_url.clone(),
            price_target_currency: product.price_target_currency,
            material_text: product
                .material_text_translated
                .clone()
                .or_else(|| product.material_text.clone()),
        };

        self.conn.execute(
            "INSERT OR REPLACE INTO wardrobe (
                key, product_code, title, color_name, category, subcategory,
                size, image_url, price_twd, material
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            rusqlite::params![
                item.key,
                item.product_code,
                item.title,
                item.color_label,
                item.category,
                item.subcategory,
                item.size,
                item.image_url,
                item.price_target_currency,
                item.material_text,
            ],
        )?;
        info!("wardrobe += {}", item.key);
        Ok(item)
    }

    fn get_product(&self, product_code: &str) -> Result<Option<ScrapedProduct>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT product_code, title_original, title_translated, source_url, colors,
                        recommendation_images, detail_text, detail_text_translated,
                        material_text, material_text_translated, sizes, price_jpy, price_twd,
                        category, subcategory
                 FROM products WHERE product_code = ?1",
                [product_code],
                product_from_row,
            )
            .optional()?;
        row.map(ScrapedProductRow::decode).transpose()
    }

    fn list_wardrobe(&self) -> Result<Vec<WardrobeItem>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT w.key, w.product_code, COALESCE(w.title, p.title_original), w.color_name,
                    w.category, w.subcategory, w.size, w.image_url, w.price_twd, w.material
             FROM wardrobe w
             JOIN products p ON p.product_code = w.product_code
             ORDER BY w.category, w.key",
        )?;
        let rows = stmt
            .query_map([], wardrobe_from_row)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn remove_from_wardrobe(&self, key: &str) -> Result<bool, StoreError> {
        let n = self.conn.execute("DELETE FROM wardrobe WHERE key = ?1", [key])?;
        Ok(n > 0)
    }
}
