use std::collections::HashSet;
use std::time::Instant;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use wardrobe_scraper::advice::{matching_items, GeminiAdvisor, StylingAdvisor, DEFAULT_MATCH_LIMIT};
use wardrobe_scraper::display::{category_display_name, subcategory_display_name};
use wardrobe_scraper::image_cache::ImageCache;
use wardrobe_scraper::images::{all_model_photo_urls, ImageQuality};
use wardrobe_scraper::net::HttpClient;
use wardrobe_scraper::{
    scrape_product, Config, GoogleTranslator, HttpPageFetcher, ProductStore, ScrapedProduct,
    SqliteStore, StaticTables, WardrobeItem,
};

#[derive(Parser)]
#[command(name = "wardrobe", about = "GRL product scraper and personal wardrobe")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Scrape a product page by URL or product code
    Scrape {
        reference: String,
        /// Print the record as JSON
        #[arg(long)]
        json: bool,
        /// Save the product into the database
        #[arg(long)]
        save: bool,
        /// Download high-quality color images into the cache
        #[arg(long)]
        download_images: bool,
    },
    /// Scrape, save and add one color/size variant to the wardrobe
    Add {
        reference: String,
        /// Color label as shown by `scrape`, e.g. 黑色的（ブラック）
        #[arg(long)]
        color: String,
        #[arg(long)]
        size: String,
    },
    /// List wardrobe items
    List {
        /// Only show this category (Japanese label)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Remove a wardrobe item by key
    Remove { key: String },
    /// Ask the stylist for an outfit from the wardrobe
    Advise { request: String },
    /// Print model photo and color image URLs for a product code
    Photos {
        code: String,
        #[arg(long)]
        low_quality: bool,
    },
    /// Delete cached images older than N days
    CleanupCache {
        #[arg(long, default_value = "30")]
        days: u64,
    },
}

struct Services {
    client: HttpClient,
    fetcher: HttpPageFetcher,
    translator: GoogleTranslator,
    tables: StaticTables,
}

impl Services {
    fn new(config: &Config) -> anyhow::Result<Self> {
        let client = HttpClient::new(config.http_timeout)?;
        Ok(Self {
            fetcher: HttpPageFetcher::new(client.clone()),
            translator: GoogleTranslator::new(client.clone(), &config.source_lang, &config.target_lang),
            tables: StaticTables::load(config)?,
            client,
        })
    }

    fn scrape(&self, reference: &str, config: &Config) -> anyhow::Result<ScrapedProduct> {
        scrape_product(reference, &self.fetcher, &self.translator, &self.tables, config)
            .with_context(|| format!("scraping {}", reference))
    }
}

fn print_product(p: &ScrapedProduct) {
    println!("{}", p.display_title());
    println!("  code:     {}", p.product_code);
    println!("  url:      {}", p.source_url);
    match (p.price_source_currency, p.price_target_currency) {
        (Some(jpy), Some(twd)) => println!("  price:    ¥{} / NT${}", jpy, twd),
        _ => println!("  price:    -"),
    }
    println!(
        "  category: {} > {}",
        p.category.as_deref().map(category_display_name).unwrap_or_else(|| "-".into()),
        p.subcategory.as_deref().map(subcategory_display_name).unwrap_or_else(|| "-".into()),
    );
    println!("  sizes:    {}", p.sizes.join(", "));
    for c in &p.colors {
        println!("  color:    {}  {}", c.color_label, c.image_url);
    }
    if let Some(m) = p.material_text_translated.as_ref().or(p.material_text.as_ref()) {
        println!("  material: {}", m);
    }
    println!("  images:   {} recommendation", p.recommendation_images.len());
}

fn list_summary(items: &[WardrobeItem]) -> String {
    let categories: HashSet<Option<&str>> = items.iter().map(|i| i.category.as_deref()).collect();
    format!("{} items in {} categories", items.len(), categories.len())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();
    let config = Config::from_env()?;

    let result = match cli.command {
        Commands::Scrape {
            reference,
            json,
            save,
            download_images,
        } => {
            let services = Services::new(&config)?;
            let product = services.scrape(&reference, &config)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&product)?);
            } else {
                print_product(&product);
            }
            if save {
                SqliteStore::open(&config.db_path)?.save_product(&product)?;
                println!("Saved {}", product.product_code);
            }
            if download_images {
                let cache = ImageCache::new(&services.client, &config.image_cache_dir, &config.image_backup_dir);
                let report = cache.download_product_images(&product.product_code, &product.colors, true);
                println!(
                    "Images: {} downloaded, {} failed ({} colors)",
                    report.downloaded, report.failed, report.total_colors
                );
            }
            Ok(())
        }
        Commands::Add {
            reference,
            color,
            size,
        } => {
            let services = Services::new(&config)?;
            let product = services.scrape(&reference, &config)?;
            let store = SqliteStore::open(&config.db_path)?;
            store.save_product(&product)?;
            match store.add_to_wardrobe(&product, &color, &size) {
                Ok(item) => {
                    println!("Added {}", item.key);
                    Ok(())
                }
                Err(e) => {
                    eprintln!("Available colors: {}", product.color_labels().join(", "));
                    Err(e.into())
                }
            }
        }
        Commands::List { category } => {
            let store = SqliteStore::open(&config.db_path)?;
            let items: Vec<_> = store
                .list_wardrobe()?
                .into_iter()
                .filter(|i| category.is_none() || i.category == category)
                .collect();
            let mut current: Option<Option<String>> = None;
            for item in &items {
                if current.as_ref() != Some(&item.category) {
                    let label = item
                        .category
                        .as_deref()
                        .map(category_display_name)
                        .unwrap_or_else(|| "-".into());
                    println!("== {} ==", label);
                    current = Some(item.category.clone());
                }
                let price = item
                    .price_target_currency
                    .map(|p| format!("NT${}", p))
                    .unwrap_or_else(|| "-".into());
                println!("  {}  [{}]  {}", item.key, item.size, price);
            }
            println!("{}", list_summary(&items));
            Ok(())
        }
        Commands::Remove { key } => {
            let store = SqliteStore::open(&config.db_path)?;
            if !store.remove_from_wardrobe(&key)? {
                bail!("no wardrobe item with key {}", key);
            }
            println!("Removed {}", key);
            Ok(())
        }
        Commands::Advise { request } => {
            let store = SqliteStore::open(&config.db_path)?;
            let items = store.list_wardrobe()?;
            if items.is_empty() {
                bail!("the wardrobe is empty, add some items first");
            }
            let client = HttpClient::new(config.http_timeout)?;
            let advisor = GeminiAdvisor::new(client, config.genai_api_key.clone(), &config.gemini_model);
            let advice = advisor.advise(&request, &items)?;
            println!("{}\n", advice);
            for item in matching_items(&advice, &items, DEFAULT_MATCH_LIMIT) {
                println!("  * {} {}  {}", item.title, item.color_label, item.image_url);
            }
            Ok(())
        }
        Commands::Photos { code, low_quality } => {
            let quality = if low_quality { ImageQuality::Low } else { ImageQuality::High };
            let code = code.trim().to_lowercase();
            let tables = StaticTables::load(&config)?;
            for photo in all_model_photo_urls(&code, quality) {
                println!("v{:<3} {}", photo.v_number, photo.url);
            }
            for label in tables.color_codes.labels() {
                for url in tables.color_codes.all_color_image_urls(&code, label, quality) {
                    println!("{}  {}", label, url);
                }
            }
            Ok(())
        }
        Commands::CleanupCache { days } => {
            let client = HttpClient::new(config.http_timeout)?;
            let cache = ImageCache::new(&client, &config.image_cache_dir, &config.image_backup_dir);
            let report = cache.cleanup_old_cache(days)?;
            println!(
                "Deleted {} files, freed {:.1} KB",
                report.deleted_files,
                report.freed_bytes as f64 / 1024.0
            );
            Ok(())
        }
    };

    tracing::info!("done in {:.2?}", t0.elapsed());
    result
}
