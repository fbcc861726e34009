use thiserror::Error;

/// Raised when a product page can't be turned into a field bag.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    #[error("product details not found on the page (missing or empty title)")]
    MissingTitle,
}

/// Fatal-to-invocation failures. Everything else degrades a single field.
#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("invalid product reference: {0}")]
    InvalidInput(String),

    #[error("failed to fetch {url}: status code {status}")]
    Fetch { url: String, status: u16 },

    #[error("network error fetching {url}: {message}")]
    Network { url: String, message: String },

    #[error(transparent)]
    Extraction(#[from] ExtractionError),
}

#[derive(Error, Debug)]
pub enum TranslateError {
    #[error("translation request failed: {0}")]
    Request(String),

    #[error("translation service returned status {0}")]
    Status(u16),

    #[error("unexpected translation response: {0}")]
    Response(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error(transparent)]
    Sqlite(#[from] rusqlite::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error("could not create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("unknown product code: {0}")]
    UnknownProduct(String),

    #[error("color {color} is not offered for product {product_code}")]
    UnknownColor { product_code: String, color: String },
}

#[derive(Error, Debug)]
pub enum AdviceError {
    #[error("GENAI_API_KEY is not set")]
    MissingApiKey,

    #[error("advice request failed: {0}")]
    Request(String),

    #[error("advice service returned status {0}")]
    Status(u16),

    #[error("advice response had no text")]
    EmptyResponse,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {name}: {value}")]
    InvalidValue { name: &'static str, value: String },

    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("could not start HTTP runtime: {0}")]
    Runtime(String),
}
