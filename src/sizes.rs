use std::collections::HashSet;

pub const SHOE_SIZE_ORDER: &[&str] = &[
    "22.0cm", "22.5cm", "23.0cm", "23.5cm", "24.0cm", "24.5cm", "25.0cm",
];

pub const APPAREL_SIZE_ORDER: &[&str] = &["F", "XS", "S", "M", "L", "XL"];

/// Option text looks like `M/在庫あり`; keep what's before the first `/`.
pub fn size_from_option(text: &str) -> Option<String> {
    let size = text.trim().split('/').next().unwrap_or("").trim();
    if size.is_empty() {
        None
    } else {
        Some(size.to_string())
    }
}

/// Any `cm` token means footwear.
pub fn canonical_order<S: AsRef<str>>(sizes: &[S]) -> &'static [&'static str] {
    if sizes.iter().any(|s| s.as_ref().contains("cm")) {
        SHOE_SIZE_ORDER
    } else {
        APPAREL_SIZE_ORDER
    }
}

/// Deduplicates (first occurrence wins) and sorts by canonical position.
/// Unknown tokens keep their encounter order after every known one.
pub fn sort_sizes<I, S>(sizes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen = HashSet::new();
    let mut unique: Vec<String> = Vec::new();
    for size in sizes {
        let size = size.into();
        if seen.insert(size.clone()) {
            unique.push(size);
        }
    }

    let order = canonical_order(&unique);
    unique.sort_by_key(|s| order.iter().position(|o| o == s).unwrap_or(order.len()));
    unique
}
