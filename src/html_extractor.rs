use lazy_static::lazy_static;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::error::ExtractionError;
use crate::images::RawImage;
use crate::sizes::{size_from_option, sort_sizes};

const DETAIL_HEADING: &str = "商品詳細";
const MATERIAL_HEADING: &str = "サイズ・素材";

lazy_static! {
    static ref TITLE_SEL: Selector = Selector::parse("h1.ttl-name").unwrap();
    static ref CODE_SEL: Selector = Selector::parse("span.txt-code").unwrap();
    static ref PRICE_SEL: Selector = Selector::parse("p.txt-price").unwrap();
    static ref SIZE_OPTION_SEL: Selector = Selector::parse("select.size-select option").unwrap();
    static ref TAB_SEL: Selector = Selector::parse("div.tab-content").unwrap();
    static ref TAB_HEADING_SEL: Selector = Selector::parse("h2.contents-ttl").unwrap();
    static ref BREADCRUMB_SEL: Selector = Selector::parse(".list-breadcrumb li a").unwrap();
    static ref IMAGE_SEL: Selector = Selector::parse("div.modal-detaillist img").unwrap();
    static ref CODE_TOKEN_RE: Regex = Regex::new(r"\[[A-Za-z0-9][A-Za-z0-9-]*\]").unwrap();
    static ref PRICE_RE: Regex = Regex::new(r"¥\s?([\d,]+)").unwrap();
    static ref MATERIAL_RE: Regex = Regex::new(r"☆素材は【.*?】").unwrap();
}

/// Everything pulled off a product page, before translation and normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RawProductFields {
    pub title: String,
    /// Lower-cased; `None` when the title carries no `[code]` token.
    pub product_code: Option<String>,
    pub price: Option<i64>,
    pub sizes: Vec<String>,
    pub detail_text: Option<String>,
    pub material_text: Option<String>,
    pub category: Option<String>,
    pub subcategory: Option<String>,
    pub images: Vec<RawImage>,
}

/// GRL product page (`/disp/item/{code}/`) parser.
pub struct ProductPageExtractor;

impl ProductPageExtractor {
    pub fn new() -> Self {
        Self
    }

    pub fn extract(&self, html: &str) -> Result<RawProductFields, ExtractionError> {
        let document = Html::parse_document(html);

        let title_elem = document
            .select(&TITLE_SEL)
            .next()
            .ok_or(ExtractionError::MissingTitle)?;
        let (title, product_code) = self.extract_title(title_elem)?;

        let (category, subcategory) = self.extract_breadcrumb(&document);
        let (detail_text, material_text) = self.extract_detail_sections(&document);

        Ok(RawProductFields {
            title,
            product_code,
            price: self.extract_price(&document),
            sizes: self.extract_sizes(&document),
            detail_text,
            material_text,
            category,
            subcategory,
            images: self.extract_images(&document),
        })
    }

    /// Bracketed labels such as `[無地]` stay in the title; only a code-shaped
    /// token is taken as the product code, the last one when there are several.
    fn extract_title(&self, elem: ElementRef) -> Result<(String, Option<String>), ExtractionError> {
        let full = elem.text().collect::<String>();
        let full = full.trim();

        let code_token = elem
            .select(&CODE_SEL)
            .next()
            .map(|c| c.text().collect::<String>().trim().to_string())
            .filter(|c| !c.is_empty())
            .or_else(|| {
                CODE_TOKEN_RE
                    .find_iter(full)
                    .last()
                    .map(|m| m.as_str().to_string())
            });

        let (title, code) = match code_token {
            Some(token) => {
                let code = token.trim_matches(|c: char| c == '[' || c == ']').trim().to_lowercase();
                let title = full.replacen(&token, "", 1);
                let title = title.split_whitespace().collect::<Vec<_>>().join(" ");
                let code = if code.is_empty() { None } else { Some(code) };
                (title, code)
            }
            None => (full.to_string(), None),
        };

        if title.is_empty() {
            return Err(ExtractionError::MissingTitle);
        }
        Ok((title, code))
    }

    fn extract_price(&self, document: &Html) -> Option<i64> {
        let Some(elem) = document.select(&PRICE_SEL).next() else {
            warn!("price section not found on the page");
            return None;
        };
        let text = elem.text().collect::<String>();
        let text = text.trim();
        let price = PRICE_RE
            .captures(text)
            .and_then(|c| c.get(1))
            .and_then(|m| m.as_str().replace(',', "").parse::<i64>().ok());
        if price.is_none() {
            warn!("price text did not match: {}", text);
        }
        price
    }

    fn extract_sizes(&self, document: &Html) -> Vec<String> {
        let options = document
            .select(&SIZE_OPTION_SEL)
            .filter_map(|opt| size_from_option(&opt.text().collect::<String>()));
        sort_sizes(options)
    }

    fn extract_detail_sections(&self, document: &Html) -> (Option<String>, Option<String>) {
        let mut detail = None;
        let mut material = None;

        for section in document.select(&TAB_SEL) {
            let Some(heading) = section.select(&TAB_HEADING_SEL).next() else {
                continue;
            };
            let heading = heading.text().map(str::trim).collect::<String>();

            if heading.contains(DETAIL_HEADING) {
                let text: String = section.text().map(str::trim).collect();
                detail = Some(text).filter(|t| !t.is_empty());
            } else if heading.contains(MATERIAL_HEADING) {
                let raw = section.text().collect::<String>();
                material = MATERIAL_RE
                    .find(&raw)
                    .map(|m| m.as_str().replace(['\r', '\n'], "").trim().to_string())
                    .filter(|m| !m.is_empty());
                if material.is_none() {
                    warn!("material section present but has no 素材 span");
                }
            }
        }

        (detail, material)
    }

    /// Index 0 is the site root; 1 is the category, 2 the subcategory.
    fn extract_breadcrumb(&self, document: &Html) -> (Option<String>, Option<String>) {
        let items: Vec<String> = document
            .select(&BREADCRUMB_SEL)
            .map(|a| a.text().collect::<String>().trim().to_string())
            .collect();

        let category = items.get(1).cloned();
        let subcategory = if category.is_some() {
            items.get(2).cloned()
        } else {
            None
        };
        (category, subcategory)
    }

    fn extract_images(&self, document: &Html) -> Vec<RawImage> {
        document
            .select(&IMAGE_SEL)
            .filter_map(|img| {
                let value = img.value();
                let src = value.attr("src").unwrap_or("").trim();
                if src.is_empty() {
                    return None;
                }
                Some(RawImage {
                    src: src.to_string(),
                    alt: value.attr("alt").unwrap_or("").trim().to_string(),
                })
            })
            .collect()
    }
}

impl Default for ProductPageExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(body: &str) -> String {
        format!("<html><body>{}</body></html>", body)
    }

    const TITLE: &str =
        r#"<h1 class="ttl-name">ニットトップス <span class="txt-code">[DK988]</span></h1>"#;

    #[test]
    fn missing_title_is_fatal() {
        let err = ProductPageExtractor::new()
            .extract(&page("<p class=\"txt-price\">¥1,000</p>"))
            .unwrap_err();
        assert_eq!(err, ExtractionError::MissingTitle);
    }

    #[test]
    fn title_and_code_are_split() {
        let raw = ProductPageExtractor::new().extract(&page(TITLE)).unwrap();
        assert_eq!(raw.title, "ニットトップス");
        assert_eq!(raw.product_code.as_deref(), Some("dk988"));
    }

    #[test]
    fn code_token_found_without_span() {
        let html = page(r#"<h1 class="ttl-name"> [ru1234] ワンピース </h1>"#);
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.title, "ワンピース");
        assert_eq!(raw.product_code.as_deref(), Some("ru1234"));
    }

    #[test]
    fn bracketed_label_is_not_taken_as_code() {
        let html = page(r#"<h1 class="ttl-name">Tシャツ[無地] [DK988]</h1>"#);
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.title, "Tシャツ[無地]");
        assert_eq!(raw.product_code.as_deref(), Some("dk988"));

        let html = page(r#"<h1 class="ttl-name">Tシャツ[無地]</h1>"#);
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.title, "Tシャツ[無地]");
        assert_eq!(raw.product_code, None);
    }

    #[test]
    fn title_holding_only_the_code_is_fatal() {
        let ex = ProductPageExtractor::new();
        let html = page(r#"<h1 class="ttl-name"> <span class="txt-code">[DK988]</span> </h1>"#);
        assert_eq!(ex.extract(&html).unwrap_err(), ExtractionError::MissingTitle);
        let html = page(r#"<h1 class="ttl-name">   </h1>"#);
        assert_eq!(ex.extract(&html).unwrap_err(), ExtractionError::MissingTitle);
    }

    #[test]
    fn title_without_code() {
        let html = page(r#"<h1 class="ttl-name">ワンピース</h1>"#);
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.title, "ワンピース");
        assert_eq!(raw.product_code, None);
    }

    #[test]
    fn price_with_thousands_separator() {
        let html = page(&format!(r#"{TITLE}<p class="txt-price">¥ 12,990 (税込)</p>"#));
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.price, Some(12990));
    }

    #[test]
    fn missing_or_unparseable_price_is_absent() {
        let raw = ProductPageExtractor::new().extract(&page(TITLE)).unwrap();
        assert_eq!(raw.price, None);
        let html = page(&format!(r#"{TITLE}<p class="txt-price">SOLD OUT</p>"#));
        assert_eq!(ProductPageExtractor::new().extract(&html).unwrap().price, None);
    }

    #[test]
    fn sizes_drop_stock_suffix_and_sort() {
        let html = page(&format!(
            r#"{TITLE}<select class="size-select">
                <option>L/在庫あり</option>
                <option>S/残りわずか</option>
                <option>M/在庫あり</option>
                <option>S/在庫あり</option>
            </select>"#
        ));
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.sizes, vec!["S", "M", "L"]);
    }

    #[test]
    fn breadcrumb_levels() {
        let crumbs = |n: usize| {
            let names = ["GRL", "ボトムス", "スカート", "extra"];
            let items: String = names[..n]
                .iter()
                .map(|n| format!("<li><a href=\"#\">{n}</a></li>"))
                .collect();
            page(&format!(r#"{TITLE}<ul class="list-breadcrumb">{items}</ul>"#))
        };
        let ex = ProductPageExtractor::new();

        let raw = ex.extract(&crumbs(1)).unwrap();
        assert_eq!((raw.category, raw.subcategory), (None, None));

        let raw = ex.extract(&crumbs(2)).unwrap();
        assert_eq!((raw.category.as_deref(), raw.subcategory), (Some("ボトムス"), None));

        let raw = ex.extract(&crumbs(4)).unwrap();
        assert_eq!(raw.category.as_deref(), Some("ボトムス"));
        assert_eq!(raw.subcategory.as_deref(), Some("スカート"));
    }

    #[test]
    fn detail_and_material_sections() {
        let html = page(&format!(
            r#"{TITLE}
            <div class="tab-content">
                <h2 class="contents-ttl only-pc">商品詳細</h2>
                <p>  柔らかいニット。 </p>
                <p>着回し抜群</p>
            </div>
            <div class="tab-content">
                <h2 class="contents-ttl only-pc">サイズ・素材</h2>
                <p>着丈:60cm
☆素材は【ポリエステル
100%】です</p>
            </div>"#
        ));
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.detail_text.as_deref(), Some("商品詳細柔らかいニット。着回し抜群"));
        assert_eq!(raw.material_text, None, "regex does not span lines");

        let html = html.replace("ポリエステル\n100%", "ポリエステル100%");
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.material_text.as_deref(), Some("☆素材は【ポリエステル100%】"));
    }

    #[test]
    fn material_block_without_span_is_absent() {
        let html = page(&format!(
            r#"{TITLE}<div class="tab-content"><h2 class="contents-ttl">サイズ・素材</h2><p>着丈:60cm</p></div>"#
        ));
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.material_text, None);
        assert_eq!(raw.detail_text, None);
    }

    #[test]
    fn images_keep_page_order() {
        let html = page(&format!(
            r#"{TITLE}<div class="modal-detaillist">
                <img src=" https://cdn.grail.bz/images/goods/t/dk988/dk988_col_11.jpg " alt=" ブラック ">
                <img src="" alt="empty">
                <img src="https://cdn.grail.bz/images/goods/t/dk988/dk988_v1.jpg">
            </div>"#
        ));
        let raw = ProductPageExtractor::new().extract(&html).unwrap();
        assert_eq!(raw.images.len(), 2);
        assert_eq!(raw.images[0].alt, "ブラック");
        assert_eq!(
            raw.images[0].src,
            "https://cdn.grail.bz/images/goods/t/dk988/dk988_col_11.jpg"
        );
        assert_eq!(raw.images[1].alt, "");
    }
}
