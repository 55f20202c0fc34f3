//! Shopping search parser.
//!
//! Shopping result pages are client-rendered: the product list is not in the
//! HTML but rides in a bootstrap JSON object assigned inside a script block.
//! Extraction isolates that object; the projector pulls the product fields
//! out of it.

use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::scraper::extract::{extract, ExtractionOutcome};
use crate::scraper::project::{lookup, lookup_array, lookup_f64, lookup_str, lookup_u64};

/// Script marker preceding the bootstrap payload
pub const BOOTSTRAP_MARKER: &str = "window.__PRELOADED_STATE__";

/// One product listing
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShoppingItem {
    pub product_id: Option<String>,
    pub title: String,
    pub price: Option<u64>,
    pub mall_name: Option<String>,
    pub link: Option<String>,
    pub image: Option<String>,
    pub review_count: Option<u64>,
    /// Review score, 0.0-5.0
    pub score: Option<f64>,
}

/// One parsed shopping result page
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ShoppingPage {
    /// Total result count the portal reports for the query
    pub total: Option<u64>,
    pub items: Vec<ShoppingItem>,
}

/// Parser for shopping search pages
pub struct ShoppingParser;

impl ShoppingParser {
    /// Parse a shopping page from the raw document text.
    ///
    /// A page without the bootstrap marker parses to an empty result (the
    /// query may simply have no products); a marker with a broken payload is
    /// an error the caller should log and skip.
    pub fn parse(text: &str) -> Result<ShoppingPage> {
        match extract(text, BOOTSTRAP_MARKER) {
            ExtractionOutcome::Found(payload) => Ok(Self::parse_payload(&payload)),
            ExtractionOutcome::NotFound => {
                debug!("no bootstrap payload in document");
                Ok(ShoppingPage::default())
            }
            ExtractionOutcome::MalformedJson => {
                bail!("bootstrap payload present but malformed")
            }
        }
    }

    fn parse_payload(payload: &Value) -> ShoppingPage {
        let mut page = ShoppingPage {
            total: lookup_u64(payload, "shoppingResult.total"),
            items: Vec::new(),
        };

        let Some(products) = lookup_array(payload, "shoppingResult.products") else {
            return page;
        };

        page.items = products.iter().filter_map(Self::parse_product).collect();
        page
    }

    fn parse_product(product: &Value) -> Option<ShoppingItem> {
        let title = lookup_str(product, "productTitle")?.trim().to_string();
        if title.is_empty() {
            return None;
        }

        Some(ShoppingItem {
            product_id: Self::id_field(product),
            title,
            price: Self::price_field(product),
            mall_name: lookup_str(product, "mallName")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            link: lookup_str(product, "mallProductUrl")
                .or_else(|| lookup_str(product, "crUrl"))
                .map(str::to_string),
            image: lookup_str(product, "imageUrl").map(str::to_string),
            review_count: lookup_u64(product, "reviewCount"),
            score: lookup_f64(product, "scoreInfo"),
        })
    }

    /// Product ids appear as either a string or a number.
    fn id_field(product: &Value) -> Option<String> {
        match lookup(product, "id")? {
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    /// Prices appear as either a number or a comma-grouped string ("1,290,000").
    fn price_field(product: &Value) -> Option<u64> {
        let value = lookup(product, "price")?;
        value
            .as_u64()
            .or_else(|| value.as_str()?.replace(',', "").parse().ok())
    }
}
