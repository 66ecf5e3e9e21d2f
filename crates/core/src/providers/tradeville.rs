use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use crate::errors::CoreError;
use crate::models::symbol::SymbolQuote;

use super::html::{self, NumberFormat};
use super::traits::QuoteSource;

const PROVIDER: &str = "Tradeville";

pub const QUOTES_URL: &str = "https://www.tradeville.eu/actiuni/actiuni-";

/// Tradeville broker quote page.
///
/// The quotation block alternates label and value elements:
/// 1 last price, 3 variation, 5 open, 7 `max/min`, 9 medium price,
/// 11 volume, 13 dividend yield (`n/a` for non-payers).
pub struct TradevilleProvider {
    client: Client,
    base_url: String,
}

impl TradevilleProvider {
    pub fn new() -> Self {
        Self::with_base_url(QUOTES_URL)
    }

    /// `base_url` is followed directly by the symbol.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: html::http_client(),
            base_url: base_url.into(),
        }
    }
}

impl Default for TradevilleProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for TradevilleProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, CoreError> {
        let url = format!("{}{}", self.base_url, symbol.to_uppercase());
        let body = html::fetch_html(&self.client, &url, PROVIDER).await?;
        parse_quotation_table(&body)
    }
}

/// Extract the quote from the first quotation block of the page.
pub fn parse_quotation_table(body: &str) -> Result<SymbolQuote, CoreError> {
    let document = Html::parse_document(body);
    let block = html::selector("div.quotationTblLarge", PROVIDER)?;

    let block = document
        .select(&block)
        .next()
        .ok_or_else(|| CoreError::parse(PROVIDER, "Quotation table not found"))?;

    let cells = html::child_texts(block);
    if cells.len() < 12 {
        return Err(CoreError::parse(
            PROVIDER,
            format!("Expected at least 12 quotation cells, found {}", cells.len()),
        ));
    }

    let decimal = |index: usize, field: &str| {
        html::require_decimal(&cells[index], NumberFormat::English, field, PROVIDER)
    };

    let (max_raw, min_raw) = cells[7]
        .split_once('/')
        .ok_or_else(|| CoreError::parse(PROVIDER, format!("Invalid max/min: {:?}", cells[7])))?;

    Ok(SymbolQuote {
        buy_price: decimal(1, "last price")?,
        variation: decimal(3, "variation")?,
        open_price: decimal(5, "open price")?,
        max_price: html::require_decimal(max_raw, NumberFormat::English, "max price", PROVIDER)?,
        min_price: html::require_decimal(min_raw, NumberFormat::English, "min price", PROVIDER)?,
        medium_price: decimal(9, "medium price")?,
        volume: html::require_integer(&cells[11], NumberFormat::English, "volume", PROVIDER)?,
        dividend_yield: cells
            .get(13)
            .and_then(|raw| html::parse_decimal(raw, NumberFormat::English))
            .unwrap_or_default(),
    })
}
