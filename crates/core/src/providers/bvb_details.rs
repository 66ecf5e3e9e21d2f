use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use crate::errors::CoreError;
use crate::models::symbol::SymbolQuote;

use super::html::{self, NumberFormat};
use super::traits::QuoteSource;

const PROVIDER: &str = "BVB Details";

pub const DETAILS_URL: &str =
    "https://m.bvb.ro/FinancialInstruments/Details/FinancialInstrumentsDetails.aspx?s=";

/// Bucharest Stock Exchange instrument details page (mobile site).
///
/// The trading panel is a label/value table (`Ultimul pret`, `Pret mediu`, ...);
/// the indicators panel carries the dividend yield on its `DIVY` row.
pub struct BvbDetailsProvider {
    client: Client,
    base_url: String,
}

impl BvbDetailsProvider {
    pub fn new() -> Self {
        Self::with_base_url(DETAILS_URL)
    }

    /// `base_url` is followed directly by the symbol.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: html::http_client(),
            base_url: base_url.into(),
        }
    }
}

impl Default for BvbDetailsProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl QuoteSource for BvbDetailsProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, CoreError> {
        let url = format!("{}{}", self.base_url, symbol.to_uppercase());
        let body = html::fetch_html(&self.client, &url, PROVIDER).await?;
        parse_symbol_details(&body)
    }
}

/// Extract the quote from an instrument details page.
///
/// The last price is required; every other field defaults to zero when the
/// page leaves it out or shows a placeholder.
pub fn parse_symbol_details(body: &str) -> Result<SymbolQuote, CoreError> {
    let document = Html::parse_document(body);
    let trading_rows = html::selector("#ctl00_body_upd tr", PROVIDER)?;
    let indicator_rows = html::selector("#ctl00_body_ctl01_IndicatorsControl_dvIndicatori tr", PROVIDER)?;
    let cells = html::selector("td", PROVIDER)?;

    let number = |raw: &str| html::parse_decimal(raw, NumberFormat::Romanian);

    let mut quote = SymbolQuote::default();
    let mut last_price = None;

    for row in document.select(&trading_rows) {
        let texts: Vec<String> = row.select(&cells).map(html::cell_text).collect();
        let [label, value, ..] = texts.as_slice() else {
            continue;
        };

        match label.to_lowercase().as_str() {
            "ultimul pret" => last_price = number(value),
            "pret deschidere" => quote.open_price = number(value).unwrap_or_default(),
            "pret maxim" => quote.max_price = number(value).unwrap_or_default(),
            "pret minim" => quote.min_price = number(value).unwrap_or_default(),
            "pret mediu" => quote.medium_price = number(value).unwrap_or_default(),
            "var (%)" => quote.variation = number(value).unwrap_or_default(),
            "volum" => {
                quote.volume = html::parse_integer(value, NumberFormat::Romanian).unwrap_or_default()
            }
            _ => {}
        }
    }

    quote.buy_price =
        last_price.ok_or_else(|| CoreError::parse(PROVIDER, "Last price (Ultimul pret) not found"))?;

    for row in document.select(&indicator_rows) {
        let texts: Vec<String> = row.select(&cells).map(html::cell_text).collect();
        if let [label, value, ..] = texts.as_slice() {
            if label.contains("DIVY") {
                quote.dividend_yield = number(value).unwrap_or_default();
            }
        }
    }

    Ok(quote)
}
