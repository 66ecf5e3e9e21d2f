//! Shared helpers for the HTML scraping providers.

use reqwest::Client;
use scraper::{ElementRef, Selector};
use std::time::Duration;

use crate::errors::CoreError;

const USER_AGENT: &str = concat!("bet-etf/", env!("CARGO_PKG_VERSION"));

/// How a page writes its numbers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    /// `1.234.567,89`: dot groups thousands, comma marks decimals
    Romanian,
    /// `1,234,567.89`: comma groups thousands, dot marks decimals
    English,
}

/// HTTP client used by every scraping provider.
pub fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_else(|_| Client::new())
}

/// GET a page and return its body. Non-2xx responses are errors.
pub async fn fetch_html(client: &Client, url: &str, provider: &str) -> Result<String, CoreError> {
    let response = client.get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(CoreError::Api {
            provider: provider.to_string(),
            message: format!("HTTP {status} for {url}"),
        });
    }
    Ok(response.text().await?)
}

/// Compile a CSS selector, reporting failures against `source_name`.
pub fn selector(css: &str, source_name: &str) -> Result<Selector, CoreError> {
    Selector::parse(css)
        .map_err(|e| CoreError::parse(source_name, format!("Invalid selector {css:?}: {e:?}")))
}

/// Visible text of an element with whitespace collapsed.
pub fn cell_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Texts of the direct child elements of `element`.
pub fn child_texts(element: ElementRef<'_>) -> Vec<String> {
    element
        .children()
        .filter_map(ElementRef::wrap)
        .map(cell_text)
        .collect()
}

/// Parse a decimal number such as `1.234,56`, `-0,42 %` or `1,234.56`.
/// Returns `None` for empty, `n/a` or otherwise unparsable text.
pub fn parse_decimal(raw: &str, format: NumberFormat) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '%')
        .collect();

    let normalized = match format {
        NumberFormat::Romanian => cleaned.replace('.', "").replace(',', "."),
        NumberFormat::English => cleaned.replace(',', ""),
    };

    if normalized.is_empty() {
        return None;
    }

    normalized.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative whole number such as `1.234.567` or `1,234,567`.
pub fn parse_integer(raw: &str, format: NumberFormat) -> Option<u64> {
    let value = parse_decimal(raw, format)?;
    if value < 0.0 || value.fract() != 0.0 || value > u64::MAX as f64 {
        return None;
    }
    Some(value as u64)
}

/// Like [`parse_decimal`] but an error naming the field when parsing fails.
pub fn require_decimal(
    raw: &str,
    format: NumberFormat,
    field: &str,
    source_name: &str,
) -> Result<f64, CoreError> {
    parse_decimal(raw, format)
        .ok_or_else(|| CoreError::parse(source_name, format!("Invalid {field}: {raw:?}")))
}

/// Like [`parse_integer`] but an error naming the field when parsing fails.
pub fn require_integer(
    raw: &str,
    format: NumberFormat,
    field: &str,
    source_name: &str,
) -> Result<u64, CoreError> {
    parse_integer(raw, format)
        .ok_or_else(|| CoreError::parse(source_name, format!("Invalid {field}: {raw:?}")))
}
