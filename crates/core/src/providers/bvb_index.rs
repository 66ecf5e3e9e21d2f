use async_trait::async_trait;
use reqwest::Client;
use scraper::Html;

use crate::errors::CoreError;
use crate::models::symbol::IndexConstituent;

use super::html::{self, NumberFormat};
use super::traits::IndexSource;

const PROVIDER: &str = "BVB Indices";

pub const INDEX_PROFILE_URL: &str =
    "https://www.bvb.ro/FinancialInstruments/Indices/IndicesProfiles.aspx";

/// Cells per constituent row:
/// symbol, company, shares, price, free float, representation, price correction, weight.
const ROW_CELLS: usize = 8;

/// Bucharest Stock Exchange index profile page (BET composition).
///
/// - **Free**: public page, no API key.
/// - **Table**: `#gvC`, one row per constituent, ordered by weight.
/// - **Numbers**: Romanian formatting on the current site.
pub struct BvbIndexProvider {
    client: Client,
    url: String,
    number_format: NumberFormat,
}

impl BvbIndexProvider {
    pub fn new() -> Self {
        Self::with_url(INDEX_PROFILE_URL, NumberFormat::Romanian)
    }

    /// Point the provider at another page (mirror, test server, English site).
    pub fn with_url(url: impl Into<String>, number_format: NumberFormat) -> Self {
        Self {
            client: html::http_client(),
            url: url.into(),
            number_format,
        }
    }
}

impl Default for BvbIndexProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl IndexSource for BvbIndexProvider {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn fetch_constituents(&self, limit: usize) -> Result<Vec<IndexConstituent>, CoreError> {
        let body = html::fetch_html(&self.client, &self.url, PROVIDER).await?;
        parse_index_profile(&body, limit, self.number_format)
    }
}

/// Extract the first `limit` constituents from the index profile page.
pub fn parse_index_profile(
    body: &str,
    limit: usize,
    number_format: NumberFormat,
) -> Result<Vec<IndexConstituent>, CoreError> {
    let document = Html::parse_document(body);
    let table = html::selector("#gvC", PROVIDER)?;
    let rows = html::selector("tbody tr", PROVIDER)?;
    let cells = html::selector("td", PROVIDER)?;

    let table = document
        .select(&table)
        .next()
        .ok_or_else(|| CoreError::parse(PROVIDER, "Index table #gvC not found"))?;

    let mut constituents = Vec::new();
    for row in table.select(&rows) {
        if constituents.len() >= limit {
            break;
        }

        let texts: Vec<String> = row.select(&cells).map(html::cell_text).collect();
        // Header rows carry <th> cells only
        if texts.is_empty() {
            continue;
        }
        if texts.len() < ROW_CELLS {
            return Err(CoreError::parse(
                PROVIDER,
                format!("Expected {ROW_CELLS} cells per row, found {}", texts.len()),
            ));
        }

        let field = |index: usize, name: &str| {
            html::require_decimal(&texts[index], number_format, name, PROVIDER)
        };

        constituents.push(IndexConstituent {
            symbol: texts[0].to_uppercase(),
            company: texts[1].clone(),
            shares: html::require_integer(&texts[2], number_format, "shares", PROVIDER)?,
            free_float_factor: field(4, "free float factor")?,
            representation_factor: field(5, "representation factor")?,
            price_correction_factor: field(6, "price correction factor")?,
            weight: field(7, "weight")?,
        });
    }

    Ok(constituents)
}
