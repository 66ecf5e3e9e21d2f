// ═══════════════════════════════════════════════════════════════════
// Provider Tests — HTML parsing (BVB, Tradeville), number formats,
// quote source registry fallback
// ═══════════════════════════════════════════════════════════════════

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use bet_etf_core::errors::CoreError;
use bet_etf_core::models::symbol::SymbolQuote;
use bet_etf_core::providers::bvb_details::{parse_symbol_details, BvbDetailsProvider};
use bet_etf_core::providers::bvb_index::{parse_index_profile, BvbIndexProvider};
use bet_etf_core::providers::html::{parse_decimal, parse_integer, NumberFormat};
use bet_etf_core::providers::registry::QuoteSourceRegistry;
use bet_etf_core::providers::tradeville::{parse_quotation_table, TradevilleProvider};
use bet_etf_core::providers::traits::{IndexSource, QuoteSource};

// ═══════════════════════════════════════════════════════════════════
// Fixtures
// ═══════════════════════════════════════════════════════════════════

const INDEX_PROFILE_HTML: &str = r#"
<html><body>
<table id="gvC">
  <thead>
    <tr><th>Simbol</th><th>Societate</th><th>Nr. actiuni</th><th>Pret</th>
        <th>FF</th><th>FR</th><th>FC</th><th>Pondere (%)</th></tr>
  </thead>
  <tbody>
    <tr><td>TLV</td><td>BANCA TRANSILVANIA S.A.</td><td>798.658.233</td><td>25,40</td>
        <td>1,00</td><td>0,85</td><td>1,00</td><td>19,87</td></tr>
    <tr><td> snp </td><td>OMV PETROM S.A.</td><td>62.311.667.058</td><td>0,5780</td>
        <td>0,30</td><td>1,00</td><td>1,00</td><td>18,12</td></tr>
    <tr><td>H2O</td><td>S.P.E.E.H. HIDROELECTRICA S.A.</td><td>449.802.229</td><td>120,00</td>
        <td>0,20</td><td>1,00</td><td>1,00</td><td>9,05</td></tr>
  </tbody>
</table>
</body></html>
"#;

const DETAILS_HTML: &str = r#"
<html><body>
<div id="ctl00_body_upd">
  <div>header</div>
  <div><div><div>
    <table>
      <tr><td>Ultimul pret</td><td><b>25,4000</b></td></tr>
      <tr><td>Var (%)</td><td><b>-1,25</b></td></tr>
      <tr><td>Pret deschidere</td><td><b>25,7000</b></td></tr>
      <tr><td>Pret maxim</td><td><b>25,8000</b></td></tr>
      <tr><td>Pret minim</td><td><b>25,1000</b></td></tr>
      <tr><td>Pret mediu</td><td><b>25,3512</b></td></tr>
      <tr><td>Volum</td><td><b>1.234.567</b></td></tr>
    </table>
  </div></div></div>
</div>
<table id="ctl00_body_ctl01_IndicatorsControl_dvIndicatori">
  <tr><td>PER</td><td>6,10</td></tr>
  <tr><td>DIVY (%)</td><td>4,52</td></tr>
</table>
</body></html>
"#;

const TRADEVILLE_HTML: &str = r#"
<html><body>
<div class="quotationTblLarge">
  <span>Ultimul pret</span><span>25.40</span>
  <span>Var</span><span>-1.25%</span>
  <span>Deschidere</span><span>25.70</span>
  <span>Max/Min</span><span>25.80/25.10</span>
  <span>Pret mediu</span><span>25.35</span>
  <span>Volum</span><span>1,234,567</span>
  <span>Randament div.</span><span>n/a</span>
</div>
<div class="quotationTblLarge"><span>ignored</span></div>
</body></html>
"#;

// ═══════════════════════════════════════════════════════════════════
// Test Helpers — Mock Sources
// ═══════════════════════════════════════════════════════════════════

/// A quote source that always returns the same price and counts calls.
struct MockQuoteSource {
    name: String,
    price: f64,
    calls: Arc<AtomicUsize>,
}

impl MockQuoteSource {
    fn new(name: &str, price: f64) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                name: name.to_string(),
                price,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

#[async_trait]
impl QuoteSource for MockQuoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_quote(&self, _symbol: &str) -> Result<SymbolQuote, CoreError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(SymbolQuote {
            buy_price: self.price,
            ..SymbolQuote::default()
        })
    }
}

/// A quote source that always fails.
struct FailingQuoteSource {
    name: String,
}

#[async_trait]
impl QuoteSource for FailingQuoteSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_quote(&self, symbol: &str) -> Result<SymbolQuote, CoreError> {
        Err(CoreError::Api {
            provider: self.name.clone(),
            message: format!("Failed for {symbol}"),
        })
    }
}

// ═══════════════════════════════════════════════════════════════════
// Number parsing
// ═══════════════════════════════════════════════════════════════════

mod numbers {
    use super::*;

    #[test]
    fn romanian_decimal() {
        assert_eq!(parse_decimal("1.234,56", NumberFormat::Romanian), Some(1234.56));
        assert_eq!(parse_decimal("25,4000", NumberFormat::Romanian), Some(25.4));
    }

    #[test]
    fn romanian_negative_percent() {
        assert_eq!(parse_decimal("-0,42 %", NumberFormat::Romanian), Some(-0.42));
    }

    #[test]
    fn english_decimal() {
        assert_eq!(parse_decimal("1,234.56", NumberFormat::English), Some(1234.56));
        assert_eq!(parse_decimal("+1.25%", NumberFormat::English), Some(1.25));
    }

    #[test]
    fn non_breaking_space_is_ignored() {
        assert_eq!(parse_decimal("1\u{a0}234,5", NumberFormat::Romanian), Some(1234.5));
    }

    #[test]
    fn placeholders_are_none() {
        assert_eq!(parse_decimal("n/a", NumberFormat::English), None);
        assert_eq!(parse_decimal("", NumberFormat::Romanian), None);
        assert_eq!(parse_decimal("-", NumberFormat::Romanian), None);
        assert_eq!(parse_decimal("NaN", NumberFormat::English), None);
    }

    #[test]
    fn integers() {
        assert_eq!(parse_integer("798.658.233", NumberFormat::Romanian), Some(798_658_233));
        assert_eq!(parse_integer("1,234,567", NumberFormat::English), Some(1_234_567));
    }

    #[test]
    fn integer_rejects_fraction_and_negative() {
        assert_eq!(parse_integer("12,5", NumberFormat::Romanian), None);
        assert_eq!(parse_integer("-5", NumberFormat::English), None);
    }
}

// ═══════════════════════════════════════════════════════════════════
// BVB index profile
// ═══════════════════════════════════════════════════════════════════

mod bvb_index {
    use super::*;

    #[test]
    fn parses_all_rows() {
        let rows = parse_index_profile(INDEX_PROFILE_HTML, 20, NumberFormat::Romanian).unwrap();
        assert_eq!(rows.len(), 3);

        let tlv = &rows[0];
        assert_eq!(tlv.symbol, "TLV");
        assert_eq!(tlv.company, "BANCA TRANSILVANIA S.A.");
        assert_eq!(tlv.shares, 798_658_233);
        assert_eq!(tlv.free_float_factor, 1.0);
        assert_eq!(tlv.representation_factor, 0.85);
        assert_eq!(tlv.price_correction_factor, 1.0);
        assert_eq!(tlv.weight, 19.87);
    }

    #[test]
    fn symbol_is_trimmed_and_uppercased() {
        let rows = parse_index_profile(INDEX_PROFILE_HTML, 20, NumberFormat::Romanian).unwrap();
        assert_eq!(rows[1].symbol, "SNP");
        assert_eq!(rows[1].shares, 62_311_667_058);
    }

    #[test]
    fn respects_limit() {
        let rows = parse_index_profile(INDEX_PROFILE_HTML, 2, NumberFormat::Romanian).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].symbol, "SNP");
    }

    #[test]
    fn missing_table_is_parse_error() {
        let err = parse_index_profile("<html><body></body></html>", 5, NumberFormat::Romanian).unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn short_row_is_parse_error() {
        let html = r#"<table id="gvC"><tbody><tr><td>TLV</td><td>BT</td></tr></tbody></table>"#;
        let err = parse_index_profile(html, 5, NumberFormat::Romanian).unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref message, .. } if message.contains("cells")));
    }

    #[test]
    fn bad_weight_is_parse_error() {
        let html = r#"<table id="gvC"><tbody><tr><td>TLV</td><td>BT</td><td>100</td>
            <td>1</td><td>1</td><td>1</td><td>1</td><td>n/a</td></tr></tbody></table>"#;
        let err = parse_index_profile(html, 5, NumberFormat::Romanian).unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref message, .. } if message.contains("weight")));
    }

    #[test]
    fn provider_name() {
        assert_eq!(BvbIndexProvider::new().name(), "BVB Indices");
    }
}

// ═══════════════════════════════════════════════════════════════════
// BVB instrument details
// ═══════════════════════════════════════════════════════════════════

mod bvb_details {
    use super::*;

    #[test]
    fn parses_trading_panel_and_indicators() {
        let quote = parse_symbol_details(DETAILS_HTML).unwrap();
        assert_eq!(quote.buy_price, 25.4);
        assert_eq!(quote.variation, -1.25);
        assert_eq!(quote.open_price, 25.7);
        assert_eq!(quote.max_price, 25.8);
        assert_eq!(quote.min_price, 25.1);
        assert_eq!(quote.medium_price, 25.3512);
        assert_eq!(quote.volume, 1_234_567);
        assert_eq!(quote.dividend_yield, 4.52);
    }

    #[test]
    fn missing_last_price_is_error() {
        let html = r#"<div id="ctl00_body_upd"><table>
            <tr><td>Pret mediu</td><td>1,00</td></tr></table></div>"#;
        let err = parse_symbol_details(html).unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn optional_fields_default_to_zero() {
        let html = r#"<div id="ctl00_body_upd"><table>
            <tr><td>Ultimul pret</td><td>2,50</td></tr>
            <tr><td>Pret mediu</td><td>-</td></tr></table></div>"#;
        let quote = parse_symbol_details(html).unwrap();
        assert_eq!(quote.buy_price, 2.5);
        assert_eq!(quote.medium_price, 0.0);
        assert_eq!(quote.dividend_yield, 0.0);
        assert_eq!(quote.volume, 0);
    }

    #[test]
    fn provider_name() {
        assert_eq!(BvbDetailsProvider::new().name(), "BVB Details");
    }
}

// ═══════════════════════════════════════════════════════════════════
// Tradeville
// ═══════════════════════════════════════════════════════════════════

mod tradeville {
    use super::*;

    #[test]
    fn parses_first_quotation_block() {
        let quote = parse_quotation_table(TRADEVILLE_HTML).unwrap();
        assert_eq!(quote.buy_price, 25.4);
        assert_eq!(quote.variation, -1.25);
        assert_eq!(quote.open_price, 25.7);
        assert_eq!(quote.max_price, 25.8);
        assert_eq!(quote.min_price, 25.1);
        assert_eq!(quote.medium_price, 25.35);
        assert_eq!(quote.volume, 1_234_567);
    }

    #[test]
    fn not_available_yield_is_zero() {
        let quote = parse_quotation_table(TRADEVILLE_HTML).unwrap();
        assert_eq!(quote.dividend_yield, 0.0);
    }

    #[test]
    fn numeric_yield_is_parsed() {
        let html = TRADEVILLE_HTML.replace("<span>n/a</span>", "<span>7.10%</span>");
        let quote = parse_quotation_table(&html).unwrap();
        assert_eq!(quote.dividend_yield, 7.1);
    }

    #[test]
    fn missing_block_is_error() {
        let err = parse_quotation_table("<html></html>").unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
    }

    #[test]
    fn too_few_cells_is_error() {
        let html = r#"<div class="quotationTblLarge"><span>a</span><span>1</span></div>"#;
        let err = parse_quotation_table(html).unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref message, .. } if message.contains("12")));
    }

    #[test]
    fn malformed_max_min_is_error() {
        let html = TRADEVILLE_HTML.replace("25.80/25.10", "25.80");
        let err = parse_quotation_table(&html).unwrap_err();
        assert!(matches!(err, CoreError::Parse { ref message, .. } if message.contains("max/min")));
    }

    #[test]
    fn provider_name() {
        assert_eq!(TradevilleProvider::new().name(), "Tradeville");
    }
}

// ═══════════════════════════════════════════════════════════════════
// QuoteSourceRegistry
// ═══════════════════════════════════════════════════════════════════

mod registry {
    use super::*;

    #[test]
    fn new_is_empty() {
        let registry = QuoteSourceRegistry::new();
        assert!(registry.is_empty());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn defaults_in_priority_order() {
        let registry = QuoteSourceRegistry::new_with_defaults();
        assert_eq!(registry.source_names(), vec!["BVB Details", "Tradeville"]);
    }

    #[tokio::test]
    async fn empty_registry_has_no_provider() {
        let registry = QuoteSourceRegistry::new();
        let err = registry.fetch_quote("TLV").await.unwrap_err();
        assert!(matches!(err, CoreError::NoProvider(_)));
    }

    #[tokio::test]
    async fn first_success_wins() {
        let (first, first_calls) = MockQuoteSource::new("First", 10.0);
        let (second, second_calls) = MockQuoteSource::new("Second", 20.0);
        let mut registry = QuoteSourceRegistry::new();
        registry.register(Box::new(first));
        registry.register(Box::new(second));

        let quote = registry.fetch_quote("TLV").await.unwrap();
        assert_eq!(quote.buy_price, 10.0);
        assert_eq!(first_calls.load(Ordering::SeqCst), 1);
        assert_eq!(second_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_on_failure() {
        let (backup, backup_calls) = MockQuoteSource::new("Backup", 20.0);
        let mut registry = QuoteSourceRegistry::new();
        registry.register(Box::new(FailingQuoteSource { name: "Broken".into() }));
        registry.register(Box::new(backup));

        let quote = registry.fetch_quote("TLV").await.unwrap();
        assert_eq!(quote.buy_price, 20.0);
        assert_eq!(backup_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn all_failing_returns_last_error() {
        let mut registry = QuoteSourceRegistry::new();
        registry.register(Box::new(FailingQuoteSource { name: "A".into() }));
        registry.register(Box::new(FailingQuoteSource { name: "B".into() }));

        let err = registry.fetch_quote("TLV").await.unwrap_err();
        assert!(matches!(err, CoreError::Api { ref provider, .. } if provider == "B"));
    }
}
