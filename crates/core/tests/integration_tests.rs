use std::path::Path;

use bet_etf_core::errors::CoreError;
use bet_etf_core::models::order::FeeSchedule;
use bet_etf_core::models::settings::Settings;
use bet_etf_core::models::snapshot::SymbolSnapshot;
use bet_etf_core::models::symbol::SymbolRecord;
use bet_etf_core::storage::manager::StorageManager;
use bet_etf_core::EtfCalculator;

const DATA: &str = r#"[
  {"date": "2024-03-01 17:45:02"},
  {"symbol": "TLV", "weight": 19.87, "buy_price": 25.4, "company": "BANCA TRANSILVANIA S.A."},
  {"symbol": "SNP", "weight": 18.12, "buy_price": 0.578, "company": "OMV PETROM S.A."},
  {"symbol": "H2O", "weight": 14.02, "buy_price": 120.0, "company": "HIDROELECTRICA S.A."},
  {"symbol": "SNG", "weight": 10.11, "buy_price": 45.3, "company": "ROMGAZ S.A."}
]"#;

fn settings_for(path: &Path) -> Settings {
    Settings {
        data_file: path.to_path_buf(),
        symbols_list_size: 3,
        ..Settings::default()
    }
}

async fn loaded() -> (tempfile::TempDir, EtfCalculator) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("symbols-data.json");
    std::fs::write(&path, DATA).unwrap();
    let calculator = EtfCalculator::load(settings_for(&path)).await.unwrap();
    (dir, calculator)
}

// ═══════════════════════════════════════════════════════════════════
// Loading
// ═══════════════════════════════════════════════════════════════════

mod loading {
    use super::*;

    #[tokio::test]
    async fn load_reads_data_file() {
        let (_dir, calculator) = loaded().await;
        assert_eq!(calculator.snapshot().len(), 4);
        assert_eq!(
            calculator.updated_at_label(),
            "The prices have been updated at 2024-03-01 17:45:02."
        );
    }

    #[tokio::test]
    async fn load_missing_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = EtfCalculator::load(settings_for(&dir.path().join("absent.json")))
            .await
            .unwrap_err();
        assert!(matches!(err, CoreError::FileIO(_)));
    }

    #[test]
    fn load_from_bytes() {
        let calculator = EtfCalculator::load_from_bytes(DATA.as_bytes(), Settings::default()).unwrap();
        assert_eq!(calculator.snapshot().len(), 4);
    }

    #[test]
    fn label_empty_without_timestamp() {
        let calculator = EtfCalculator::new(SymbolSnapshot::default(), Settings::default());
        assert_eq!(calculator.updated_at_label(), "");
    }

    #[tokio::test]
    async fn replaced_snapshot_round_trips_through_storage() {
        let (dir, mut calculator) = loaded().await;
        calculator.replace_snapshot(SymbolSnapshot::new(vec![SymbolRecord::priced("BRD", 7.65, 17.9)]));

        let out = dir.path().join("copy.json");
        StorageManager::save_to_file(calculator.snapshot(), &out).await.unwrap();
        let copy = EtfCalculator::load(settings_for(&out)).await.unwrap();
        assert_eq!(copy.snapshot().symbols[0].symbol, "BRD");
        assert!(copy.snapshot().updated_at.is_some());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Symbol lookup
// ═══════════════════════════════════════════════════════════════════

mod lookup {
    use super::*;

    #[tokio::test]
    async fn finds_symbol_case_insensitively() {
        let (_dir, calculator) = loaded().await;
        let record = calculator.symbol("snp").unwrap();
        assert_eq!(record.symbol, "SNP");
        assert_eq!(record.buy_price, 0.578);
    }

    #[tokio::test]
    async fn lookup_covers_whole_snapshot() {
        let (_dir, calculator) = loaded().await;
        assert!(calculator.symbols(None).iter().all(|s| s.symbol != "SNG"));
        assert_eq!(calculator.symbol("SNG").unwrap().weight, 10.11);
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_found() {
        let (_dir, calculator) = loaded().await;
        let err = calculator.symbol("xyz").unwrap_err();
        assert!(matches!(err, CoreError::SymbolNotFound(ref s) if s == "XYZ"));
    }
}

// ═══════════════════════════════════════════════════════════════════
// Symbol list size
// ═══════════════════════════════════════════════════════════════════

mod list_size {
    use super::*;

    #[tokio::test]
    async fn defaults_to_configured_size() {
        let (_dir, calculator) = loaded().await;
        let symbols: Vec<&str> = calculator.symbols(None).iter().map(|s| s.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TLV", "SNP", "H2O"]);
    }

    #[tokio::test]
    async fn explicit_size_wins() {
        let (_dir, calculator) = loaded().await;
        assert_eq!(calculator.symbols(Some(1)).len(), 1);
        assert_eq!(calculator.symbols(Some(50)).len(), 4);
    }
}

// ═══════════════════════════════════════════════════════════════════
// Calculations
// ═══════════════════════════════════════════════════════════════════

mod calculations {
    use super::*;

    #[tokio::test]
    async fn allocate_uses_first_symbols() {
        let (_dir, calculator) = loaded().await;
        let allocation = calculator.allocate(10_000.0, Some(2)).unwrap();

        assert_eq!(allocation.lines.len(), 2);
        assert!(allocation.get("H2O").is_none());
        assert!(allocation.invested() <= 10_000.0);
        assert!(allocation.cash_left() < 25.4 + 0.578);
    }

    #[tokio::test]
    async fn default_request_uses_settings() {
        let (_dir, calculator) = loaded().await;
        let request = calculator.default_order_request();
        assert_eq!(request.invest_amount, 10_000.0);
        assert_eq!(request.fees, FeeSchedule::default());
        assert!(request.holdings.is_empty());
    }

    #[tokio::test]
    async fn plan_orders_over_list() {
        let (_dir, calculator) = loaded().await;
        let request = calculator.default_order_request().with_holding("tlv", 100.0);
        let plan = calculator.plan_orders(&request, None).unwrap();

        assert_eq!(plan.orders.len(), 3);
        assert_eq!(plan.actual_portfolio, 2540.0);
        assert!(plan.invested() <= 10_000.0);
        assert!(plan.placed().all(|o| o.order_value > 310.0));
    }

    #[test]
    fn empty_snapshot_plans_nothing() {
        let calculator = EtfCalculator::new(SymbolSnapshot::default(), Settings::default());
        let plan = calculator
            .plan_orders(&calculator.default_order_request(), None)
            .unwrap();
        assert!(plan.orders.is_empty());
        assert_eq!(plan.cash_left(), 10_000.0);
    }
}
