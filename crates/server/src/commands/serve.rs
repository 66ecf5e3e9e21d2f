use bet_etf_core::errors::CoreError;
use bet_etf_core::models::settings::Settings;
use bet_etf_core::models::snapshot::SymbolSnapshot;
use bet_etf_core::services::collector_service::CollectorService;
use bet_etf_core::EtfCalculator;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::server::{self, AppState};

/// `bet-etf serve`: dashboard plus an optional in-process collector loop.
pub async fn run(settings: Settings, collect_every: Option<u64>) -> Result<(), CoreError> {
    let port = settings.port;

    let calculator = match EtfCalculator::load(settings.clone()).await {
        Ok(calculator) => {
            info!(
                symbols = calculator.snapshot().len(),
                path = %settings.data_file.display(),
                "Symbols data loaded"
            );
            calculator
        }
        Err(e) => {
            warn!(error = %e, "Failed to load symbols data, starting with an empty table");
            EtfCalculator::new(SymbolSnapshot::default(), settings.clone())
        }
    };

    let shared = Arc::new(RwLock::new(calculator));

    if let Some(secs) = collect_every {
        let mut loop_settings = settings.clone();
        loop_settings.collect_interval_secs = secs;
        let target = shared.clone();
        tokio::spawn(async move {
            let collector = CollectorService::with_defaults();
            super::collect::watch_loop(&collector, &loop_settings, |snapshot| {
                let target = target.clone();
                async move {
                    target.write().await.replace_snapshot(snapshot);
                    info!("Dashboard data replaced by collector run");
                }
            })
            .await;
        });
    }

    server::serve(AppState::new(shared), port).await?;
    Ok(())
}
