use bet_etf_core::errors::CoreError;
use bet_etf_core::models::settings::Settings;
use bet_etf_core::models::snapshot::SymbolSnapshot;
use bet_etf_core::services::collector_service::CollectorService;
use std::future::Future;
use std::time::Duration;
use tracing::{error, info};

/// `bet-etf collect`: one run, or a run every `collect_interval_secs` with `--watch`.
pub async fn run(settings: &Settings, watch: bool) -> Result<(), CoreError> {
    let collector = CollectorService::with_defaults();

    if !watch {
        let snapshot = collector
            .collect_to_file(settings.symbols_list_size, &settings.data_file)
            .await?;
        println!(
            "Collected {} symbols (total weight {:.2}%) into {}",
            snapshot.len(),
            snapshot.total_weight(),
            settings.data_file.display()
        );
        return Ok(());
    }

    watch_loop(&collector, settings, |_| async {}).await;
    Ok(())
}

/// Collect forever. Successful snapshots are saved and handed to `on_update`;
/// failed runs are logged and leave the stored file as it was.
pub async fn watch_loop<F, Fut>(collector: &CollectorService, settings: &Settings, mut on_update: F)
where
    F: FnMut(SymbolSnapshot) -> Fut,
    Fut: Future<Output = ()>,
{
    let period = Duration::from_secs(settings.collect_interval_secs.max(1));
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(
        interval_secs = period.as_secs(),
        path = %settings.data_file.display(),
        "Collector loop started"
    );

    loop {
        ticker.tick().await;
        match collector
            .collect_to_file(settings.symbols_list_size, &settings.data_file)
            .await
        {
            Ok(snapshot) => on_update(snapshot).await,
            Err(e) => error!(error = %e, "Collector run failed, keeping previous data"),
        }
    }
}
