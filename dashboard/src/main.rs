use stocklib::logging;
use stocklib::models::{
    fetch_snapshots, rank, ComparisonRecord, ComparisonSummary, RiskReport, Selection, SortKey, SortOrder,
};
use stocklib::util::read_settings;
use stocklib::RefreshScheduler;

use std::env;
use std::error::Error;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn log_table(records: &[ComparisonRecord], key: SortKey, order: SortOrder, selection: &Selection) {
    let subset = if selection.is_empty() { None } else { Some(selection) };
    let ranked = rank(records, key, order, subset);

    log::info!(
        "{:<14} {:<34} {:>10} {:>10} {:>8} {:>7} {:>9}",
        "SYMBOL", "NAME", "PRICE", "PREDICTED", "CHANGE%", "ACC%", "SENTIMENT"
    );
    for r in &ranked {
        log::info!(
            "{:<14} {:<34} {:>10.2} {:>10.2} {:>8.2} {:>7.1} {:>9}",
            r.symbol, r.name, r.current_price, r.predicted_price, r.price_change_percent, r.accuracy, r.sentiment
        );
    }
}

fn log_summary(summary: &ComparisonSummary) {
    if let Some(best) = &summary.best_performer {
        log::info!("Best performer: {} ({:+.2}%)", best.name, best.value);
    }
    if let Some(top) = &summary.highest_accuracy {
        log::info!("Highest accuracy: {} ({:.1}%)", top.name, top.value);
    }
    if let Some(top) = &summary.most_expensive {
        log::info!("Most expensive: {} ({:.2})", top.name, top.value);
    }
    if let Some(avg) = summary.average_accuracy {
        log::info!("Average accuracy over {} stocks: {:.1}%", summary.count, avg);
    }
}

fn log_risk(report: &RiskReport) {
    for entry in &report.entries {
        let a = &entry.assessment;
        match (a.score, a.level) {
            (Some(score), Some(level)) => log::info!(
                "[{}] Risk {} ({}) volatility {:.2}% error {:.2}% trend {:.1}%",
                entry.symbol,
                score,
                level,
                a.volatility.unwrap_or(0.0),
                a.prediction_error.unwrap_or(0.0),
                a.trend_consistency.unwrap_or(0.0)
            ),
            _ => log::info!("[{}] Risk not computable", entry.symbol),
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <settings.json>", args[0]);
        std::process::exit(1);
    }

    // Handle SIGINT
    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        r.store(false, Ordering::SeqCst);
    })?;

    let settings = read_settings(&args[1])?;

    logging::configure_logger_with_level(&settings.log_path, logging::parse_level(&settings.log_level))?;

    let catalog = settings.catalog();
    let client = settings.data_source()?;
    let (key, order, selection) = (settings.sort_key(), settings.sort_order(), settings.selection());
    for symbol in settings.unknown_selections(&catalog) {
        log::warn!("Selected symbol {} is not in the catalog", symbol);
    }
    log::info!("Comparing {} stocks...", catalog.len());

    let snapshots = fetch_snapshots(client.as_ref(), catalog.list()).await;
    let records: Vec<ComparisonRecord> = snapshots.iter().filter_map(ComparisonRecord::from_snapshot).collect();
    log_table(&records, key, order, &selection);
    log_summary(&ComparisonSummary::from_records(&records));
    log_risk(&RiskReport::from_snapshots(&snapshots));

    let mut scheduler = RefreshScheduler::new(client, &catalog);
    let mut updates = scheduler.subscribe();
    scheduler.start(settings.refresh_interval);

    while running.load(Ordering::SeqCst) {
        match tokio::time::timeout(Duration::from_millis(500), updates.changed()).await {
            Ok(Ok(())) => {
                let set = updates.borrow_and_update().clone();
                log::info!("Refreshed {} stocks", set.len());
                log_table(&set, key, order, &selection);
                log_summary(&ComparisonSummary::from_records(&set));
            }
            Ok(Err(_)) => break,
            Err(_) => {}
        }
    }

    log::info!("Received SIGINT, stopping auto-refresh and exiting...");
    scheduler.stop();
    Ok(())
}
