use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use crate::api::DataSourceClient;
use crate::catalog::{Instrument, InstrumentCatalog};
use crate::models::{build_comparison_set, ComparisonRecord};

/// The latest published comparison set. Always replaced whole.
pub type ComparisonSet = Arc<Vec<ComparisonRecord>>;

pub const MIN_INTERVAL_SECS: u64 = 1;

// Everything a cycle task needs, detached from the scheduler so that
// stopping the timer leaves running cycles alone.
#[derive(Clone)]
struct CycleContext {
    client: Arc<dyn DataSourceClient>,
    instruments: Arc<Vec<Instrument>>,
    publisher: Arc<watch::Sender<ComparisonSet>>,
    cycles: Arc<AtomicU64>,
}

impl CycleContext {
    fn launch(&self) -> JoinHandle<()> {
        let cycle = self.cycles.fetch_add(1, Ordering::SeqCst) + 1;
        let ctx = self.clone();

        tokio::spawn(async move {
            log::debug!("Refresh cycle {} started", cycle);
            let records = build_comparison_set(ctx.client.as_ref(), &ctx.instruments).await;
            log::debug!("Refresh cycle {} publishing {} records", cycle, records.len());

            // Whichever cycle resolves last wins, even if it started earlier
            ctx.publisher.send_replace(Arc::new(records));
        })
    }
}

/// Re-runs the comparison aggregation on a fixed cadence and publishes each result.
///
/// At most one timer is armed per scheduler. Must be used from within a tokio runtime.
pub struct RefreshScheduler {
    ctx: CycleContext,
    timer: Option<JoinHandle<()>>,
    interval: Option<Duration>,
}

impl RefreshScheduler {
    pub fn new(client: Arc<dyn DataSourceClient>, catalog: &InstrumentCatalog) -> Self {
        let (publisher, _) = watch::channel(Arc::new(Vec::new()));

        RefreshScheduler {
            ctx: CycleContext {
                client,
                instruments: Arc::new(catalog.list().to_vec()),
                publisher: Arc::new(publisher),
                cycles: Arc::new(AtomicU64::new(0)),
            },
            timer: None,
            interval: None,
        }
    }

    /// Arms the timer, disarming any previous one first. The first cycle runs
    /// one interval from now.
    pub fn start(&mut self, interval_secs: u64) {
        self.stop();

        if interval_secs < MIN_INTERVAL_SECS {
            log::warn!(
                "Refresh interval of {}s is too short, using {}s",
                interval_secs,
                MIN_INTERVAL_SECS
            );
        }
        let period = Duration::from_secs(interval_secs.max(MIN_INTERVAL_SECS));

        let ctx = self.ctx.clone();
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                let _ = ctx.launch();
            }
        });

        log::info!("Auto-refresh every {}s", period.as_secs());
        self.timer = Some(handle);
        self.interval = Some(period);
    }

    /// Disarms the timer. A cycle already in flight still completes and publishes.
    pub fn stop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
            log::info!("Auto-refresh stopped");
        }
        self.interval = None;
    }

    /// Runs one cycle right away, independent of the timer.
    pub fn refresh_now(&self) -> JoinHandle<()> {
        self.ctx.launch()
    }

    pub fn subscribe(&self) -> watch::Receiver<ComparisonSet> {
        self.ctx.publisher.subscribe()
    }

    pub fn current(&self) -> ComparisonSet {
        self.ctx.publisher.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.timer.as_ref().map_or(false, |h| !h.is_finished())
    }

    pub fn interval(&self) -> Option<Duration> {
        self.interval
    }

    pub fn cycles_started(&self) -> u64 {
        self.ctx.cycles.load(Ordering::SeqCst)
    }
}

impl Drop for RefreshScheduler {
    fn drop(&mut self) {
        if let Some(handle) = self.timer.take() {
            handle.abort();
        }
    }
}
