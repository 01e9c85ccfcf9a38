use crate::config::IngestConfig;
use crate::error::{IngestError, Result};
use crate::pipeline::{FeedPipeline, FileReport};
use crate::registry::ReadyRegistry;
use crate::scanner::sweep_existing;
use crate::stabilize::StabilizationTracker;
use crate::watcher::{spawn_fs_watcher, WatchEvent};
use feedlens_parser::FeedFileMatcher;
use notify::RecommendedWatcher;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{broadcast, mpsc, watch};

/// Observable state of the running service.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ServiceHealth {
    pub files_processed: u64,
    pub last_file: Option<String>,
    pub last_error: Option<String>,
    pub last_duration_ms: Option<u64>,
    pub tracking: usize,
    pub ready: usize,
    pub processing: bool,
}

enum ServiceCommand {
    /// Run a scheduler tick now instead of waiting for the interval.
    Tick,
    Shutdown,
}

/// Handle to the background ingestion service.
///
/// One control loop owns stabilization bookkeeping and file processing;
/// the watcher callback thread only feeds events into a channel. Dropping
/// the last handle shuts the loop down.
#[derive(Clone)]
pub struct FeedService {
    inner: Arc<FeedServiceInner>,
}

struct FeedServiceInner {
    command_tx: mpsc::Sender<ServiceCommand>,
    report_tx: broadcast::Sender<FileReport>,
    // Held for the sender's lifetime: a watch sender with no live receiver
    // drops updates, so snapshots would read the initial value forever.
    health_rx: watch::Receiver<ServiceHealth>,
    _watcher: std::sync::Mutex<Option<RecommendedWatcher>>,
}

impl FeedService {
    /// Start watching and scheduling. The one fatal failure is an
    /// unopenable watch directory; everything after startup degrades
    /// per file or per message type.
    pub fn start(config: IngestConfig, pipeline: FeedPipeline) -> Result<Self> {
        let matcher = FeedFileMatcher::new(&config.file_pattern)?;

        let (event_tx, event_rx) = mpsc::channel(1024);
        let (command_tx, command_rx) = mpsc::channel(16);
        let (health_tx, health_rx) = watch::channel(ServiceHealth::default());
        let (report_tx, _) = broadcast::channel(32);

        let watcher = spawn_fs_watcher(&config.input_dir, matcher.clone(), event_tx)?;

        let tracker = Arc::new(StabilizationTracker::new(config.stabilization_delay));
        let registry = Arc::new(ReadyRegistry::new());

        // Files already sitting in the directory start their episodes now.
        let now = Instant::now();
        for path in sweep_existing(&config.input_dir, &matcher) {
            tracker.observe(&path, now);
        }

        spawn_control_loop(
            config,
            pipeline,
            tracker,
            registry,
            event_rx,
            command_rx,
            report_tx.clone(),
            health_tx,
        );

        Ok(Self {
            inner: Arc::new(FeedServiceInner {
                command_tx,
                report_tx,
                health_rx,
                _watcher: std::sync::Mutex::new(Some(watcher)),
            }),
        })
    }

    /// Force a scheduler tick without waiting for the check interval.
    pub async fn trigger(&self) -> Result<()> {
        self.inner
            .command_tx
            .send(ServiceCommand::Tick)
            .await
            .map_err(|e| IngestError::Other(format!("failed to send tick: {e}")))
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.inner
            .command_tx
            .send(ServiceCommand::Shutdown)
            .await
            .map_err(|e| IngestError::Other(format!("failed to send shutdown: {e}")))
    }

    #[must_use]
    pub fn subscribe_reports(&self) -> broadcast::Receiver<FileReport> {
        self.inner.report_tx.subscribe()
    }

    #[must_use]
    pub fn health_snapshot(&self) -> ServiceHealth {
        self.inner.health_rx.borrow().clone()
    }

    #[must_use]
    pub fn health_stream(&self) -> watch::Receiver<ServiceHealth> {
        self.inner.health_rx.clone()
    }
}

impl Drop for FeedService {
    fn drop(&mut self) {
        if Arc::strong_count(&self.inner) == 1 {
            let _ = self.inner.command_tx.try_send(ServiceCommand::Shutdown);
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn spawn_control_loop(
    config: IngestConfig,
    pipeline: FeedPipeline,
    tracker: Arc<StabilizationTracker>,
    registry: Arc<ReadyRegistry>,
    mut event_rx: mpsc::Receiver<WatchEvent>,
    mut command_rx: mpsc::Receiver<ServiceCommand>,
    report_tx: broadcast::Sender<FileReport>,
    health_tx: watch::Sender<ServiceHealth>,
) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(config.check_interval);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        let mut health = ServiceHealth::default();

        loop {
            tokio::select! {
                Some(event) = event_rx.recv() => {
                    tracker.observe(&event.path, Instant::now());
                    health.tracking = tracker.tracked_count();
                    let _ = health_tx.send(health.clone());
                }
                Some(cmd) = command_rx.recv() => {
                    match cmd {
                        ServiceCommand::Tick => {
                            run_tick(&pipeline, &tracker, &registry, &report_tx, &health_tx, &mut health)
                                .await;
                        }
                        ServiceCommand::Shutdown => {
                            log::info!("Feed service shutting down");
                            break;
                        }
                    }
                }
                _ = interval.tick() => {
                    run_tick(&pipeline, &tracker, &registry, &report_tx, &health_tx, &mut health)
                        .await;
                }
            }
        }
    });
}

async fn run_tick(
    pipeline: &FeedPipeline,
    tracker: &StabilizationTracker,
    registry: &ReadyRegistry,
    report_tx: &broadcast::Sender<FileReport>,
    health_tx: &watch::Sender<ServiceHealth>,
    health: &mut ServiceHealth,
) {
    let now = Instant::now();
    for path in tracker.tick(now) {
        registry.register(&path, now);
    }
    health.tracking = tracker.tracked_count();
    health.ready = registry.len();
    let _ = health_tx.send(health.clone());

    // Files are processed one at a time, synchronously per path; only the
    // per-msgType inference inside the pipeline fans out.
    for path in registry.claim_all() {
        health.processing = true;
        health.ready = registry.len();
        let _ = health_tx.send(health.clone());

        match pipeline.process_file(&path).await {
            Ok(report) => {
                health.files_processed += 1;
                health.last_file = Some(path.display().to_string());
                health.last_duration_ms = Some(report.duration_ms);
                health.last_error = None;
                let _ = report_tx.send(report);
            }
            Err(err) => {
                // Per-file degradation: log, record, move on.
                log::error!("Failed to process {}: {err}", path.display());
                health.last_error = Some(err.to_string());
            }
        }
        health.processing = false;
        let _ = health_tx.send(health.clone());
    }
}
