//! Dashboard session: owns one [`Dashboard`] and drives it on a fixed period.
//!
//! Ticks never overlap. The fetch runs on its own task and the loop keeps
//! serving `select` commands while it waits; timer ticks that fire during an
//! outstanding fetch are dropped. Stopping the session cancels the timer and
//! detaches any in-flight fetch, whose result is then ignored.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::dashboard::{Dashboard, DashboardModel, TickStatus};
use crate::error::{ErrorReporter, SyncError};
use crate::fetch::{MetricsSource, RawSnapshot};
use crate::registry::Selection;

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(2000);
pub const MIN_INTERVAL: Duration = Duration::from_millis(250);

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Tick period.
    pub interval: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl SessionConfig {
    pub fn with_interval_ms(ms: u64) -> Self {
        Self {
            interval: Duration::from_millis(ms).max(MIN_INTERVAL),
        }
    }
}

enum Command {
    Select(Selection),
}

type FetchTask = JoinHandle<Result<RawSnapshot, SyncError>>;

/// Handle to a running dashboard. Dropping it tears the session down too.
pub struct DashboardSession {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
    model: watch::Receiver<Arc<DashboardModel>>,
    status: watch::Receiver<TickStatus>,
    source: String,
}

impl DashboardSession {
    /// Spawns the tick loop on the current tokio runtime. The first tick
    /// fires immediately.
    pub fn start<S: MetricsSource>(
        source: S,
        config: SessionConfig,
        reporter: Arc<dyn ErrorReporter>,
    ) -> Self {
        let dashboard = Dashboard::new(reporter);
        let model = dashboard.subscribe();
        let status = dashboard.subscribe_status();
        let description = source.describe();
        let (commands, command_rx) = mpsc::unbounded_channel();
        let (shutdown, shutdown_rx) = oneshot::channel();

        info!(source = %description, interval_ms = config.interval.as_millis() as u64, "dashboard session started");
        let task = tokio::spawn(run_loop(
            Arc::new(source),
            dashboard,
            config.interval,
            command_rx,
            shutdown_rx,
        ));

        Self {
            commands,
            shutdown: Some(shutdown),
            task: Some(task),
            model,
            status,
            source: description,
        }
    }

    /// Latest published model.
    pub fn model(&self) -> Arc<DashboardModel> {
        self.model.borrow().clone()
    }

    pub fn status(&self) -> TickStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardModel>> {
        self.model.clone()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TickStatus> {
        self.status.clone()
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    /// Requests a new view filter; the resolved selection shows up in the next
    /// published model.
    pub fn select(&self, selection: Selection) {
        // loop already gone means the session is stopping
        let _ = self.commands.send(Command::Select(selection));
    }

    /// Cancels the timer and waits for the loop to exit.
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
        info!("dashboard session stopped");
    }
}

impl Drop for DashboardSession {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
    }
}

async fn run_loop<S: MetricsSource>(
    source: Arc<S>,
    mut dashboard: Dashboard,
    period: Duration,
    mut commands: mpsc::UnboundedReceiver<Command>,
    mut shutdown: oneshot::Receiver<()>,
) {
    let mut ticker = interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    let mut in_flight: Option<FetchTask> = None;

    loop {
        tokio::select! {
            _ = &mut shutdown => break,
            Some(cmd) = commands.recv() => match cmd {
                Command::Select(selection) => {
                    let resolved = dashboard.select(selection);
                    debug!(selection = %resolved, "selection changed");
                }
            },
            _ = ticker.tick(), if in_flight.is_none() => {
                dashboard.begin_tick();
                let src = Arc::clone(&source);
                in_flight = Some(tokio::spawn(async move { src.fetch().await }));
            }
            joined = wait_for(&mut in_flight) => {
                in_flight = None;
                let fetched = joined.unwrap_or_else(|e| {
                    Err(SyncError::Transport(format!("fetch task failed: {e}")))
                });
                dashboard.complete_tick(fetched);
            }
        }
    }

    if in_flight.is_some() {
        // left running; its result is dropped with the handle
        debug!("discarding in-flight fetch on teardown");
    }
}

async fn wait_for(slot: &mut Option<FetchTask>) -> Result<Result<RawSnapshot, SyncError>, JoinError> {
    match slot.as_mut() {
        Some(task) => task.await,
        None => std::future::pending().await,
    }
}
