//! Dashboard state: the single writer of the registry, the history buffers and
//! the published model.
//!
//! Each tick moves `Idle -> Fetching -> Applied | Skipped`. An applied tick
//! builds a brand new [`DashboardModel`] and swaps it in with one
//! `watch::Sender::send_replace`, so readers see either the old model or the
//! new one. A skipped tick leaves the model untouched and only updates the
//! separate [`TickStatus`].

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::watch;
use tracing::debug;

use crate::error::{ErrorReporter, SyncError};
use crate::fetch::RawSnapshot;
use crate::history::{Channel, HistorySample, HistoryStore};
use crate::normalize::normalize;
use crate::registry::{AgentRegistry, Selection};
use crate::types::{AgentId, AgentMetrics, Snapshot};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TickState {
    #[default]
    Idle,
    Fetching,
    Applied,
    Skipped,
}

/// What the view reads. Immutable; replaced wholesale on every change.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardModel {
    /// Latest successfully normalized snapshot.
    pub snapshot: Option<Arc<Snapshot>>,
    /// `snapshot` projected through the selection.
    pub view: Option<Arc<Snapshot>>,
    pub selection: Selection,
    pub agents: Vec<AgentId>,
    pub history: BTreeMap<(AgentId, Channel), Vec<HistorySample>>,
}

impl DashboardModel {
    pub fn history(&self, agent: &AgentId, channel: Channel) -> &[HistorySample] {
        self.history
            .get(&(agent.clone(), channel))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// The agent the detail panes show: the selected one, else the first in view.
    pub fn focus(&self) -> Option<(&AgentId, &AgentMetrics)> {
        self.view.as_deref()?.agents.iter().next()
    }
}

/// Tick bookkeeping, published beside the model.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TickStatus {
    pub state: TickState,
    pub ticks: u64,
    pub applied: u64,
    pub skipped: u64,
    pub last_error: Option<SyncError>,
    pub last_applied_at: Option<DateTime<Utc>>,
}

pub struct Dashboard {
    registry: AgentRegistry,
    history: HistoryStore,
    current: Option<Arc<Snapshot>>,
    model_tx: watch::Sender<Arc<DashboardModel>>,
    status_tx: watch::Sender<TickStatus>,
    reporter: Arc<dyn ErrorReporter>,
}

impl Dashboard {
    pub fn new(reporter: Arc<dyn ErrorReporter>) -> Self {
        let (model_tx, _) = watch::channel(Arc::new(DashboardModel::default()));
        let (status_tx, _) = watch::channel(TickStatus::default());
        Self {
            registry: AgentRegistry::new(),
            history: HistoryStore::new(),
            current: None,
            model_tx,
            status_tx,
            reporter,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<DashboardModel>> {
        self.model_tx.subscribe()
    }

    pub fn subscribe_status(&self) -> watch::Receiver<TickStatus> {
        self.status_tx.subscribe()
    }

    pub fn model(&self) -> Arc<DashboardModel> {
        self.model_tx.borrow().clone()
    }

    pub fn status(&self) -> TickStatus {
        self.status_tx.borrow().clone()
    }

    pub fn registry(&self) -> &AgentRegistry {
        &self.registry
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    pub fn begin_tick(&mut self) {
        self.status_tx.send_modify(|s| {
            s.state = TickState::Fetching;
            s.ticks += 1;
        });
    }

    /// Normalizes a fetch result and applies or skips it.
    pub fn complete_tick(&mut self, fetched: Result<RawSnapshot, SyncError>) -> TickState {
        match fetched.and_then(|raw| normalize(&raw)) {
            Ok(snapshot) => {
                self.apply(snapshot);
                TickState::Applied
            }
            Err(e) => {
                self.skip(e);
                TickState::Skipped
            }
        }
    }

    pub fn apply(&mut self, snapshot: Snapshot) {
        let at = snapshot.timestamp;
        self.registry.update(&snapshot);
        self.history.record(&snapshot);
        self.current = Some(Arc::new(snapshot));
        self.publish();
        debug!(agents = self.registry.agents().len(), "tick applied");

        self.status_tx.send_modify(|s| {
            s.state = TickState::Applied;
            s.applied += 1;
            s.last_error = None;
            s.last_applied_at = Some(at);
        });
    }

    pub fn skip(&mut self, err: SyncError) {
        self.reporter.report(&err);
        self.status_tx.send_modify(|s| {
            s.state = TickState::Skipped;
            s.skipped += 1;
            s.last_error = Some(err);
        });
    }

    /// Changes the view filter and republishes. Unknown ids resolve to `All`.
    pub fn select(&mut self, selection: Selection) -> Selection {
        let resolved = self.registry.select(selection).clone();
        self.publish();
        resolved
    }

    fn publish(&self) {
        let view = self
            .current
            .as_deref()
            .map(|snap| Arc::new(self.registry.current_view(snap)));
        let history = self
            .history
            .series()
            .map(|(id, ch, buf)| ((id.clone(), ch), buf.to_vec()))
            .collect();
        let model = DashboardModel {
            snapshot: self.current.clone(),
            view,
            selection: self.registry.selection().clone(),
            agents: self.registry.agents().iter().cloned().collect(),
            history,
        };
        self.model_tx.send_replace(Arc::new(model));
    }
}
