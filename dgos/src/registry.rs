//! Known agents and the current view filter.

use std::collections::BTreeSet;
use std::fmt;

use tracing::info;

use crate::types::{AgentId, Snapshot};

/// View filter: every agent, or exactly one.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Agent(AgentId),
}

impl fmt::Display for Selection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Selection::All => f.write_str("all agents"),
            Selection::Agent(id) => write!(f, "{id}"),
        }
    }
}

/// Tracks the agent ids of the latest snapshot and the selection.
///
/// The selection always names `All` or an agent present in the registry.
#[derive(Debug, Default, Clone)]
pub struct AgentRegistry {
    agents: BTreeSet<AgentId>,
    selection: Selection,
}

impl AgentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the known set with the agents of `snapshot`. An agent missing
    /// from the newest snapshot is gone; if it was selected, the selection
    /// falls back to `All`.
    pub fn update(&mut self, snapshot: &Snapshot) -> &BTreeSet<AgentId> {
        self.agents = snapshot.agent_ids().cloned().collect();
        if let Selection::Agent(id) = &self.selection {
            if !self.agents.contains(id) {
                info!(agent = %id, "selected agent left the registry; showing all agents");
                self.selection = Selection::All;
            }
        }
        &self.agents
    }

    /// Sets the selection, silently resolving unknown ids to `All`.
    /// Returns the selection actually in effect.
    pub fn select(&mut self, selection: Selection) -> &Selection {
        self.selection = match selection {
            Selection::Agent(id) if self.agents.contains(&id) => Selection::Agent(id),
            _ => Selection::All,
        };
        &self.selection
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn agents(&self) -> &BTreeSet<AgentId> {
        &self.agents
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.agents.contains(id)
    }

    /// `snapshot` restricted to the selection; the whole snapshot for `All`
    /// or when the selected agent is not in it.
    pub fn current_view(&self, snapshot: &Snapshot) -> Snapshot {
        match &self.selection {
            Selection::Agent(id) => snapshot
                .restricted_to(id)
                .unwrap_or_else(|| snapshot.clone()),
            Selection::All => snapshot.clone(),
        }
    }
}

/// Next (or previous) selection in the cycle `All, a1, a2, .., All`.
pub fn step_selection(agents: &[AgentId], current: &Selection, forward: bool) -> Selection {
    // slot 0 is All, slot i + 1 is agents[i]
    let slots = agents.len() + 1;
    let pos = match current {
        Selection::All => 0,
        Selection::Agent(id) => agents.iter().position(|a| a == id).map_or(0, |i| i + 1),
    };
    let next = if forward {
        (pos + 1) % slots
    } else {
        (pos + slots - 1) % slots
    };
    match next {
        0 => Selection::All,
        i => Selection::Agent(agents[i - 1].clone()),
    }
}
