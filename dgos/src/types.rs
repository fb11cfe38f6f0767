//! Normalized snapshot model. Everything here is produced by `normalize` and
//! treated as immutable once built; a new tick replaces it wholesale.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Identifier of a monitored agent (the key of the multi-agent payload).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreUsage {
    pub core: u32,
    pub usage: f64,
}

// seconds since boot, per core
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CoreTimes {
    pub core: u32,
    pub user: f64,
    pub system: f64,
    pub idle: f64,
    pub iowait: f64,
    pub irq: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LoadAverage {
    pub one_min: f64,
    pub five_min: f64,
    pub fifteen_min: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuInfo {
    pub physical_cores: u64,
    pub logical_cores: u64,
    pub process_count: u64,
    pub thread_count: u64,
}

/// CPU section. `cores` and `times` are sorted ascending by core index and
/// the indices form a dense `0..n` range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CpuMetrics {
    pub cores: Vec<CoreUsage>,
    pub times: Vec<CoreTimes>,
    pub load: LoadAverage,
    pub info: CpuInfo,
}

impl CpuMetrics {
    /// Mean usage across cores, 0.0 when the agent reported none.
    pub fn average_usage(&self) -> f64 {
        if self.cores.is_empty() {
            return 0.0;
        }
        self.cores.iter().map(|c| c.usage).sum::<f64>() / self.cores.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VirtualMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub cached: u64,
    pub available: u64,
    pub usage: f64,
}

// agents do not report cached/available for swap
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SwapMemory {
    pub total: u64,
    pub used: u64,
    pub free: u64,
    pub usage: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemoryMetrics {
    #[serde(rename = "virtual")]
    pub virtual_mem: VirtualMemory,
    pub swap: SwapMemory,
}

// cumulative counters since agent boot; the client diffs them for rates
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskIo {
    pub read_count: u64,
    pub write_count: u64,
    pub read_bytes: u64,
    pub write_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiskMetrics {
    pub total: u64,
    pub free: u64,
    pub usage: f64,
    pub io: DiskIo,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AgentMetrics {
    pub hostname: String,
    pub cpu: CpuMetrics,
    pub memory: MemoryMetrics,
    pub disk: DiskMetrics,
    /// Time the agent stamped on its report, when it sent one.
    pub reported_at: Option<DateTime<Utc>>,
}

/// One retrieval's full payload, keyed by agent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub timestamp: DateTime<Utc>,
    pub agents: BTreeMap<AgentId, AgentMetrics>,
}

impl Snapshot {
    pub fn agent_ids(&self) -> impl Iterator<Item = &AgentId> {
        self.agents.keys()
    }

    pub fn get(&self, id: &AgentId) -> Option<&AgentMetrics> {
        self.agents.get(id)
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Copy of this snapshot holding only `id`, or `None` if the agent is absent.
    pub fn restricted_to(&self, id: &AgentId) -> Option<Snapshot> {
        let metrics = self.agents.get(id)?;
        Some(Snapshot {
            timestamp: self.timestamp,
            agents: BTreeMap::from([(id.clone(), metrics.clone())]),
        })
    }
}
