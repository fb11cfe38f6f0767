//! Bounded per-agent history for the trend charts.

use std::collections::{HashMap, VecDeque};
use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::types::{AgentId, AgentMetrics, Snapshot};

/// Samples kept per (agent, channel). Fixed so memory stays bounded no matter
/// how long the session runs.
pub const HISTORY_CAPACITY: usize = 20;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

/// A tracked time series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    ReadBytes,
    WriteBytes,
}

impl Channel {
    pub const TRACKED: [Channel; 2] = [Channel::ReadBytes, Channel::WriteBytes];

    /// Current value of this channel in an agent's metrics.
    pub fn value(self, m: &AgentMetrics) -> u64 {
        match self {
            Channel::ReadBytes => m.disk.io.read_bytes,
            Channel::WriteBytes => m.disk.io.write_bytes,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::ReadBytes => "read",
            Channel::WriteBytes => "write",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HistorySample {
    pub timestamp: DateTime<Utc>,
    pub value: u64,
}

/// Chronological ring of at most [`HISTORY_CAPACITY`] samples.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryBuffer {
    samples: VecDeque<HistorySample>,
}

impl Default for HistoryBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryBuffer {
    pub fn new() -> Self {
        Self {
            samples: VecDeque::with_capacity(HISTORY_CAPACITY),
        }
    }

    pub fn push(&mut self, sample: HistorySample) {
        push_capped(&mut self.samples, sample, HISTORY_CAPACITY);
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn latest(&self) -> Option<&HistorySample> {
        self.samples.back()
    }

    /// Oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &HistorySample> {
        self.samples.iter()
    }

    pub fn to_vec(&self) -> Vec<HistorySample> {
        self.samples.iter().copied().collect()
    }

    /// Per-second deltas between consecutive samples. A counter that went
    /// backwards (agent restart) yields 0 for that step.
    pub fn rates(&self) -> Vec<f64> {
        rates(&self.to_vec())
    }
}

/// Same as [`HistoryBuffer::rates`], over an already-copied series.
pub fn rates(samples: &[HistorySample]) -> Vec<f64> {
    samples
        .windows(2)
        .map(|w| {
            let dt = (w[1].timestamp - w[0].timestamp).num_milliseconds() as f64 / 1000.0;
            if dt <= 0.0 {
                return 0.0;
            }
            w[1].value.saturating_sub(w[0].value) as f64 / dt
        })
        .collect()
}

/// One buffer per (agent, channel), created on first observation and kept for
/// the rest of the session.
#[derive(Debug, Default, Clone)]
pub struct HistoryStore {
    buffers: HashMap<(AgentId, Channel), HistoryBuffer>,
}

impl HistoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(
        &mut self,
        agent: &AgentId,
        channel: Channel,
        timestamp: DateTime<Utc>,
        value: u64,
    ) {
        self.buffers
            .entry((agent.clone(), channel))
            .or_default()
            .push(HistorySample { timestamp, value });
    }

    /// Oldest-first copy of the series; empty if never observed.
    pub fn read(&self, agent: &AgentId, channel: Channel) -> Vec<HistorySample> {
        self.buffers
            .get(&(agent.clone(), channel))
            .map(HistoryBuffer::to_vec)
            .unwrap_or_default()
    }

    pub fn buffer(&self, agent: &AgentId, channel: Channel) -> Option<&HistoryBuffer> {
        self.buffers.get(&(agent.clone(), channel))
    }

    /// Appends every tracked channel for every agent in `snapshot`.
    pub fn record(&mut self, snapshot: &Snapshot) {
        for (id, metrics) in &snapshot.agents {
            for channel in Channel::TRACKED {
                self.append(id, channel, snapshot.timestamp, channel.value(metrics));
            }
        }
    }

    pub fn series(&self) -> impl Iterator<Item = (&AgentId, Channel, &HistoryBuffer)> {
        self.buffers.iter().map(|((id, ch), buf)| (id, *ch, buf))
    }
}
