//! Turns a raw JSON payload into a validated [`Snapshot`].
//!
//! Two payload shapes are accepted:
//!
//! * multi-agent: `{ "<agent id>": { "hostname": .., "metrics": { "cpu": .., .. } }, .. }`
//! * single-agent: the metrics object itself, `{ "cpu": .., "memory": .., "disk": .. }`
//!
//! There is no discriminant field; a top-level `cpu` key means single-agent,
//! any other object is read as the multi-agent map. Every required field is
//! checked and every failure names the JSON path that broke. Nothing is
//! defaulted: a missing reading is an error, never a zero.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

use crate::error::SyncError;
use crate::fetch::RawSnapshot;
use crate::types::{
    AgentId, AgentMetrics, CoreTimes, CoreUsage, CpuInfo, CpuMetrics, DiskIo, DiskMetrics,
    LoadAverage, MemoryMetrics, Snapshot, SwapMemory, VirtualMemory,
};

/// Agent id used for the bare single-agent payload.
pub const LOCAL_AGENT: &str = "local";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadShape {
    SingleAgent,
    MultiAgent,
}

pub fn detect_shape(body: &Value) -> Result<PayloadShape, SyncError> {
    match body {
        Value::Object(map) if map.contains_key("cpu") => Ok(PayloadShape::SingleAgent),
        Value::Object(_) => Ok(PayloadShape::MultiAgent),
        other => Err(SyncError::invalid_shape(
            "$",
            format!("expected an object, found {}", type_name(other)),
        )),
    }
}

/// Validates `raw` and builds a snapshot stamped with its fetch time.
/// Any error discards the whole payload.
pub fn normalize(raw: &RawSnapshot) -> Result<Snapshot, SyncError> {
    let root = Node::root(&raw.body)?;
    let mut agents = BTreeMap::new();

    match detect_shape(&raw.body)? {
        PayloadShape::SingleAgent => {
            let hostname = match root.map.get("hostname") {
                Some(_) => root.text("hostname")?,
                None => LOCAL_AGENT.to_string(),
            };
            let reported_at = root.optional_time("time")?;
            let metrics = agent_metrics(&root, hostname, reported_at)?;
            agents.insert(AgentId::new(LOCAL_AGENT), metrics);
        }
        PayloadShape::MultiAgent => {
            for key in root.map.keys() {
                let entry = root.child(key)?;
                let hostname = entry.text("hostname")?;
                let body = entry.child("metrics")?;
                let reported_at = match entry.optional_time("timestamp")? {
                    Some(t) => Some(t),
                    None => body.optional_time("time")?,
                };
                let metrics = agent_metrics(&body, hostname, reported_at)?;
                agents.insert(AgentId::new(key.as_str()), metrics);
            }
        }
    }

    Ok(Snapshot {
        timestamp: raw.fetched_at,
        agents,
    })
}

fn agent_metrics(
    node: &Node<'_>,
    hostname: String,
    reported_at: Option<DateTime<Utc>>,
) -> Result<AgentMetrics, SyncError> {
    Ok(AgentMetrics {
        hostname,
        cpu: cpu_metrics(&node.child("cpu")?)?,
        memory: memory_metrics(&node.child("memory")?)?,
        disk: disk_metrics(&node.child("disk")?)?,
        reported_at,
    })
}

fn cpu_metrics(cpu: &Node<'_>) -> Result<CpuMetrics, SyncError> {
    let load = cpu.child("load")?;
    let info = cpu.child("info")?;
    Ok(CpuMetrics {
        cores: per_core(cpu, "cores", core_usage)?,
        times: per_core(cpu, "times", core_times)?,
        load: LoadAverage {
            one_min: load.number("1m")?,
            five_min: load.number("5m")?,
            fifteen_min: load.number("15m")?,
        },
        info: CpuInfo {
            physical_cores: info.count("physical_cores")?,
            logical_cores: info.count("logical_cores")?,
            process_count: info.count("process_count")?,
            thread_count: info.count("thread_count")?,
        },
    })
}

fn core_usage(core: u32, value: &Value, path: &str) -> Result<CoreUsage, SyncError> {
    // keyed form may carry the bare percentage
    if value.is_number() {
        return Ok(CoreUsage {
            core,
            usage: non_negative(value, path)?,
        });
    }
    let node = Node::at(path.to_string(), value)?;
    Ok(CoreUsage {
        core,
        usage: node.number("usage")?,
    })
}

fn core_times(core: u32, value: &Value, path: &str) -> Result<CoreTimes, SyncError> {
    let node = Node::at(path.to_string(), value)?;
    Ok(CoreTimes {
        core,
        user: node.number("user")?,
        system: node.number("system")?,
        idle: node.number("idle")?,
        iowait: node.number("iowait")?,
        irq: node.number("irq")?,
    })
}

/// Reads a per-core section given either as a list of objects carrying a
/// `core` field or as a map keyed `<prefix><index>`, then sorts by index and
/// checks the indices are exactly `0..n`.
fn per_core<T>(
    parent: &Node<'_>,
    key: &str,
    build: fn(u32, &Value, &str) -> Result<T, SyncError>,
) -> Result<Vec<T>, SyncError>
where
    T: CoreIndexed,
{
    let path = parent.path_of(key);
    let mut items = match parent.field(key)? {
        // the server encodes an empty section as null
        Value::Null => Vec::new(),
        Value::Array(list) => {
            let mut out = Vec::with_capacity(list.len());
            for (i, item) in list.iter().enumerate() {
                let item_path = format!("{path}[{i}]");
                let node = Node::at(item_path.clone(), item)?;
                let core = u32::try_from(node.count("core")?).map_err(|_| {
                    SyncError::invalid_shape(node.path_of("core"), "core index out of range")
                })?;
                out.push(build(core, item, &item_path)?);
            }
            out
        }
        Value::Object(map) => {
            let mut out = Vec::with_capacity(map.len());
            for (k, v) in map {
                let item_path = format!("{path}.{k}");
                let core = core_index(k).ok_or_else(|| {
                    SyncError::invalid_shape(
                        item_path.clone(),
                        format!("key {k:?} does not end in a core index"),
                    )
                })?;
                out.push(build(core, v, &item_path)?);
            }
            out
        }
        other => {
            return Err(SyncError::invalid_shape(
                path,
                format!("expected a list or an object, found {}", type_name(other)),
            ))
        }
    };

    // stable: ties keep arrival order, and ties are rejected right after
    items.sort_by_key(|item| item.core_index());
    for (position, item) in items.iter().enumerate() {
        if item.core_index() as usize != position {
            return Err(SyncError::invalid_shape(
                path,
                format!(
                    "core indices must be unique and dense from 0; found {} at position {position}",
                    item.core_index()
                ),
            ));
        }
    }
    Ok(items)
}

trait CoreIndexed {
    fn core_index(&self) -> u32;
}

impl CoreIndexed for CoreUsage {
    fn core_index(&self) -> u32 {
        self.core
    }
}

impl CoreIndexed for CoreTimes {
    fn core_index(&self) -> u32 {
        self.core
    }
}

/// Extracts the trailing integer of a key such as `cpu12`.
pub fn core_index(key: &str) -> Option<u32> {
    let prefix_len = key.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let digits = &key[prefix_len..];
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

fn memory_metrics(memory: &Node<'_>) -> Result<MemoryMetrics, SyncError> {
    let virt = memory.child("virtual")?;
    let swap = memory.child("swap")?;
    Ok(MemoryMetrics {
        virtual_mem: VirtualMemory {
            total: virt.count("total")?,
            used: virt.count("used")?,
            free: virt.count("free")?,
            cached: virt.count("cached")?,
            available: virt.count("available")?,
            usage: virt.number("usage")?,
        },
        swap: SwapMemory {
            total: swap.count("total")?,
            used: swap.count("used")?,
            free: swap.count("free")?,
            usage: swap.number("usage")?,
        },
    })
}

fn disk_metrics(disk: &Node<'_>) -> Result<DiskMetrics, SyncError> {
    let io = disk.child("io")?;
    Ok(DiskMetrics {
        total: disk.count("total")?,
        free: disk.count("free")?,
        usage: disk.number("usage")?,
        io: DiskIo {
            read_count: io.count("read_count")?,
            write_count: io.count("write_count")?,
            read_bytes: io.count("read_bytes")?,
            write_bytes: io.count("write_bytes")?,
        },
    })
}

/// A JSON object together with its path from the payload root.
struct Node<'a> {
    path: String,
    map: &'a Map<String, Value>,
}

impl<'a> Node<'a> {
    fn root(value: &'a Value) -> Result<Self, SyncError> {
        Self::at("$".to_string(), value)
    }

    fn at(path: String, value: &'a Value) -> Result<Self, SyncError> {
        match value {
            Value::Object(map) => Ok(Self { path, map }),
            other => Err(SyncError::invalid_shape(
                path,
                format!("expected an object, found {}", type_name(other)),
            )),
        }
    }

    fn path_of(&self, key: &str) -> String {
        format!("{}.{key}", self.path)
    }

    fn field(&self, key: &str) -> Result<&'a Value, SyncError> {
        self.map
            .get(key)
            .ok_or_else(|| SyncError::invalid_shape(self.path_of(key), "missing required field"))
    }

    fn child(&self, key: &str) -> Result<Node<'a>, SyncError> {
        Node::at(self.path_of(key), self.field(key)?)
    }

    fn number(&self, key: &str) -> Result<f64, SyncError> {
        non_negative(self.field(key)?, &self.path_of(key))
    }

    fn count(&self, key: &str) -> Result<u64, SyncError> {
        let path = self.path_of(key);
        let value = self.field(key)?;
        if let Some(n) = value.as_u64() {
            return Ok(n);
        }
        let n = non_negative(value, &path)?;
        if n.fract() != 0.0 || n > u64::MAX as f64 {
            return Err(SyncError::invalid_shape(
                path,
                format!("expected a whole number, found {n}"),
            ));
        }
        Ok(n as u64)
    }

    fn text(&self, key: &str) -> Result<String, SyncError> {
        match self.field(key)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(SyncError::invalid_shape(
                self.path_of(key),
                format!("expected a string, found {}", type_name(other)),
            )),
        }
    }

    fn optional_time(&self, key: &str) -> Result<Option<DateTime<Utc>>, SyncError> {
        if !self.map.contains_key(key) {
            return Ok(None);
        }
        let raw = self.text(key)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|t| Some(t.with_timezone(&Utc)))
            .map_err(|e| {
                SyncError::invalid_shape(self.path_of(key), format!("bad RFC 3339 time: {e}"))
            })
    }
}

fn non_negative(value: &Value, path: &str) -> Result<f64, SyncError> {
    let Some(n) = value.as_f64() else {
        return Err(SyncError::invalid_shape(
            path,
            format!("expected a number, found {}", type_name(value)),
        ));
    };
    if !n.is_finite() || n < 0.0 {
        return Err(SyncError::invalid_shape(
            path,
            format!("expected a non-negative number, found {n}"),
        ));
    }
    Ok(n)
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
