//! Payload fixtures shared by the integration tests.
#![allow(dead_code)]

use std::sync::Mutex;

use chrono::{DateTime, Duration, TimeZone, Utc};
use dgos::error::{ErrorReporter, SyncError};
use dgos::fetch::RawSnapshot;
use serde_json::{json, Map, Value};

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn at(secs: i64) -> DateTime<Utc> {
    t0() + Duration::seconds(secs)
}

/// Metrics object with cores keyed in the given order.
pub fn metrics_with_keys(core_keys: &[&str], read_bytes: u64, write_bytes: u64) -> Value {
    let mut cores = Map::new();
    let mut times = Map::new();
    for key in core_keys {
        let idx: f64 = key.trim_start_matches("cpu").parse().unwrap();
        cores.insert(key.to_string(), json!({ "usage": 10.0 + idx }));
        times.insert(
            key.to_string(),
            json!({ "user": 100.0 + idx, "system": 20.0, "idle": 900.0, "iowait": 1.5, "irq": 0.25 }),
        );
    }
    json!({
        "cpu": {
            "cores": cores,
            "times": times,
            "load": { "1m": 0.5, "5m": 0.75, "15m": 1.0 },
            "info": { "physical_cores": 2, "logical_cores": core_keys.len(), "process_count": 120, "thread_count": 800 }
        },
        "memory": {
            "virtual": { "total": 16000, "used": 8000, "free": 8000, "cached": 2000, "available": 9000, "usage": 50.0 },
            "swap": { "total": 4000, "used": 1000, "free": 3000, "usage": 25.0 }
        },
        "disk": {
            "total": 100000, "free": 40000, "usage": 60.0,
            "io": { "read_count": 10, "write_count": 5, "read_bytes": read_bytes, "write_bytes": write_bytes }
        },
        "time": "2024-05-01T11:59:58Z"
    })
}

pub fn metrics(read_bytes: u64, write_bytes: u64) -> Value {
    metrics_with_keys(&["cpu0", "cpu1"], read_bytes, write_bytes)
}

/// Multi-agent payload as served by the metrics server.
pub fn multi(agents: &[(&str, Value)]) -> Value {
    let mut map = Map::new();
    for (id, m) in agents {
        map.insert(
            id.to_string(),
            json!({
                "agent_id": id,
                "hostname": format!("host-{id}"),
                "metrics": m,
                "timestamp": "2024-05-01T11:59:59Z"
            }),
        );
    }
    Value::Object(map)
}

pub fn raw(body: Value, fetched_at: DateTime<Utc>) -> RawSnapshot {
    RawSnapshot { fetched_at, body }
}

/// Removes the field at a dotted path, e.g. `a.metrics.memory.virtual.used`.
pub fn remove_path(body: &mut Value, path: &str) {
    let mut parts: Vec<&str> = path.split('.').collect();
    let last = parts.pop().unwrap();
    let mut node = body;
    for p in parts {
        node = node.get_mut(p).unwrap();
    }
    node.as_object_mut().unwrap().remove(last);
}

#[derive(Default)]
pub struct CollectingReporter {
    pub seen: Mutex<Vec<SyncError>>,
}

impl CollectingReporter {
    pub fn errors(&self) -> Vec<SyncError> {
        self.seen.lock().unwrap().clone()
    }
}

impl ErrorReporter for CollectingReporter {
    fn report(&self, err: &SyncError) {
        self.seen.lock().unwrap().push(err.clone());
    }
}
