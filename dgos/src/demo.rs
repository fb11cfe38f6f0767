//! Synthetic multi-agent source for `--demo`, so the dashboard can run without
//! a metrics server. Produces the same wire shape the server does.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use serde_json::{json, Map, Value};

use crate::error::SyncError;
use crate::fetch::{MetricsSource, RawSnapshot};

const GIB: u64 = 1024 * 1024 * 1024;

struct DemoHost {
    id: &'static str,
    hostname: &'static str,
    cores: u32,
    mem_total: u64,
    disk_total: u64,
}

const HOSTS: [DemoHost; 2] = [
    DemoHost {
        id: "a1f3-demo",
        hostname: "build-01",
        cores: 12,
        mem_total: 32 * GIB,
        disk_total: 512 * GIB,
    },
    DemoHost {
        id: "b7c2-demo",
        hostname: "db-01",
        cores: 4,
        mem_total: 8 * GIB,
        disk_total: 256 * GIB,
    },
];

#[derive(Debug, Default)]
pub struct DemoSource {
    tick: AtomicU64,
}

impl DemoSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Payload for tick `t`; deterministic so tests can rely on it.
    pub fn payload(t: u64) -> Value {
        let now = Utc::now().to_rfc3339();
        let mut agents = Map::new();
        for (h, host) in HOSTS.iter().enumerate() {
            agents.insert(host.id.to_string(), host_entry(host, h as f64, t, &now));
        }
        Value::Object(agents)
    }
}

impl MetricsSource for DemoSource {
    async fn fetch(&self) -> Result<RawSnapshot, SyncError> {
        let t = self.tick.fetch_add(1, Ordering::Relaxed);
        Ok(RawSnapshot {
            fetched_at: Utc::now(),
            body: Self::payload(t),
        })
    }

    fn describe(&self) -> String {
        "demo".into()
    }
}

fn wave(t: u64, phase: f64, lo: f64, hi: f64) -> f64 {
    let x = (t as f64 * 0.35 + phase).sin() * 0.5 + 0.5;
    lo + (hi - lo) * x
}

fn host_entry(host: &DemoHost, seed: f64, t: u64, now: &str) -> Value {
    let mut cores = Map::new();
    let mut times = Map::new();
    for c in 0..host.cores {
        let phase = seed * 3.0 + c as f64 * 0.7;
        cores.insert(format!("cpu{c}"), json!({ "usage": wave(t, phase, 2.0, 95.0) }));
        let up = 1000.0 + t as f64 * 2.0;
        times.insert(
            format!("cpu{c}"),
            json!({
                "user": up * 0.3,
                "system": up * 0.1,
                "idle": up * 0.55,
                "iowait": up * 0.04,
                "irq": up * 0.01,
            }),
        );
    }

    let mem_used = (host.mem_total as f64 * wave(t, seed, 0.35, 0.8)) as u64;
    let mem_free = host.mem_total - mem_used;
    let disk_free = (host.disk_total as f64 * 0.42) as u64;
    let read_bytes = t * (40 + seed as u64 * 25) * 1024 * 1024 + (wave(t, seed, 0.0, 1.0) * 8e6) as u64;
    let write_bytes = t * (12 + seed as u64 * 30) * 1024 * 1024;

    json!({
        "agent_id": host.id,
        "hostname": host.hostname,
        "timestamp": now,
        "metrics": {
            "cpu": {
                "cores": cores,
                "times": times,
                "load": {
                    "1m": wave(t, seed, 0.2, 3.5),
                    "5m": wave(t, seed + 0.5, 0.5, 2.5),
                    "15m": 1.1,
                },
                "info": {
                    "physical_cores": host.cores / 2,
                    "logical_cores": host.cores,
                    "process_count": 180 + (t % 20),
                    "thread_count": 900 + (t % 50),
                },
            },
            "memory": {
                "virtual": {
                    "total": host.mem_total,
                    "used": mem_used,
                    "free": mem_free,
                    "cached": mem_free / 3,
                    "available": mem_free,
                    "usage": mem_used as f64 / host.mem_total as f64 * 100.0,
                },
                "swap": {
                    "total": 2 * GIB,
                    "used": GIB / 8,
                    "free": 2 * GIB - GIB / 8,
                    "usage": 6.25,
                },
            },
            "disk": {
                "total": host.disk_total,
                "free": disk_free,
                "usage": 58.0,
                "io": {
                    "read_count": t * 120,
                    "write_count": t * 45,
                    "read_bytes": read_bytes,
                    "write_bytes": write_bytes,
                },
            },
            "time": now,
        },
    })
}
