//! Bounded history buffers and derived rates.

mod common;

use common::{at, metrics, multi, raw};
use dgos::history::{rates, Channel, HistoryBuffer, HistorySample, HistoryStore, HISTORY_CAPACITY};
use dgos::normalize::normalize;
use dgos::types::AgentId;

#[test]
fn buffer_keeps_the_most_recent_twenty_oldest_first() {
    let mut store = HistoryStore::new();
    let a = AgentId::new("a");
    for i in 0..35u64 {
        store.append(&a, Channel::ReadBytes, at(i as i64), i * 10);
    }
    let got = store.read(&a, Channel::ReadBytes);
    assert_eq!(got.len(), HISTORY_CAPACITY);
    assert_eq!(got.first().unwrap().timestamp, at(15));
    assert_eq!(got.last().unwrap().timestamp, at(34));
    assert!(got.windows(2).all(|w| w[0].timestamp < w[1].timestamp));
    assert_eq!(got.iter().map(|s| s.value).collect::<Vec<_>>(), (15..35).map(|i| i * 10).collect::<Vec<_>>());
}

#[test]
fn series_are_independent_per_agent_and_channel() {
    let mut store = HistoryStore::new();
    let a = AgentId::new("a");
    let b = AgentId::new("b");
    store.append(&a, Channel::ReadBytes, at(0), 1);
    store.append(&a, Channel::WriteBytes, at(0), 2);
    store.append(&b, Channel::ReadBytes, at(0), 3);

    assert_eq!(store.read(&a, Channel::ReadBytes)[0].value, 1);
    assert_eq!(store.read(&a, Channel::WriteBytes)[0].value, 2);
    assert_eq!(store.read(&b, Channel::ReadBytes)[0].value, 3);
    assert!(store.read(&b, Channel::WriteBytes).is_empty());
    assert!(store.buffer(&b, Channel::WriteBytes).is_none());
}

#[test]
fn record_appends_every_tracked_channel_at_snapshot_time() {
    let snap = normalize(&raw(multi(&[("a", metrics(100, 40)), ("b", metrics(7, 8))]), at(5))).unwrap();
    let mut store = HistoryStore::new();
    store.record(&snap);

    let a = AgentId::new("a");
    assert_eq!(
        store.read(&a, Channel::ReadBytes),
        vec![HistorySample { timestamp: at(5), value: 100 }]
    );
    assert_eq!(store.read(&a, Channel::WriteBytes)[0].value, 40);
    assert_eq!(store.read(&AgentId::new("b"), Channel::WriteBytes)[0].value, 8);
    assert_eq!(store.series().count(), 4);
}

#[test]
fn rates_are_bytes_per_second_between_samples() {
    let mut buf = HistoryBuffer::new();
    buf.push(HistorySample { timestamp: at(0), value: 1000 });
    buf.push(HistorySample { timestamp: at(2), value: 5000 });
    buf.push(HistorySample { timestamp: at(4), value: 5000 });
    assert_eq!(buf.rates(), vec![2000.0, 0.0]);
    assert_eq!(buf.latest().unwrap().value, 5000);
}

#[test]
fn counter_reset_clamps_rate_to_zero() {
    let samples = [
        HistorySample { timestamp: at(0), value: 9000 },
        HistorySample { timestamp: at(1), value: 100 },
        HistorySample { timestamp: at(1), value: 500 },
    ];
    // second step has no elapsed time
    assert_eq!(rates(&samples), vec![0.0, 0.0]);
    assert!(rates(&samples[..1]).is_empty());
}
