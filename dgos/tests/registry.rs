//! Agent registry and selection fallback.

mod common;

use common::{at, metrics, multi, raw};
use dgos::normalize::normalize;
use dgos::registry::{step_selection, AgentRegistry, Selection};
use dgos::types::{AgentId, Snapshot};

fn snapshot(ids: &[&str]) -> Snapshot {
    let agents: Vec<(&str, serde_json::Value)> = ids.iter().map(|id| (*id, metrics(1, 1))).collect();
    normalize(&raw(multi(&agents), at(0))).unwrap()
}

#[test]
fn update_replaces_rather_than_merges() {
    let mut reg = AgentRegistry::new();
    reg.update(&snapshot(&["a", "b"]));
    let known = reg.update(&snapshot(&["b", "c"]));
    let ids: Vec<&str> = known.iter().map(AgentId::as_str).collect();
    assert_eq!(ids, vec!["b", "c"]);
}

#[test]
fn selected_agent_disappearing_falls_back_to_all() {
    let mut reg = AgentRegistry::new();
    reg.update(&snapshot(&["A", "B"]));
    assert_eq!(reg.select(Selection::Agent("B".into())), &Selection::Agent("B".into()));

    let next = snapshot(&["A"]);
    reg.update(&next);
    assert_eq!(reg.selection(), &Selection::All);
    assert_eq!(reg.current_view(&next), next);
}

#[test]
fn selecting_an_unknown_agent_resolves_to_all() {
    let mut reg = AgentRegistry::new();
    reg.update(&snapshot(&["a"]));
    assert_eq!(reg.select(Selection::Agent("zzz".into())), &Selection::All);

    // nothing known yet
    let mut empty = AgentRegistry::new();
    assert_eq!(empty.select(Selection::Agent("a".into())), &Selection::All);
}

#[test]
fn current_view_restricts_to_the_selection() {
    let mut reg = AgentRegistry::new();
    let snap = snapshot(&["a", "b"]);
    reg.update(&snap);

    assert_eq!(reg.current_view(&snap), snap);

    reg.select(Selection::Agent("b".into()));
    let view = reg.current_view(&snap);
    assert_eq!(view.agent_ids().map(AgentId::as_str).collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(view.timestamp, snap.timestamp);
    assert_eq!(view.agents[&AgentId::new("b")], snap.agents[&AgentId::new("b")]);
}

#[test]
fn view_is_never_empty_while_agents_are_known() {
    let mut reg = AgentRegistry::new();
    let snap = snapshot(&["a", "b"]);
    reg.update(&snap);
    reg.select(Selection::Agent("a".into()));

    // a snapshot without the selected agent still projects to something
    let other = snapshot(&["b"]);
    assert!(!reg.current_view(&other).is_empty());
}

#[test]
fn step_selection_cycles_through_all_and_each_agent() {
    let agents = vec![AgentId::new("a"), AgentId::new("b")];
    let mut sel = Selection::All;
    let mut seen = Vec::new();
    for _ in 0..3 {
        sel = step_selection(&agents, &sel, true);
        seen.push(sel.clone());
    }
    assert_eq!(
        seen,
        vec![Selection::Agent("a".into()), Selection::Agent("b".into()), Selection::All]
    );
    assert_eq!(step_selection(&agents, &Selection::All, false), Selection::Agent("b".into()));
    assert_eq!(step_selection(&[], &Selection::All, true), Selection::All);
}
