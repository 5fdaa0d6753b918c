// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use graft_core::{ElementKind, RuleError};

#[test]
fn empty_rule_is_rejected() {
    let mut system = common::plain_system();
    assert_eq!(system.start_rule().end(), Err(RuleError::EmptyRule));
    assert_eq!(system.rule_count(), 0);
}

#[test]
fn matched_connections_need_distinct_matchable_ends() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_cut_node(0);
    let n = rule.add_new_node(0);

    assert_eq!(rule.add_connection(a, a, 0), Err(RuleError::SelfLoop(a)));
    assert_eq!(rule.add_cut_connection(a, n, 0), Err(RuleError::NotMatchable(n)));
    assert_eq!(rule.add_connection(a, 42, 0), Err(RuleError::UnknownNode(42)));
    assert_eq!(rule.add_cut_connection(a, b, 0), Ok(0));
}

#[test]
fn new_connections_cannot_touch_cut_vertices() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let gone = rule.add_cut_node(0);
    let n = rule.add_new_node(0);
    rule.add_cut_connection(a, gone, 0).unwrap();

    assert_eq!(
        rule.add_new_connection(gone, n, None, None, 0),
        Err(RuleError::CutEndpoint(gone))
    );
    assert_eq!(rule.add_new_connection(n, n, None, None, 0), Err(RuleError::SelfLoop(n)));
    assert_eq!(rule.add_new_connection(a, n, None, None, 0), Ok(1));
}

#[test]
fn splice_ports_must_be_incident_cut_edges() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(0);
    let c = rule.add_node(0);
    let kept = rule.add_connection(a, b, 0).unwrap();
    let cut = rule.add_cut_connection(b, c, 0).unwrap();
    let n = rule.add_new_node(0);

    // Env edge used as a port.
    assert_eq!(
        rule.add_new_connection(a, n, Some(kept), None, 0),
        Err(RuleError::InvalidPort { edge: kept, node: a })
    );
    // Cut edge not incident to the endpoint.
    assert_eq!(
        rule.add_new_connection(a, n, Some(cut), None, 0),
        Err(RuleError::InvalidPort { edge: cut, node: a })
    );
    // Undeclared edge.
    assert_eq!(
        rule.add_new_connection(b, n, Some(99), None, 0),
        Err(RuleError::UnknownEdge(99))
    );
    // A created vertex has no vacated port to take over.
    assert_eq!(
        rule.add_new_connection(b, n, None, Some(cut), 0),
        Err(RuleError::NotMatchable(n))
    );
    assert!(rule.add_new_connection(b, n, Some(cut), None, 0).is_ok());
    rule.end().unwrap();
}

#[test]
fn callbacks_are_checked_against_element_kind() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_cut_node(0);
    let n = rule.add_new_node(0);
    let kept = rule.add_cut_connection(a, b, 0).unwrap();
    let fresh = rule.add_new_connection(a, n, None, None, 0).unwrap();

    assert_eq!(
        rule.check_node(n, |_, _| true).err(),
        Some(RuleError::CallbackKind {
            callback: "check",
            kind: ElementKind::New
        })
    );
    assert_eq!(
        rule.on_remove_node(a, |_, _| {}).err(),
        Some(RuleError::CallbackKind {
            callback: "remove",
            kind: ElementKind::Env
        })
    );
    assert_eq!(
        rule.on_create_node(b, |_, _| {}).err(),
        Some(RuleError::CallbackKind {
            callback: "create",
            kind: ElementKind::Cut
        })
    );
    assert_eq!(
        rule.on_create_edge(kept, |_, _| {}).err(),
        Some(RuleError::CallbackKind {
            callback: "create",
            kind: ElementKind::Cut
        })
    );
    assert_eq!(
        rule.check_edge(fresh, |_, _| true).err(),
        Some(RuleError::CallbackKind {
            callback: "check",
            kind: ElementKind::New
        })
    );
    assert_eq!(rule.on_remove_edge(7, |_, _| {}).err(), Some(RuleError::UnknownEdge(7)));

    assert!(rule.on_remove_node(b, |_, _| {}).is_ok());
    assert!(rule.on_create_node(n, |_, _| {}).is_ok());
    assert!(rule.on_remove_edge(kept, |_, _| {}).is_ok());
    assert!(rule.on_create_edge(fresh, |_, _| {}).is_ok());
    rule.end().unwrap();
}

#[test]
fn compiled_rule_reports_flags() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    rule.named("grow");
    let a = rule.add_node(3);
    let n = rule.add_new_node(4);
    rule.add_new_connection(a, n, None, None, 0).unwrap();
    let id = rule.end().unwrap();

    let compiled = system.rule(id).unwrap();
    assert_eq!(compiled.id(), id);
    assert_eq!(compiled.name(), Some("grow"));
    assert_eq!(compiled.match_node_count(), 1);
    assert_eq!(compiled.match_edge_count(), 0);
    assert_eq!(compiled.new_node_count(), 1);
    assert_eq!(compiled.new_edge_count(), 1);
    assert_eq!(compiled.match_node(0), Some((ElementKind::Env, 3)));
    assert!(!compiled.has_deletes());
    assert!(!compiled.has_potential_loop());
    assert!(!system.has_conflicts());
}
