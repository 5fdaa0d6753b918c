// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use graft_core::{
    EdgeId, Graph, HostGraph, RewriteError, RuleDomain, RuleId, RuleSystem, RuleSystemConfig,
    VertexId,
};
use graft_dry_tests::{complete, cycle, path, rules, star};

#[test]
fn empty_host_has_no_matches() {
    let mut system = common::plain_system();
    let id = rules::edge_subdivision(&mut system).unwrap();
    let host = Graph::new();
    assert!(system.find_rule_match(id, &host, &mut ()).unwrap().is_empty());
    assert!(system.find_all_matches(&host, &mut ()).is_empty());
}

#[test]
fn unknown_rule_is_an_error() {
    let system = common::plain_system();
    let host = Graph::new();
    assert_eq!(
        system.find_rule_match(RuleId(3), &host, &mut ()),
        Err(RewriteError::UnknownRule(RuleId(3)))
    );
}

#[test]
fn matching_is_induced() {
    // Open path a - b - c.
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(0);
    let c = rule.add_node(0);
    rule.add_connection(a, b, 0).unwrap();
    rule.add_connection(b, c, 0).unwrap();
    let open_path = rule.end().unwrap();

    // A triangle contains no induced open path.
    let triangle = complete(3).unwrap();
    assert!(system
        .find_rule_match(open_path, &triangle, &mut ())
        .unwrap()
        .is_empty());

    // A square contains four, each found once since the path is symmetric.
    let square = cycle(4).unwrap();
    assert_eq!(
        system.find_rule_match(open_path, &square, &mut ()).unwrap().len(),
        4
    );
}

#[test]
fn matching_binds_vertices_and_edges_in_declaration_order() {
    let mut system = common::plain_system();
    let id = rules::leaf_pruning(&mut system).unwrap();
    let host = path(2).unwrap();
    let found = system.find_rule_match(id, &host, &mut ()).unwrap();
    // Either end of a single edge is a leaf.
    assert_eq!(found.len(), 2);
    for m in &found {
        assert_eq!(m.vertices().len(), 2);
        assert_eq!(m.edges(), &[EdgeId(0)]);
        assert_ne!(m.vertex(0), m.vertex(1));
    }
}

#[test]
fn vertex_predicate_filters_candidates() {
    let mut system = common::plain_system();
    let id = rules::leaf_pruning(&mut system).unwrap();
    let host = star(3).unwrap();
    let found = system.find_rule_match(id, &host, &mut ()).unwrap();
    assert_eq!(found.len(), 3);
    assert!(found.iter().all(|m| m.vertex(0) == Some(VertexId(0))));
}

/// Domain whose vertices carry a weight and whose match state counts
/// predicate calls.
struct Weighted;

impl RuleDomain for Weighted {
    type Node = u32;
    type Edge = u32;
    type MatchState = usize;
    type RewriteState = ();
}

fn weighted_triangle() -> HostGraph<Weighted> {
    let mut g = HostGraph::<Weighted>::new();
    let v: Vec<VertexId> = [1, 2, 3].into_iter().map(|w| g.add_vertex(w)).collect();
    g.add_edge(v[0], v[1], 10).unwrap();
    g.add_edge(v[1], v[2], 20).unwrap();
    g.add_edge(v[2], v[0], 30).unwrap();
    g
}

#[test]
fn predicates_see_payloads_and_state() {
    let mut system = RuleSystem::<Weighted>::new();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(1);
    let e = rule.add_connection(a, b, 0).unwrap();
    rule.check_node(a, |ctx, v| {
        *ctx.state += 1;
        ctx.host.vertex_payload(v) == Some(&1)
    })
    .unwrap();
    rule.check_edge(e, |ctx, e| ctx.host.edge_payload(e).is_some_and(|w| *w >= 20))
        .unwrap();
    let id = rule.end().unwrap();

    let host = weighted_triangle();
    let mut calls = 0;
    let found = system.find_rule_match(id, &host, &mut calls).unwrap();
    assert!(calls > 0);
    // Vertex 0 (weight 1) reaches vertex 2 over the weight-30 edge only.
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].vertices(), &[VertexId(0), VertexId(2)]);
    assert_eq!(found[0].edges(), &[EdgeId(2)]);
}

#[test]
fn whole_match_check_discards_embeddings() {
    let mut system = RuleSystem::<Weighted>::new();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(1);
    rule.add_connection(a, b, 0).unwrap();
    let id = rule
        .end_with_check(|ctx, m| {
            let w = |v: Option<VertexId>| v.and_then(|v| ctx.host.vertex_payload(v)).copied();
            w(m.vertex(0)) < w(m.vertex(1))
        })
        .unwrap();

    let host = weighted_triangle();
    let found = system.find_rule_match(id, &host, &mut 0).unwrap();
    // Three edges, each kept in its ascending orientation only.
    assert_eq!(found.len(), 3);
}

#[test]
fn parallel_pattern_edges_need_parallel_host_edges() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(1);
    rule.add_connection(a, b, 0).unwrap();
    rule.add_connection(a, b, 0).unwrap();
    let id = rule.end().unwrap();

    let mut host: Graph = path(2).unwrap();
    assert!(system.find_rule_match(id, &host, &mut ()).unwrap().is_empty());
    host.add_edge(VertexId(0), VertexId(1), ()).unwrap();
    let found = system.find_rule_match(id, &host, &mut ()).unwrap();
    // Orientation matters because the two pattern vertices carry different tags.
    assert_eq!(found.len(), 2);
    let mut edges = found[0].edges().to_vec();
    edges.sort_unstable();
    assert_eq!(edges, vec![EdgeId(0), EdgeId(1)]);
}

#[test]
fn match_limit_caps_results() {
    let mut system = common::plain_system_with(RuleSystemConfig {
        match_limit: Some(2),
        ..RuleSystemConfig::default()
    });
    let id = rules::edge_subdivision(&mut system).unwrap();
    let host = cycle(6).unwrap();
    assert_eq!(system.find_rule_match(id, &host, &mut ()).unwrap().len(), 2);
}

#[test]
fn results_are_deterministic() {
    let mut system = common::plain_system();
    rules::edge_subdivision(&mut system).unwrap();
    rules::triangle_expansion(&mut system).unwrap();
    let host = complete(5).unwrap();
    let first = system.find_all_matches(&host, &mut ());
    let second = system.find_all_matches(&host, &mut ());
    assert_eq!(first, second);
    // Ten edges and ten triangles.
    assert_eq!(first.len(), 20);
}
