// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use common::edge_pairs;
use graft_core::{Application, EdgeId, RuleId, VertexId, VertexMatching};
use graft_dry_tests::{path, rules, star};

fn at(rule: RuleId, vertices: &[u32]) -> Application {
    Application::new(
        rule,
        VertexMatching::from_vertices(vertices.iter().map(|&v| VertexId(v)).collect()),
    )
}

#[test]
fn footprint_splits_reads_and_writes() {
    let mut system = common::plain_system();
    let prune = rules::leaf_pruning(&mut system).unwrap();
    let host = path(3).unwrap();

    // Stem 1, leaf 2.
    let fp = system.footprint(&host, &at(prune, &[1, 2])).unwrap();
    assert_eq!(fp.vertices_read.iter().copied().collect::<Vec<_>>(), vec![VertexId(1)]);
    assert_eq!(fp.vertices_written.iter().copied().collect::<Vec<_>>(), vec![VertexId(2)]);
    assert!(fp.edges_read.is_empty());
    assert_eq!(fp.edges_written.iter().copied().collect::<Vec<_>>(), vec![EdgeId(1)]);
    assert!(!fp.is_read_only());
}

#[test]
fn leaves_of_one_hub_are_pruned_together() {
    let mut system = common::plain_system();
    let prune = rules::leaf_pruning(&mut system).unwrap();
    let host = star(4).unwrap();

    let candidates: Vec<Application> = system
        .find_rule_match(prune, &host, &mut ())
        .unwrap()
        .into_iter()
        .map(|m| Application::new(prune, m))
        .collect();
    assert_eq!(candidates.len(), 4);
    let kept = system.select_independent(&host, &candidates).unwrap();
    assert_eq!(kept, candidates);

    let out = system.apply_matches(&host, &kept, &mut ()).unwrap();
    assert_eq!(out.graph.vertex_count(), 1);
    assert_eq!(out.graph.edge_count(), 0);
}

#[test]
fn overlapping_applications_are_dropped_in_order() {
    let mut system = common::plain_system();
    let prune = rules::leaf_pruning(&mut system).unwrap();
    let host = path(2).unwrap();

    // Each end is the other's stem.
    let candidates = [at(prune, &[0, 1]), at(prune, &[1, 0])];
    let kept = system.select_independent(&host, &candidates).unwrap();
    assert_eq!(kept, vec![candidates[0].clone()]);
    let out = system.apply_matches(&host, &kept, &mut ()).unwrap();
    assert_eq!(out.graph.vertex_count(), 1);
}

#[test]
fn deletion_and_growth_are_kept_apart() {
    let mut system = common::plain_system();
    let grow = rules::attach_leaf(&mut system).unwrap();
    let delete = rules::vertex_deletion(&mut system).unwrap();
    let host = path(3).unwrap();

    let candidates = [
        at(delete, &[0]),
        at(delete, &[1]),
        at(delete, &[2]),
        at(grow, &[0]),
        at(grow, &[1]),
        at(grow, &[2]),
    ];
    let kept = system.select_independent(&host, &candidates).unwrap();
    assert_eq!(
        kept,
        vec![at(delete, &[0]), at(delete, &[2]), at(grow, &[1])]
    );

    let out = system.apply_matches(&host, &kept, &mut ()).unwrap();
    // Vertex 1 survives with one new leaf.
    assert_eq!(edge_pairs(&out.graph), vec![(1, 3)]);
}

#[test]
fn invalid_candidates_are_errors() {
    let mut system = common::plain_system();
    let prune = rules::leaf_pruning(&mut system).unwrap();
    let host = path(2).unwrap();
    assert!(system
        .select_independent(&host, &[at(prune, &[0, 5])])
        .is_err());
}
