// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use graft_core::{RuleId, VertexId};
use graft_dry_tests::{complete, cycle, rules};

#[test]
fn symmetry_follows_new_structure() {
    let mut system = common::plain_system();

    // Env pair with a new vertex on one end.
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(0);
    rule.add_connection(a, b, 0).unwrap();
    let n = rule.add_new_node(0);
    rule.add_new_connection(b, n, None, None, 0).unwrap();
    let one_sided = rule.end().unwrap();

    // Same pattern with the new vertex on both ends.
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(0);
    rule.add_connection(a, b, 0).unwrap();
    let n = rule.add_new_node(0);
    rule.add_new_connection(b, n, None, None, 0).unwrap();
    rule.add_new_connection(a, n, None, None, 0).unwrap();
    let two_sided = rule.end().unwrap();

    assert_eq!(system.is_rule_symmetric(one_sided), Some(false));
    assert_eq!(system.is_rule_symmetric(two_sided), Some(true));
    assert_eq!(system.rule(two_sided).unwrap().automorphism_count(), 2);
    assert_eq!(system.is_rule_symmetric(RuleId(9)), None);
}

#[test]
fn outer_splice_across_a_cut_middle_is_symmetric() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(1);
    let mid = rule.add_cut_node(1);
    let c = rule.add_node(1);
    let left = rule.add_cut_connection(a, mid, 0).unwrap();
    let right = rule.add_cut_connection(mid, c, 0).unwrap();
    rule.add_new_connection(a, c, Some(left), Some(right), 0).unwrap();
    let id = rule.end().unwrap();

    assert_eq!(system.is_rule_symmetric(id), Some(true));
    assert!(system.parity_armed());
}

#[test]
fn splice_on_one_side_breaks_symmetry() {
    let mut system = common::plain_system();
    let mut rule = system.start_rule();
    let a = rule.add_node(0);
    let b = rule.add_node(0);
    let e = rule.add_cut_connection(a, b, 0).unwrap();
    let n = rule.add_new_node(0);
    rule.add_new_connection(a, n, Some(e), None, 0).unwrap();
    rule.add_new_connection(b, n, None, None, 0).unwrap();
    let id = rule.end().unwrap();
    assert_eq!(system.is_rule_symmetric(id), Some(false));
}

#[test]
fn triangle_expansion_has_the_full_triangle_group() {
    let mut system = common::plain_system();
    let id = rules::triangle_expansion(&mut system).unwrap();
    let rule = system.rule(id).unwrap();
    assert!(rule.is_symmetric());
    assert_eq!(rule.automorphism_count(), 6);
}

#[test]
fn symmetric_matches_are_reported_once_per_occurrence() {
    let mut system = common::plain_system();
    let id = rules::triangle_expansion(&mut system).unwrap();

    let host = complete(3).unwrap();
    let found = system.find_rule_match(id, &host, &mut ()).unwrap();
    assert_eq!(found.len(), 1);

    // K4 holds four triangles.
    let host = complete(4).unwrap();
    let found = system.find_rule_match(id, &host, &mut ()).unwrap();
    assert_eq!(found.len(), 4);
    let mut keys: Vec<Vec<VertexId>> = found
        .iter()
        .map(|m| {
            let mut vs = m.vertices().to_vec();
            vs.sort_unstable();
            vs
        })
        .collect();
    keys.sort();
    keys.dedup();
    assert_eq!(keys.len(), 4);
}

#[test]
fn subdivision_sees_each_edge_once() {
    let mut system = common::plain_system();
    let id = rules::edge_subdivision(&mut system).unwrap();
    let host = cycle(5).unwrap();
    assert_eq!(system.find_rule_match(id, &host, &mut ()).unwrap().len(), 5);
}
