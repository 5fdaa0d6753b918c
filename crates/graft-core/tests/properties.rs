// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

#![allow(missing_docs, clippy::unwrap_used)]

mod common;

use proptest::prelude::*;
use proptest::test_runner::{Config as PropConfig, RngAlgorithm, TestRng, TestRunner};

use common::{edge_pairs, vertex_indices};
use graft_core::{Application, Graph};
use graft_dry_tests::graphs::from_edges;
use graft_dry_tests::rules;

/// Simple graphs on up to seven vertices.
fn simple_graph() -> impl Strategy<Value = Graph> {
    (1usize..8)
        .prop_flat_map(|n| (Just(n), prop::collection::vec((0..n, 0..n), 0..14)))
        .prop_map(|(n, raw)| {
            let mut pairs: Vec<(usize, usize)> = raw
                .into_iter()
                .filter(|(a, b)| a != b)
                .map(|(a, b)| (a.min(b), a.max(b)))
                .collect();
            pairs.sort_unstable();
            pairs.dedup();
            from_edges(n, &pairs).unwrap()
        })
}

proptest! {
    #[test]
    fn additive_rules_keep_every_host_element(host in simple_graph()) {
        let mut system = common::plain_system();
        rules::attach_leaf(&mut system).unwrap();
        let out = system.apply(&host, &mut (), &mut ()).unwrap();

        let n = host.vertex_count();
        prop_assert_eq!(out.graph.vertex_count(), 2 * n);
        prop_assert_eq!(out.graph.edge_count(), host.edge_count() + n);
        let kept = vertex_indices(&out.graph);
        for index in vertex_indices(&host) {
            prop_assert!(kept.contains(&index));
        }
        let pairs = edge_pairs(&out.graph);
        for pair in edge_pairs(&host) {
            prop_assert!(pairs.contains(&pair));
        }
    }

    #[test]
    fn subdivision_splits_every_edge_once(host in simple_graph()) {
        let mut system = common::plain_system();
        rules::edge_subdivision(&mut system).unwrap();
        let out = system.apply(&host, &mut (), &mut ()).unwrap();
        prop_assert_eq!(out.graph.vertex_count(), host.vertex_count() + host.edge_count());
        prop_assert_eq!(out.graph.edge_count(), 2 * host.edge_count());
    }

    #[test]
    fn single_ported_rules_never_hit_odd_cycles(host in simple_graph()) {
        let mut system = common::plain_system();
        rules::edge_subdivision(&mut system).unwrap();
        rules::triangle_expansion(&mut system).unwrap();
        prop_assert!(!system.parity_armed());
        prop_assert!(system.apply(&host, &mut (), &mut ()).is_ok());
    }

    #[test]
    fn independent_selection_never_overlaps(host in simple_graph()) {
        let mut system = common::plain_system();
        rules::leaf_pruning(&mut system).unwrap();
        rules::vertex_deletion(&mut system).unwrap();
        rules::attach_leaf(&mut system).unwrap();
        rules::edge_subdivision(&mut system).unwrap();

        let candidates = system.find_all_matches(&host, &mut ());
        let kept = system.select_independent(&host, &candidates).unwrap();
        let prints: Vec<_> = kept
            .iter()
            .map(|app| system.footprint(&host, app).unwrap())
            .collect();
        for (i, a) in prints.iter().enumerate() {
            for b in &prints[i + 1..] {
                prop_assert!(a.independent(b));
            }
        }
        prop_assert!(system.apply_matches(&host, &kept, &mut ()).is_ok());
    }
}

// Pinned seed so the triangle case generation is reproducible across
// machines. Override with PROPTEST_SEED to explore other inputs.
#[test]
fn proptest_seed_pinned_triangle_dedup() {
    const SEED_BYTES: [u8; 32] = [
        0x67, 0x72, 0x61, 0x66, 0x74, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0,
        0, 0, 0, 0, 0, 0, 0,
    ];

    let rng = TestRng::from_seed(RngAlgorithm::ChaCha, &SEED_BYTES);
    let mut runner = TestRunner::new_with_rng(PropConfig::default(), rng);

    let mut system = common::plain_system();
    let triangle = rules::triangle_expansion(&mut system).unwrap();

    runner
        .run(&simple_graph(), |host| {
            let found = system.find_rule_match(triangle, &host, &mut ()).unwrap();

            // Brute-force triangle count over vertex triples.
            let vs: Vec<_> = host.vertices().collect();
            let mut expected = 0;
            for (i, &a) in vs.iter().enumerate() {
                for (j, &b) in vs.iter().enumerate().skip(i + 1) {
                    for &c in &vs[j + 1..] {
                        if host.contains_edge(a, b)
                            && host.contains_edge(b, c)
                            && host.contains_edge(a, c)
                        {
                            expected += 1;
                        }
                    }
                }
            }
            prop_assert_eq!(found.len(), expected);

            let mut keys: Vec<Vec<_>> = found
                .iter()
                .map(|m| {
                    let mut k = m.vertices().to_vec();
                    k.sort_unstable();
                    k
                })
                .collect();
            keys.sort();
            keys.dedup();
            prop_assert_eq!(keys.len(), expected);

            let batch: Vec<Application> = found
                .into_iter()
                .map(|m| Application::new(triangle, m))
                .collect();
            prop_assert!(system.apply_matches(&host, &batch, &mut ()).is_ok());
            Ok(())
        })
        .unwrap();
}
