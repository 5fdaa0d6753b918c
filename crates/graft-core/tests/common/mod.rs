// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
#![allow(dead_code, clippy::unwrap_used)]

use graft_core::{Graph, Plain, RuleSystem, RuleSystemConfig, VertexId};

/// Fresh structural rule system.
pub fn plain_system() -> RuleSystem<Plain> {
    RuleSystem::new()
}

/// Structural rule system with a custom configuration.
pub fn plain_system_with(config: RuleSystemConfig) -> RuleSystem<Plain> {
    RuleSystem::with_config(config)
}

/// Stable index of a vertex.
pub fn index_of<N, E>(g: &Graph<N, E>, v: VertexId) -> u32 {
    g.vertex_index(v).unwrap()
}

/// Sorted stable vertex indices.
pub fn vertex_indices<N, E>(g: &Graph<N, E>) -> Vec<u32> {
    let mut out: Vec<u32> = g.iter_vertices().map(|(_, r)| r.index).collect();
    out.sort_unstable();
    out
}

/// Edges as sorted pairs of stable vertex indices, sorted.
pub fn edge_pairs<N, E>(g: &Graph<N, E>) -> Vec<(u32, u32)> {
    let mut out: Vec<(u32, u32)> = g
        .iter_edges()
        .map(|(_, r)| {
            let a = index_of(g, r.ends[0]);
            let b = index_of(g, r.ends[1]);
            (a.min(b), a.max(b))
        })
        .collect();
    out.sort_unstable();
    out
}

/// Sorted degree sequence.
pub fn degrees<N, E>(g: &Graph<N, E>) -> Vec<usize> {
    let mut out: Vec<usize> = g.vertices().map(|v| g.degree(v)).collect();
    out.sort_unstable();
    out
}
