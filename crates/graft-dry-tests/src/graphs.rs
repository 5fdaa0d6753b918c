// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Builders for common host graph shapes.
//!
//! Vertices are added in order, so vertex `i` of the description is
//! `VertexId(i)`. Payloads come from `Default`, which lets the same builders
//! serve any domain.

use graft_core::{Graph, GraphError, VertexId};

/// Builds a graph with `n` vertices and the given edges between vertex
/// positions.
pub fn from_edges<N: Default, E: Default>(
    n: usize,
    edges: &[(usize, usize)],
) -> Result<Graph<N, E>, GraphError> {
    let mut g = Graph::with_capacity(n, edges.len());
    let vs: Vec<VertexId> = (0..n).map(|_| g.add_vertex(N::default())).collect();
    for &(a, b) in edges {
        let a = vs.get(a).copied().unwrap_or(VertexId(u32::MAX));
        let b = vs.get(b).copied().unwrap_or(VertexId(u32::MAX));
        g.add_edge(a, b, E::default())?;
    }
    Ok(g)
}

/// Path `0 - 1 - ... - (n-1)`.
pub fn path<N: Default, E: Default>(n: usize) -> Result<Graph<N, E>, GraphError> {
    let edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
    from_edges(n, &edges)
}

/// Cycle over `n` vertices; fewer than three vertices gives a path.
pub fn cycle<N: Default, E: Default>(n: usize) -> Result<Graph<N, E>, GraphError> {
    let mut edges: Vec<_> = (1..n).map(|i| (i - 1, i)).collect();
    if n >= 3 {
        edges.push((n - 1, 0));
    }
    from_edges(n, &edges)
}

/// Complete graph over `n` vertices.
pub fn complete<N: Default, E: Default>(n: usize) -> Result<Graph<N, E>, GraphError> {
    let edges: Vec<_> = (0..n)
        .flat_map(|a| (a + 1..n).map(move |b| (a, b)))
        .collect();
    from_edges(n, &edges)
}

/// Hub `0` joined to `leaves` further vertices.
pub fn star<N: Default, E: Default>(leaves: usize) -> Result<Graph<N, E>, GraphError> {
    let edges: Vec<_> = (1..=leaves).map(|i| (0, i)).collect();
    from_edges(leaves + 1, &edges)
}

/// `width x height` lattice, row-major.
pub fn grid<N: Default, E: Default>(width: usize, height: usize) -> Result<Graph<N, E>, GraphError> {
    let at = |x: usize, y: usize| y * width + x;
    let mut edges = Vec::new();
    for y in 0..height {
        for x in 0..width {
            if x + 1 < width {
                edges.push((at(x, y), at(x + 1, y)));
            }
            if y + 1 < height {
                edges.push((at(x, y), at(x, y + 1)));
            }
        }
    }
    from_edges(width * height, &edges)
}
