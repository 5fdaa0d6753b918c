// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Pattern skeletons and the target abstraction the matcher searches.
use crate::graph::Graph;
use crate::ident::VertexId;

/// Something a pattern can be embedded into: a host graph, or another rule's
/// pattern during conflict analysis.
///
/// Vertices and edges are addressed by dense `usize` slots.
pub(crate) trait Target {
    fn order(&self) -> usize;
    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_;
    fn edges_between(&self, a: usize, b: usize) -> impl Iterator<Item = usize> + '_;

    /// Neighbours of `v` without repetition, in ascending order.
    fn distinct_neighbors(&self, v: usize) -> Vec<usize> {
        let mut out: Vec<usize> = self.neighbors(v).filter(|&u| u != v).collect();
        out.sort_unstable();
        out.dedup();
        out
    }
}

/// Structure of a pattern: vertex count plus undirected edges between
/// distinct vertices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct PatternShape {
    ends: Vec<[usize; 2]>,
    incidence: Vec<Vec<usize>>,
}

impl PatternShape {
    pub(crate) fn new(order: usize, ends: Vec<[usize; 2]>) -> Self {
        let mut incidence = vec![Vec::new(); order];
        for (e, &[a, b]) in ends.iter().enumerate() {
            debug_assert!(a != b && a < order && b < order, "malformed pattern edge");
            incidence[a].push(e);
            incidence[b].push(e);
        }
        Self { ends, incidence }
    }

    pub(crate) fn edge_count(&self) -> usize {
        self.ends.len()
    }

    pub(crate) fn ends(&self, e: usize) -> [usize; 2] {
        self.ends[e]
    }

    pub(crate) fn degree(&self, v: usize) -> usize {
        self.incidence[v].len()
    }

    /// Sub-pattern induced by `subset` (pattern vertex slots, ascending).
    ///
    /// Returns the shape, renumbered so that vertex `i` stands for
    /// `subset[i]`, and for each of its edges the originating edge slot.
    pub(crate) fn induced(&self, subset: &[usize]) -> (Self, Vec<usize>) {
        let mut local = vec![None; self.incidence.len()];
        for (i, &v) in subset.iter().enumerate() {
            local[v] = Some(i);
        }
        let mut ends = Vec::new();
        let mut origin = Vec::new();
        for (e, &[a, b]) in self.ends.iter().enumerate() {
            if let (Some(la), Some(lb)) = (local[a], local[b]) {
                ends.push([la, lb]);
                origin.push(e);
            }
        }
        (Self::new(subset.len(), ends), origin)
    }
}

impl Target for PatternShape {
    fn order(&self) -> usize {
        self.incidence.len()
    }

    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.incidence[v].iter().map(move |&e| {
            let [a, b] = self.ends[e];
            if a == v {
                b
            } else {
                a
            }
        })
    }

    fn edges_between(&self, a: usize, b: usize) -> impl Iterator<Item = usize> + '_ {
        self.incidence[a].iter().copied().filter(move |&e| {
            let [x, y] = self.ends[e];
            (x == a && y == b) || (x == b && y == a)
        })
    }
}

impl<N, E> Target for Graph<N, E> {
    fn order(&self) -> usize {
        self.vertex_count()
    }

    fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        Graph::neighbors(self, VertexId::from_slot(v)).map(VertexId::slot)
    }

    fn edges_between(&self, a: usize, b: usize) -> impl Iterator<Item = usize> + '_ {
        Graph::edges_between(self, VertexId::from_slot(a), VertexId::from_slot(b))
            .map(crate::ident::EdgeId::slot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn induced_keeps_only_internal_edges() {
        // 0-1, 1-2, 2-0, 2-3
        let shape = PatternShape::new(4, vec![[0, 1], [1, 2], [2, 0], [2, 3]]);
        let (sub, origin) = shape.induced(&[1, 2, 3]);
        assert_eq!(sub.order(), 3);
        assert_eq!(origin, vec![1, 3]);
        assert_eq!(sub.ends(0), [0, 1]);
        assert_eq!(sub.ends(1), [1, 2]);
    }

    #[test]
    fn distinct_neighbors_collapse_parallel_edges() {
        let shape = PatternShape::new(3, vec![[0, 1], [1, 0], [0, 2]]);
        assert_eq!(shape.distinct_neighbors(0), vec![1, 2]);
        assert_eq!(shape.edges_between(1, 0).count(), 2);
        assert_eq!(shape.degree(0), 3);
    }
}
