// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Arena-backed undirected multigraph consumed and produced by the engine.
use thiserror::Error;

use crate::ident::{EdgeId, VertexId};

/// Error returned by [`Graph::add_edge`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GraphError {
    /// An endpoint handle does not name a vertex of this graph.
    #[error("unknown vertex {0:?}")]
    UnknownVertex(VertexId),
}

/// Vertex storage: stable index plus caller payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VertexRecord<N> {
    /// Stable integer identity carried across rewrites.
    pub index: u32,
    /// Caller payload.
    pub payload: N,
}

/// Edge storage: endpoints, stable index and caller payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EdgeRecord<E> {
    /// Stable integer identity carried across rewrites.
    pub index: u32,
    /// Endpoints in insertion order. The graph is undirected; the order only
    /// distinguishes the two ends of a self-loop.
    pub ends: [VertexId; 2],
    /// Caller payload.
    pub payload: E,
}

impl<E> EdgeRecord<E> {
    /// Returns the endpoint opposite to `v`, or `None` when `v` is not an
    /// endpoint. For a self-loop this returns `v`.
    pub fn opposite(&self, v: VertexId) -> Option<VertexId> {
        match self.ends {
            [a, b] if a == v => Some(b),
            [a, b] if b == v => Some(a),
            _ => None,
        }
    }

    /// Returns which end (`0` or `1`) of the edge sits on `v`.
    pub fn end_at(&self, v: VertexId) -> Option<usize> {
        self.ends.iter().position(|&end| end == v)
    }
}

/// Undirected multigraph with owned payloads.
///
/// Vertices and edges live in append-only arenas addressed by [`VertexId`] and
/// [`EdgeId`]. Each element also carries an `index`, a stable integer that the
/// rewrite pipeline preserves for surviving elements. Freshly added elements
/// receive `max(index) + 1` unless an explicit index is supplied.
#[derive(Debug, Clone)]
pub struct Graph<N = (), E = ()> {
    vertices: Vec<VertexRecord<N>>,
    edges: Vec<EdgeRecord<E>>,
    /// Incident edge handles per vertex, in insertion order. A self-loop is
    /// listed once.
    incidence: Vec<Vec<EdgeId>>,
    next_vertex_index: u32,
    next_edge_index: u32,
}

impl<N, E> Default for Graph<N, E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N, E> Graph<N, E> {
    /// Creates an empty graph.
    #[must_use]
    pub fn new() -> Self {
        Self {
            vertices: Vec::new(),
            edges: Vec::new(),
            incidence: Vec::new(),
            next_vertex_index: 0,
            next_edge_index: 0,
        }
    }

    /// Creates an empty graph with room for the given element counts.
    #[must_use]
    pub fn with_capacity(vertices: usize, edges: usize) -> Self {
        Self {
            vertices: Vec::with_capacity(vertices),
            edges: Vec::with_capacity(edges),
            incidence: Vec::with_capacity(vertices),
            next_vertex_index: 0,
            next_edge_index: 0,
        }
    }

    /// Creates an empty graph whose fresh indices start above those of
    /// `template`, so indices retired by a rewrite are never handed out again.
    pub(crate) fn continuing<N2, E2>(template: &Graph<N2, E2>) -> Self {
        Self {
            vertices: Vec::with_capacity(template.vertices.len()),
            edges: Vec::with_capacity(template.edges.len()),
            incidence: Vec::with_capacity(template.vertices.len()),
            next_vertex_index: template.next_vertex_index,
            next_edge_index: template.next_edge_index,
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of edges.
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Returns `true` when the graph has no vertices (and therefore no edges).
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Adds a vertex with the next free stable index.
    pub fn add_vertex(&mut self, payload: N) -> VertexId {
        let index = self.next_vertex_index;
        self.add_vertex_with_index(index, payload)
    }

    /// Adds a vertex with an explicit stable index.
    ///
    /// Indices are not required to be unique; the engine copies whatever the
    /// caller supplies. Later [`add_vertex`](Self::add_vertex) calls continue
    /// above the largest index seen so far.
    pub fn add_vertex_with_index(&mut self, index: u32, payload: N) -> VertexId {
        let id = VertexId::from_slot(self.vertices.len());
        self.vertices.push(VertexRecord { index, payload });
        self.incidence.push(Vec::new());
        self.next_vertex_index = self.next_vertex_index.max(index.saturating_add(1));
        id
    }

    /// Adds an edge between `a` and `b` with the next free stable index.
    pub fn add_edge(&mut self, a: VertexId, b: VertexId, payload: E) -> Result<EdgeId, GraphError> {
        let index = self.next_edge_index;
        self.add_edge_with_index(a, b, index, payload)
    }

    /// Adds an edge with an explicit stable index.
    pub fn add_edge_with_index(
        &mut self,
        a: VertexId,
        b: VertexId,
        index: u32,
        payload: E,
    ) -> Result<EdgeId, GraphError> {
        for v in [a, b] {
            if v.slot() >= self.vertices.len() {
                return Err(GraphError::UnknownVertex(v));
            }
        }
        let id = EdgeId::from_slot(self.edges.len());
        self.edges.push(EdgeRecord {
            index,
            ends: [a, b],
            payload,
        });
        self.incidence[a.slot()].push(id);
        if a != b {
            self.incidence[b.slot()].push(id);
        }
        self.next_edge_index = self.next_edge_index.max(index.saturating_add(1));
        Ok(id)
    }

    /// Returns the vertex record for `id`.
    pub fn vertex(&self, id: VertexId) -> Option<&VertexRecord<N>> {
        self.vertices.get(id.slot())
    }

    /// Returns the edge record for `id`.
    pub fn edge(&self, id: EdgeId) -> Option<&EdgeRecord<E>> {
        self.edges.get(id.slot())
    }

    /// Returns the payload of vertex `id`.
    pub fn vertex_payload(&self, id: VertexId) -> Option<&N> {
        self.vertex(id).map(|v| &v.payload)
    }

    /// Returns a mutable reference to the payload of vertex `id`.
    pub fn vertex_payload_mut(&mut self, id: VertexId) -> Option<&mut N> {
        self.vertices.get_mut(id.slot()).map(|v| &mut v.payload)
    }

    /// Returns the payload of edge `id`.
    pub fn edge_payload(&self, id: EdgeId) -> Option<&E> {
        self.edge(id).map(|e| &e.payload)
    }

    /// Returns a mutable reference to the payload of edge `id`.
    pub fn edge_payload_mut(&mut self, id: EdgeId) -> Option<&mut E> {
        self.edges.get_mut(id.slot()).map(|e| &mut e.payload)
    }

    /// Returns the stable index of vertex `id`.
    pub fn vertex_index(&self, id: VertexId) -> Option<u32> {
        self.vertex(id).map(|v| v.index)
    }

    /// Returns the stable index of edge `id`.
    pub fn edge_index(&self, id: EdgeId) -> Option<u32> {
        self.edge(id).map(|e| e.index)
    }

    /// Finds the first vertex carrying stable index `index`.
    pub fn find_vertex(&self, index: u32) -> Option<VertexId> {
        self.vertices
            .iter()
            .position(|v| v.index == index)
            .map(VertexId::from_slot)
    }

    /// Iterates vertex handles in arena order.
    pub fn vertices(&self) -> impl Iterator<Item = VertexId> + '_ {
        (0..self.vertices.len()).map(VertexId::from_slot)
    }

    /// Iterates edge handles in arena order.
    pub fn edges(&self) -> impl Iterator<Item = EdgeId> + '_ {
        (0..self.edges.len()).map(EdgeId::from_slot)
    }

    /// Edges incident to `v`, in insertion order. Empty for unknown handles.
    pub fn incident_edges(&self, v: VertexId) -> &[EdgeId] {
        self.incidence.get(v.slot()).map_or(&[], Vec::as_slice)
    }

    /// Number of edge ends at `v`; a self-loop counts twice.
    pub fn degree(&self, v: VertexId) -> usize {
        self.incident_edges(v)
            .iter()
            .map(|&e| match self.edge(e) {
                Some(rec) if rec.ends[0] == rec.ends[1] => 2,
                _ => 1,
            })
            .sum()
    }

    /// Neighbours of `v` through incident edges. Parallel edges repeat the
    /// neighbour; a self-loop yields `v`.
    pub fn neighbors(&self, v: VertexId) -> impl Iterator<Item = VertexId> + '_ {
        self.incident_edges(v)
            .iter()
            .filter_map(move |&e| self.edge(e).and_then(|rec| rec.opposite(v)))
    }

    /// Edges joining `a` and `b`, in insertion order.
    pub fn edges_between(&self, a: VertexId, b: VertexId) -> impl Iterator<Item = EdgeId> + '_ {
        self.incident_edges(a).iter().copied().filter(move |&e| {
            self.edge(e)
                .is_some_and(|rec| rec.ends == [a, b] || rec.ends == [b, a])
        })
    }

    /// Returns `true` when at least one edge joins `a` and `b`.
    pub fn contains_edge(&self, a: VertexId, b: VertexId) -> bool {
        self.edges_between(a, b).next().is_some()
    }

    /// Iterates `(handle, record)` pairs for all vertices.
    pub fn iter_vertices(&self) -> impl Iterator<Item = (VertexId, &VertexRecord<N>)> {
        self.vertices
            .iter()
            .enumerate()
            .map(|(slot, rec)| (VertexId::from_slot(slot), rec))
    }

    /// Iterates `(handle, record)` pairs for all edges.
    pub fn iter_edges(&self) -> impl Iterator<Item = (EdgeId, &EdgeRecord<E>)> {
        self.edges
            .iter()
            .enumerate()
            .map(|(slot, rec)| (EdgeId::from_slot(slot), rec))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn indices_continue_above_explicit_maximum() {
        let mut g: Graph<&str> = Graph::new();
        let a = g.add_vertex("a");
        let b = g.add_vertex_with_index(10, "b");
        let c = g.add_vertex("c");
        assert_eq!(g.vertex_index(a), Some(0));
        assert_eq!(g.vertex_index(b), Some(10));
        assert_eq!(g.vertex_index(c), Some(11));
        assert_eq!(g.find_vertex(10), Some(b));
    }

    #[test]
    fn add_edge_rejects_unknown_endpoint() {
        let mut g: Graph = Graph::new();
        let a = g.add_vertex(());
        let err = g.add_edge(a, VertexId(7), ()).unwrap_err();
        assert_eq!(err, GraphError::UnknownVertex(VertexId(7)));
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn multigraph_adjacency_queries() {
        let mut g: Graph = Graph::new();
        let a = g.add_vertex(());
        let b = g.add_vertex(());
        let e0 = g.add_edge(a, b, ()).unwrap();
        let e1 = g.add_edge(b, a, ()).unwrap();
        let lp = g.add_edge(a, a, ()).unwrap();

        assert_eq!(g.edges_between(a, b).collect::<Vec<_>>(), vec![e0, e1]);
        assert_eq!(g.edges_between(a, a).collect::<Vec<_>>(), vec![lp]);
        assert_eq!(g.degree(a), 4);
        assert_eq!(g.degree(b), 2);
        assert_eq!(g.neighbors(b).collect::<Vec<_>>(), vec![a, a]);
        assert_eq!(g.edge(e1).unwrap().end_at(a), Some(1));
    }
}
