// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Footprints and independence checks for batches of applications.
//!
//! A footprint summarises what one application of a rule reads and writes in
//! the host graph. Reads are the elements it keeps (Env vertices and edges);
//! writes are the elements it removes (Cut vertices, Cut edges, and every
//! edge incident to a Cut vertex). Two applications are independent when
//! neither writes anything the other touches. The static
//! [`ConflictSet`](crate::ConflictSet) answers the same question per rule
//! pair; footprints answer it per concrete match.
use std::collections::BTreeSet;

use crate::context::{HostGraph, RuleDomain};
use crate::ident::{EdgeId, VertexId};
use crate::matcher::VertexMatching;
use crate::rule::{ElementKind, Rule};

/// Early-exit intersection check for two ordered `BTreeSet`s.
fn intersects_btree<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> bool {
    let mut it_a = a.iter();
    let mut it_b = b.iter();
    let mut va = it_a.next();
    let mut vb = it_b.next();
    while let (Some(x), Some(y)) = (va, vb) {
        match x.cmp(y) {
            core::cmp::Ordering::Less => va = it_a.next(),
            core::cmp::Ordering::Greater => vb = it_b.next(),
            core::cmp::Ordering::Equal => return true,
        }
    }
    false
}

/// Read/write sets of one application.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Footprint {
    /// Host vertices the application keeps and relies on.
    pub vertices_read: BTreeSet<VertexId>,
    /// Host vertices the application removes.
    pub vertices_written: BTreeSet<VertexId>,
    /// Host edges the application keeps and relies on.
    pub edges_read: BTreeSet<EdgeId>,
    /// Host edges the application removes, directly or with a cut vertex.
    pub edges_written: BTreeSet<EdgeId>,
}

impl Footprint {
    /// Footprint of applying `rule` at a matching whose edges are resolved.
    pub(crate) fn of<D: RuleDomain>(
        rule: &Rule<D>,
        matching: &VertexMatching,
        host: &HostGraph<D>,
    ) -> Self {
        let mut fp = Self::default();
        for (node, &v) in rule.match_nodes.iter().zip(matching.vertices()) {
            if node.kind == ElementKind::Cut {
                fp.vertices_written.insert(v);
                fp.edges_written.extend(host.incident_edges(v).iter().copied());
            } else {
                fp.vertices_read.insert(v);
            }
        }
        for (edge, &e) in rule.match_edges.iter().zip(matching.edges()) {
            if edge.kind == ElementKind::Cut {
                fp.edges_written.insert(e);
            } else {
                fp.edges_read.insert(e);
            }
        }
        fp
    }

    /// Returns `true` when neither footprint writes what the other touches.
    pub fn independent(&self, other: &Self) -> bool {
        if intersects_btree(&self.vertices_written, &other.vertices_written)
            || intersects_btree(&self.vertices_written, &other.vertices_read)
            || intersects_btree(&other.vertices_written, &self.vertices_read)
        {
            return false;
        }
        !(intersects_btree(&self.edges_written, &other.edges_written)
            || intersects_btree(&self.edges_written, &other.edges_read)
            || intersects_btree(&other.edges_written, &self.edges_read))
    }

    /// Returns `true` when the application removes nothing.
    pub fn is_read_only(&self) -> bool {
        self.vertices_written.is_empty() && self.edges_written.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fp(vr: &[u32], vw: &[u32], er: &[u32], ew: &[u32]) -> Footprint {
        Footprint {
            vertices_read: vr.iter().map(|&v| VertexId(v)).collect(),
            vertices_written: vw.iter().map(|&v| VertexId(v)).collect(),
            edges_read: er.iter().map(|&e| EdgeId(e)).collect(),
            edges_written: ew.iter().map(|&e| EdgeId(e)).collect(),
        }
    }

    #[test]
    fn shared_reads_are_independent() {
        let a = fp(&[0, 1], &[], &[0], &[]);
        let b = fp(&[1, 2], &[], &[0], &[]);
        assert!(a.independent(&b));
        assert!(a.is_read_only());
    }

    #[test]
    fn write_against_read_or_write_conflicts() {
        let reader = fp(&[3], &[], &[], &[]);
        let writer = fp(&[], &[3], &[], &[]);
        assert!(!reader.independent(&writer));
        assert!(!writer.independent(&reader));
        assert!(!writer.independent(&writer.clone()));

        let edge_reader = fp(&[], &[], &[7], &[]);
        let edge_writer = fp(&[], &[], &[], &[7]);
        assert!(!edge_reader.independent(&edge_writer));
    }
}
