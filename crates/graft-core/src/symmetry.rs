// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rule automorphisms and canonical match keys.
//!
//! A permutation `σ` of the match nodes is an automorphism of a rule when it
//! preserves node kinds and tags, maps the match edges onto themselves (kind
//! and tag included), and can be extended by a tag-preserving permutation of
//! the New nodes that maps the New edges, splice ports included, onto
//! themselves. Two embeddings `f` and `f ∘ σ` then describe the same
//! occurrence. Rules are small and hand-written, so the group is found by
//! plain backtracking.
use crate::ident::{Tag, VertexId};
use crate::rule::{ElementKind, Endpoint};

/// Borrowed description of a rule's elements, enough to find its symmetries.
pub(crate) struct RuleSkeleton<'a> {
    pub(crate) nodes: &'a [(ElementKind, Tag)],
    /// Match edges as `(kind, tag, ends)`.
    pub(crate) edges: &'a [(ElementKind, Tag, [usize; 2])],
    pub(crate) new_nodes: &'a [Tag],
    /// New edges as `(tag, ends, ports)`.
    pub(crate) new_edges: &'a [(Tag, [Endpoint; 2], [Option<usize>; 2])],
}

type EdgeSig = (ElementKind, Tag);
type NewEdgeKey = (Tag, [(Endpoint, Option<usize>); 2]);

impl RuleSkeleton<'_> {
    fn signatures_between(&self, a: usize, b: usize) -> Vec<EdgeSig> {
        let mut sigs: Vec<EdgeSig> = self
            .edges
            .iter()
            .filter(|(_, _, [x, y])| (*x == a && *y == b) || (*x == b && *y == a))
            .map(|&(kind, tag, _)| (kind, tag))
            .collect();
        sigs.sort_unstable();
        sigs
    }

    /// Maps every match edge to its image under `sigma`, pairing parallel
    /// edges with equal signatures in declaration order.
    fn edge_image(&self, sigma: &[usize]) -> Option<Vec<usize>> {
        let mut taken = vec![false; self.edges.len()];
        let mut rho = Vec::with_capacity(self.edges.len());
        for &(kind, tag, [a, b]) in self.edges {
            let (sa, sb) = (sigma[a], sigma[b]);
            let image = self.edges.iter().enumerate().position(|(j, &(k, t, [x, y]))| {
                !taken[j] && k == kind && t == tag && ((x == sa && y == sb) || (x == sb && y == sa))
            })?;
            taken[image] = true;
            rho.push(image);
        }
        Some(rho)
    }

    fn new_edge_key(
        tag: Tag,
        ends: [Endpoint; 2],
        ports: [Option<usize>; 2],
    ) -> NewEdgeKey {
        let mut sides = [(ends[0], ports[0]), (ends[1], ports[1])];
        sides.sort_unstable();
        (tag, sides)
    }

    fn new_edge_keys(&self) -> Vec<NewEdgeKey> {
        let mut keys: Vec<NewEdgeKey> = self
            .new_edges
            .iter()
            .map(|&(tag, ends, ports)| Self::new_edge_key(tag, ends, ports))
            .collect();
        keys.sort_unstable();
        keys
    }

    fn image_keys(&self, sigma: &[usize], tau: &[usize], rho: &[usize]) -> Vec<NewEdgeKey> {
        let map_end = |end: Endpoint| match end {
            Endpoint::Matched(i) => Endpoint::Matched(sigma[i]),
            Endpoint::Created(k) => Endpoint::Created(tau[k]),
        };
        let mut keys: Vec<NewEdgeKey> = self
            .new_edges
            .iter()
            .map(|&(tag, [a, b], [pa, pb])| {
                Self::new_edge_key(
                    tag,
                    [map_end(a), map_end(b)],
                    [pa.map(|p| rho[p]), pb.map(|p| rho[p])],
                )
            })
            .collect();
        keys.sort_unstable();
        keys
    }

    /// Looks for a tag-preserving permutation of New nodes completing `sigma`.
    fn extends(&self, sigma: &[usize], rho: &[usize], target: &[NewEdgeKey]) -> bool {
        let n = self.new_nodes.len();
        let mut tau = vec![0; n];
        let mut used = vec![false; n];
        self.extend_tau(0, &mut tau, &mut used, sigma, rho, target)
    }

    fn extend_tau(
        &self,
        k: usize,
        tau: &mut [usize],
        used: &mut [bool],
        sigma: &[usize],
        rho: &[usize],
        target: &[NewEdgeKey],
    ) -> bool {
        if k == self.new_nodes.len() {
            return self.image_keys(sigma, tau, rho) == target;
        }
        for j in 0..self.new_nodes.len() {
            if used[j] || self.new_nodes[j] != self.new_nodes[k] {
                continue;
            }
            used[j] = true;
            tau[k] = j;
            if self.extend_tau(k + 1, tau, used, sigma, rho, target) {
                return true;
            }
            used[j] = false;
        }
        false
    }

    fn permute(
        &self,
        i: usize,
        sigma: &mut Vec<usize>,
        used: &mut [bool],
        target: &[NewEdgeKey],
        out: &mut Vec<Vec<usize>>,
    ) {
        let n = self.nodes.len();
        if i == n {
            if let Some(rho) = self.edge_image(sigma) {
                if self.extends(sigma, &rho, target) {
                    out.push(sigma.clone());
                }
            }
            return;
        }
        for j in 0..n {
            if used[j] || self.nodes[j] != self.nodes[i] {
                continue;
            }
            let consistent = (0..i)
                .all(|k| self.signatures_between(i, k) == self.signatures_between(j, sigma[k]));
            if !consistent {
                continue;
            }
            used[j] = true;
            sigma.push(j);
            self.permute(i + 1, sigma, used, target, out);
            sigma.pop();
            used[j] = false;
        }
    }
}

/// All automorphisms of the rule, identity first.
pub(crate) fn automorphisms(rule: &RuleSkeleton<'_>) -> Vec<Vec<usize>> {
    let target = rule.new_edge_keys();
    let mut out = Vec::new();
    let mut used = vec![false; rule.nodes.len()];
    rule.permute(0, &mut Vec::new(), &mut used, &target, &mut out);
    // Lexicographic enumeration yields the identity first.
    debug_assert!(out
        .first()
        .is_some_and(|id| id.iter().enumerate().all(|(i, &v)| i == v)));
    out
}

/// Smallest vertex sequence among the images of `vertices` under `group`.
///
/// Every embedding in one symmetry class maps to the same key.
pub(crate) fn canonical_key(group: &[Vec<usize>], vertices: &[VertexId]) -> Vec<VertexId> {
    group
        .iter()
        .map(|sigma| sigma.iter().map(|&i| vertices[i]).collect::<Vec<_>>())
        .min()
        .unwrap_or_else(|| vertices.to_vec())
}
