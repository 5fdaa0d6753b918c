// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Backtracking subgraph-isomorphism search.
//!
//! The search is VF2-flavoured: pattern vertices are visited in a fixed order
//! (highest degree first, then vertices adjacent to those already placed),
//! candidates for a vertex come from the neighbourhood of an already-mapped
//! neighbour, and every partial mapping is kept induced. Equivalence of
//! vertices and edges is delegated to an [`Equivalence`] implementation so
//! the same search serves host matching and rule-versus-rule conflict
//! analysis.
use core::ops::ControlFlow;

use rustc_hash::FxHashSet;

use crate::context::{HostGraph, MatchCtx, RuleDomain};
use crate::ident::{EdgeId, RuleId, VertexId};
use crate::pattern::{PatternShape, Target};
use crate::rule::Rule;
use crate::symmetry;

/// One embedding of a rule's match pattern into a host graph.
///
/// `vertices()[i]` is the host vertex bound to match node `i` and
/// `edges()[j]` the host edge bound to match edge `j`. A matching built with
/// [`from_vertices`](Self::from_vertices) carries no edges; they are resolved
/// when the matching is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VertexMatching {
    vertices: Vec<VertexId>,
    edges: Vec<EdgeId>,
}

impl VertexMatching {
    /// Creates a matching with explicit edge bindings.
    pub fn new(vertices: Vec<VertexId>, edges: Vec<EdgeId>) -> Self {
        Self { vertices, edges }
    }

    /// Creates a matching from vertex bindings only.
    pub fn from_vertices(vertices: Vec<VertexId>) -> Self {
        Self {
            vertices,
            edges: Vec::new(),
        }
    }

    /// Host vertices, one per match node.
    pub fn vertices(&self) -> &[VertexId] {
        &self.vertices
    }

    /// Host edges, one per match edge (empty when not yet resolved).
    pub fn edges(&self) -> &[EdgeId] {
        &self.edges
    }

    /// Host vertex bound to match node `index`.
    pub fn vertex(&self, index: usize) -> Option<VertexId> {
        self.vertices.get(index).copied()
    }

    /// Host edge bound to match edge `index`.
    pub fn edge(&self, index: usize) -> Option<EdgeId> {
        self.edges.get(index).copied()
    }
}

// =============================================================================
// Generic search
// =============================================================================

/// Decides which pattern/target pairs are interchangeable and receives the
/// complete embeddings.
pub(crate) trait Equivalence {
    fn vertex(&mut self, pattern: usize, target: usize) -> bool;
    fn edge(&mut self, pattern: usize, target: usize) -> bool;
    /// `vertices[i]` / `edges[j]` are the target slots of pattern vertex `i`
    /// and pattern edge `j`.
    fn accept(&mut self, vertices: &[usize], edges: &[usize]) -> ControlFlow<()>;
}

/// Visit order: highest-degree vertex first, then repeatedly the vertex with
/// the most links into the visited set. Each entry carries the earliest
/// visited neighbour, used to seed candidates.
fn visit_order(pattern: &PatternShape) -> Vec<(usize, Option<usize>)> {
    let n = pattern.order();
    let mut placed = vec![false; n];
    let mut links = vec![0usize; n];
    let mut order: Vec<(usize, Option<usize>)> = Vec::with_capacity(n);
    for _ in 0..n {
        let Some(next) = (0..n)
            .filter(|&v| !placed[v])
            .max_by_key(|&v| (links[v], pattern.degree(v), core::cmp::Reverse(v)))
        else {
            break;
        };
        let anchor = order
            .iter()
            .map(|&(v, _)| v)
            .find(|&v| pattern.edges_between(v, next).next().is_some());
        placed[next] = true;
        for u in pattern.neighbors(next) {
            links[u] += 1;
        }
        order.push((next, anchor));
    }
    order
}

struct Search<'a, T> {
    pattern: &'a PatternShape,
    target: &'a T,
    order: Vec<(usize, Option<usize>)>,
    pattern_reach: Vec<usize>,
    image: Vec<Option<usize>>,
    used: Vec<bool>,
    edge_image: Vec<Option<usize>>,
}

/// Enumerates induced embeddings of `pattern` into `target`, stopping early
/// when `eq.accept` breaks.
///
/// A pattern with `k` parallel edges between two vertices needs at least `k`
/// target edges between their images; pattern edges are assigned to
/// distinct target edges accepted by `eq.edge`. For each vertex mapping only
/// the first valid edge assignment is reported.
pub(crate) fn search<T: Target, Q: Equivalence>(
    pattern: &PatternShape,
    target: &T,
    eq: &mut Q,
) -> ControlFlow<()> {
    let mut state = Search {
        pattern,
        target,
        order: visit_order(pattern),
        pattern_reach: (0..pattern.order())
            .map(|v| pattern.distinct_neighbors(v).len())
            .collect(),
        image: vec![None; pattern.order()],
        used: vec![false; target.order()],
        edge_image: vec![None; pattern.edge_count()],
    };
    state.extend(0, eq)
}

impl<T: Target> Search<'_, T> {
    fn extend<Q: Equivalence>(&mut self, depth: usize, eq: &mut Q) -> ControlFlow<()> {
        let Some(&(p, anchor)) = self.order.get(depth) else {
            let vertices: Vec<usize> = self.image.iter().flatten().copied().collect();
            let edges: Vec<usize> = self.edge_image.iter().flatten().copied().collect();
            debug_assert_eq!(vertices.len(), self.pattern.order());
            debug_assert_eq!(edges.len(), self.pattern.edge_count());
            return eq.accept(&vertices, &edges);
        };

        let candidates: Vec<usize> = match anchor.and_then(|a| self.image[a]) {
            Some(seed) => self.target.distinct_neighbors(seed),
            None => (0..self.target.order()).collect(),
        };

        for t in candidates {
            if self.used[t] {
                continue;
            }
            if self.target.distinct_neighbors(t).len() < self.pattern_reach[p] {
                continue;
            }
            let Some(assigned) = self.fit(p, t, eq) else {
                continue;
            };
            self.image[p] = Some(t);
            self.used[t] = true;
            for &(pe, te) in &assigned {
                self.edge_image[pe] = Some(te);
            }
            let flow = self.extend(depth + 1, eq);
            for &(pe, _) in &assigned {
                self.edge_image[pe] = None;
            }
            self.used[t] = false;
            self.image[p] = None;
            flow?;
        }
        ControlFlow::Continue(())
    }

    /// Checks that mapping pattern vertex `p` to target vertex `t` keeps the
    /// partial embedding induced and assigns the pattern edges to already
    /// mapped neighbours.
    fn fit<Q: Equivalence>(&self, p: usize, t: usize, eq: &mut Q) -> Option<Vec<(usize, usize)>> {
        let mut pairs = Vec::new();
        for (q, image) in self.image.iter().enumerate() {
            let Some(u) = *image else { continue };
            let pattern_edges: Vec<usize> = self.pattern.edges_between(p, q).collect();
            let target_edges: Vec<usize> = self.target.edges_between(t, u).collect();
            if pattern_edges.len() > target_edges.len()
                || (pattern_edges.is_empty() && !target_edges.is_empty())
            {
                return None;
            }
            pairs.push((pattern_edges, target_edges));
        }
        if !eq.vertex(p, t) {
            return None;
        }
        let mut assigned = Vec::new();
        for (pattern_edges, target_edges) in &pairs {
            let mut taken = vec![false; target_edges.len()];
            let mut chosen = Vec::with_capacity(pattern_edges.len());
            if !assign_edges(pattern_edges, target_edges, &mut taken, &mut chosen, eq) {
                return None;
            }
            assigned.extend(pattern_edges.iter().copied().zip(chosen));
        }
        Some(assigned)
    }
}

/// Injective assignment of parallel pattern edges onto parallel target edges.
fn assign_edges<Q: Equivalence>(
    pattern_edges: &[usize],
    target_edges: &[usize],
    taken: &mut [bool],
    chosen: &mut Vec<usize>,
    eq: &mut Q,
) -> bool {
    let Some((&pe, rest)) = pattern_edges.split_first() else {
        return true;
    };
    for (i, &te) in target_edges.iter().enumerate() {
        if taken[i] || !eq.edge(pe, te) {
            continue;
        }
        taken[i] = true;
        chosen.push(te);
        if assign_edges(rest, target_edges, taken, chosen, eq) {
            return true;
        }
        chosen.pop();
        taken[i] = false;
    }
    false
}

// =============================================================================
// Host matching
// =============================================================================

struct HostEquivalence<'r, 'c, D: RuleDomain> {
    rule: &'r Rule<D>,
    ctx: MatchCtx<'c, D>,
    seen: FxHashSet<Vec<VertexId>>,
    found: Vec<VertexMatching>,
    limit: Option<usize>,
}

impl<D: RuleDomain> Equivalence for HostEquivalence<'_, '_, D> {
    fn vertex(&mut self, pattern: usize, target: usize) -> bool {
        self.rule.match_nodes[pattern]
            .check
            .as_ref()
            .is_none_or(|check| check(&mut self.ctx, VertexId::from_slot(target)))
    }

    fn edge(&mut self, pattern: usize, target: usize) -> bool {
        self.rule.match_edges[pattern]
            .check
            .as_ref()
            .is_none_or(|check| check(&mut self.ctx, EdgeId::from_slot(target)))
    }

    fn accept(&mut self, vertices: &[usize], edges: &[usize]) -> ControlFlow<()> {
        let matching = VertexMatching::new(
            vertices.iter().copied().map(VertexId::from_slot).collect(),
            edges.iter().copied().map(EdgeId::from_slot).collect(),
        );
        if let Some(check) = &self.rule.match_check {
            if !check(&mut self.ctx, &matching) {
                return ControlFlow::Continue(());
            }
        }
        if self.rule.is_symmetric() {
            let key = symmetry::canonical_key(&self.rule.automorphisms, &matching.vertices);
            if !self.seen.insert(key) {
                return ControlFlow::Continue(());
            }
        }
        self.found.push(matching);
        if self.limit.is_some_and(|limit| self.found.len() >= limit) {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Finds the embeddings of `rule` in `host`, one per logical occurrence.
pub(crate) fn find_matches<D: RuleDomain>(
    rule: &Rule<D>,
    id: RuleId,
    host: &HostGraph<D>,
    state: &mut D::MatchState,
    limit: Option<usize>,
) -> Vec<VertexMatching> {
    if limit == Some(0) {
        return Vec::new();
    }
    let mut eq = HostEquivalence {
        rule,
        ctx: MatchCtx {
            host,
            rule: id,
            state,
        },
        seen: FxHashSet::default(),
        found: Vec::new(),
        limit,
    };
    let _ = search(&rule.shape, host, &mut eq);
    eq.found
}
