// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Static conflict analysis between rule pairs.
//!
//! `(A, B)` conflicts when some induced sub-pattern of `A` embeds into the
//! pattern of `B` (tags only) so that an element `A` relies on (Env vertex
//! or Env edge) lands on an element `B` deletes. Applying a match of `B` can
//! then invalidate a simultaneous match of `A`. The relation is directed:
//! `(A, B)` does not imply `(B, A)`.
use core::ops::ControlFlow;
use std::collections::BTreeSet;

use crate::context::RuleDomain;
use crate::ident::RuleId;
use crate::matcher::{self, Equivalence};
use crate::pattern::{PatternShape, Target};
use crate::rule::{ElementKind, Rule};

/// Ordered set of conflicting rule pairs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictSet(BTreeSet<(RuleId, RuleId)>);

impl ConflictSet {
    /// Records that `victim` relies on elements `cutter` may delete.
    pub(crate) fn insert(&mut self, victim: RuleId, cutter: RuleId) {
        self.0.insert((victim, cutter));
    }

    /// Returns `true` when `(victim, cutter)` was recorded.
    pub fn contains(&self, victim: RuleId, cutter: RuleId) -> bool {
        self.0.contains(&(victim, cutter))
    }

    /// Returns `true` when either direction was recorded.
    pub fn either(&self, a: RuleId, b: RuleId) -> bool {
        self.contains(a, b) || self.contains(b, a)
    }

    /// Iterates the recorded pairs in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (RuleId, RuleId)> + '_ {
        self.0.iter().copied()
    }

    /// Returns `true` when no pair was recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of recorded pairs.
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

struct Overlap<'a, D: RuleDomain> {
    victim: &'a Rule<D>,
    cutter: &'a Rule<D>,
    /// Victim vertex slot of each sub-pattern vertex.
    vertex_origin: &'a [usize],
    /// Victim edge slot of each sub-pattern edge.
    edge_origin: &'a [usize],
}

impl<D: RuleDomain> Equivalence for Overlap<'_, D> {
    fn vertex(&mut self, pattern: usize, target: usize) -> bool {
        self.victim.match_nodes[self.vertex_origin[pattern]].tag
            == self.cutter.match_nodes[target].tag
    }

    fn edge(&mut self, pattern: usize, target: usize) -> bool {
        self.victim.match_edges[self.edge_origin[pattern]].tag
            == self.cutter.match_edges[target].tag
    }

    fn accept(&mut self, vertices: &[usize], edges: &[usize]) -> ControlFlow<()> {
        let vertex_hit = vertices.iter().enumerate().any(|(p, &t)| {
            self.victim.match_nodes[self.vertex_origin[p]].kind == ElementKind::Env
                && self.cutter.match_nodes[t].kind == ElementKind::Cut
        });
        let edge_hit = edges.iter().enumerate().any(|(p, &t)| {
            self.victim.match_edges[self.edge_origin[p]].kind == ElementKind::Env
                && self.cutter.match_edges[t].kind == ElementKind::Cut
        });
        if vertex_hit || edge_hit {
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    }
}

/// Lexicographic `k`-subsets of `0..n`.
fn for_each_subset(n: usize, k: usize, mut visit: impl FnMut(&[usize]) -> ControlFlow<()>) {
    if k > n {
        return;
    }
    let mut subset: Vec<usize> = (0..k).collect();
    loop {
        if visit(&subset).is_break() {
            return;
        }
        let Some(i) = (0..k).rev().find(|&i| subset[i] < n - k + i) else {
            return;
        };
        subset[i] += 1;
        for j in i + 1..k {
            subset[j] = subset[j - 1] + 1;
        }
    }
}

/// Whether `victim`'s assumptions can be invalidated by `cutter`'s deletions.
///
/// Sub-patterns are tried from the whole pattern down to single vertices;
/// the first witness ends the search.
pub(crate) fn conflicts<D: RuleDomain>(victim: &Rule<D>, cutter: &Rule<D>) -> bool {
    if !victim.has_deletes && !cutter.has_deletes {
        return false;
    }
    let n = victim.match_nodes.len();
    let target: &PatternShape = &cutter.shape;
    if target.order() == 0 {
        return false;
    }
    let mut found = false;
    for k in (1..=n).rev() {
        for_each_subset(n, k, |subset| {
            let (sub, edge_origin) = victim.shape.induced(subset);
            let relies = subset
                .iter()
                .any(|&v| victim.match_nodes[v].kind == ElementKind::Env)
                || edge_origin
                    .iter()
                    .any(|&e| victim.match_edges[e].kind == ElementKind::Env);
            if !relies {
                return ControlFlow::Continue(());
            }
            let mut overlap = Overlap {
                victim,
                cutter,
                vertex_origin: subset,
                edge_origin: &edge_origin,
            };
            if matcher::search(&sub, target, &mut overlap).is_break() {
                found = true;
                return ControlFlow::Break(());
            }
            ControlFlow::Continue(())
        });
        if found {
            break;
        }
    }
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect(n: usize, k: usize) -> Vec<Vec<usize>> {
        let mut out = Vec::new();
        for_each_subset(n, k, |s| {
            out.push(s.to_vec());
            ControlFlow::Continue(())
        });
        out
    }

    #[test]
    fn subsets_are_lexicographic() {
        assert_eq!(
            collect(4, 2),
            vec![
                vec![0, 1],
                vec![0, 2],
                vec![0, 3],
                vec![1, 2],
                vec![1, 3],
                vec![2, 3]
            ]
        );
        assert_eq!(collect(3, 3), vec![vec![0, 1, 2]]);
        assert!(collect(2, 3).is_empty());
    }

    #[test]
    fn conflict_set_is_directed() {
        let mut set = ConflictSet::default();
        set.insert(RuleId(0), RuleId(1));
        assert!(set.contains(RuleId(0), RuleId(1)));
        assert!(!set.contains(RuleId(1), RuleId(0)));
        assert!(set.either(RuleId(1), RuleId(0)));
        assert_eq!(set.len(), 1);
    }
}
