// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Compiled rewrite rules.
use crate::context::{
    EdgeCheckFn, EdgeCreateFn, EdgeRemoveFn, MatchCheckFn, NodeCheckFn, NodeCreateFn,
    NodeRemoveFn, RuleDomain,
};
use crate::ident::{RuleId, Tag};
use crate::pattern::PatternShape;

/// Role of a pattern element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementKind {
    /// Must match and is kept.
    Env,
    /// Must match and is deleted by the rewrite.
    Cut,
    /// Introduced by the rewrite; takes no part in matching.
    New,
}

pub(crate) struct MatchNode<D: RuleDomain> {
    pub(crate) kind: ElementKind,
    pub(crate) tag: Tag,
    pub(crate) check: Option<NodeCheckFn<D>>,
    pub(crate) remove: Option<NodeRemoveFn<D>>,
}

pub(crate) struct MatchEdge<D: RuleDomain> {
    pub(crate) kind: ElementKind,
    pub(crate) tag: Tag,
    /// Match node indices.
    pub(crate) ends: [usize; 2],
    pub(crate) check: Option<EdgeCheckFn<D>>,
    pub(crate) remove: Option<EdgeRemoveFn<D>>,
}

pub(crate) struct NewNode<D: RuleDomain> {
    pub(crate) tag: Tag,
    pub(crate) create: Option<NodeCreateFn<D>>,
}

/// Endpoint of a New edge: a matched host vertex or a vertex created by the
/// same application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Endpoint {
    Matched(usize),
    Created(usize),
}

pub(crate) struct NewEdge<D: RuleDomain> {
    pub(crate) tag: Tag,
    pub(crate) ends: [Endpoint; 2],
    /// Per end, the Cut match edge whose vacated port this edge takes over.
    pub(crate) ports: [Option<usize>; 2],
    pub(crate) create: Option<EdgeCreateFn<D>>,
}

/// An immutable rewrite rule, produced by
/// [`RuleBuilder::end`](crate::RuleBuilder::end).
///
/// Match nodes are numbered in declaration order with New nodes skipped; a
/// [`VertexMatching`](crate::VertexMatching) for this rule lists host
/// vertices in that order. Match edges follow the same convention.
pub struct Rule<D: RuleDomain> {
    pub(crate) id: RuleId,
    pub(crate) name: Option<String>,
    pub(crate) match_nodes: Vec<MatchNode<D>>,
    pub(crate) match_edges: Vec<MatchEdge<D>>,
    pub(crate) new_nodes: Vec<NewNode<D>>,
    pub(crate) new_edges: Vec<NewEdge<D>>,
    pub(crate) shape: PatternShape,
    /// Permutations of match nodes that map the whole rule onto itself;
    /// the identity comes first.
    pub(crate) automorphisms: Vec<Vec<usize>>,
    pub(crate) match_check: Option<MatchCheckFn<D>>,
    pub(crate) has_potential_loop: bool,
    pub(crate) has_deletes: bool,
}

impl<D: RuleDomain> Rule<D> {
    /// Identifier assigned at registration.
    pub fn id(&self) -> RuleId {
        self.id
    }

    /// Optional name given with [`RuleBuilder::named`](crate::RuleBuilder::named).
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// `true` when a non-trivial automorphism maps the rule onto itself, in
    /// which case matches are deduplicated up to that symmetry.
    pub fn is_symmetric(&self) -> bool {
        self.automorphisms.len() > 1
    }

    /// Size of the rule's automorphism group (at least one).
    pub fn automorphism_count(&self) -> usize {
        self.automorphisms.len()
    }

    /// `true` when some New edge splices vacated ports at both ends, which is
    /// the only way a rewrite can close a cycle among ports.
    pub fn has_potential_loop(&self) -> bool {
        self.has_potential_loop
    }

    /// `true` when the rule cuts at least one vertex or edge.
    pub fn has_deletes(&self) -> bool {
        self.has_deletes
    }

    /// Number of pattern vertices a match must bind.
    pub fn match_node_count(&self) -> usize {
        self.match_nodes.len()
    }

    /// Number of pattern edges a match must bind.
    pub fn match_edge_count(&self) -> usize {
        self.match_edges.len()
    }

    /// Number of vertices each application creates.
    pub fn new_node_count(&self) -> usize {
        self.new_nodes.len()
    }

    /// Number of edges each application creates.
    pub fn new_edge_count(&self) -> usize {
        self.new_edges.len()
    }

    /// Kind and tag of match node `index`.
    pub fn match_node(&self, index: usize) -> Option<(ElementKind, Tag)> {
        self.match_nodes.get(index).map(|n| (n.kind, n.tag))
    }

    /// Kind, tag and endpoints of match edge `index`.
    pub fn match_edge(&self, index: usize) -> Option<(ElementKind, Tag, [usize; 2])> {
        self.match_edges.get(index).map(|e| (e.kind, e.tag, e.ends))
    }

    pub(crate) fn label(&self) -> String {
        self.name
            .as_ref()
            .map_or_else(|| self.id.to_string(), |name| format!("{}({name})", self.id))
    }
}

impl<D: RuleDomain> core::fmt::Debug for Rule<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Rule")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("match_nodes", &self.match_nodes.len())
            .field("new_nodes", &self.new_nodes.len())
            .field("symmetric", &self.is_symmetric())
            .finish_non_exhaustive()
    }
}
