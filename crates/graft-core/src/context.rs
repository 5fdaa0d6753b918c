// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Caller domain binding and the contexts handed to rule callbacks.
use crate::graph::Graph;
use crate::ident::{EdgeId, RuleId, VertexId};
use crate::matcher::VertexMatching;

/// Binds the caller's payload and state types to a rule system.
///
/// The engine never inspects payloads or states. Payloads must be `Clone`
/// (surviving elements are copied into the output graph) and `Default`
/// (created elements start from the default value and are initialised by
/// create callbacks).
pub trait RuleDomain {
    /// Vertex payload.
    type Node: Clone + Default;
    /// Edge payload.
    type Edge: Clone + Default;
    /// User context threaded through check and whole-match callbacks.
    type MatchState;
    /// User context threaded through remove and create callbacks.
    type RewriteState;
}

/// Domain with unit payloads and states, for purely structural rewriting.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl RuleDomain for Plain {
    type Node = ();
    type Edge = ();
    type MatchState = ();
    type RewriteState = ();
}

/// Graph type carrying a domain's payloads.
pub type HostGraph<D> = Graph<<D as RuleDomain>::Node, <D as RuleDomain>::Edge>;

/// Context for check and whole-match callbacks during matching.
pub struct MatchCtx<'a, D: RuleDomain> {
    /// Graph being searched.
    pub host: &'a HostGraph<D>,
    /// Rule whose pattern is being matched.
    pub rule: RuleId,
    /// Caller state.
    pub state: &'a mut D::MatchState,
}

/// Context for remove callbacks, invoked while cuts are applied.
pub struct CutCtx<'a, D: RuleDomain> {
    /// Graph being rewritten; unchanged by the rewrite.
    pub host: &'a HostGraph<D>,
    /// Match that requested the removal.
    pub matching: &'a VertexMatching,
    /// Rule that requested the removal.
    pub rule: RuleId,
    /// Caller state.
    pub state: &'a mut D::RewriteState,
}

/// Context for create callbacks, invoked once the output graph is assembled.
pub struct RewriteCtx<'a, D: RuleDomain> {
    /// Graph being rewritten; unchanged by the rewrite.
    pub host: &'a HostGraph<D>,
    /// Output graph. All created vertices exist before any edge callback runs.
    pub output: &'a mut HostGraph<D>,
    /// Match that produced the element.
    pub matching: &'a VertexMatching,
    /// Rule that produced the element.
    pub rule: RuleId,
    /// Caller state.
    pub state: &'a mut D::RewriteState,
}

/// Vertex predicate: may the pattern vertex match this host vertex?
pub type NodeCheckFn<D> = Box<dyn Fn(&mut MatchCtx<'_, D>, VertexId) -> bool + Send + Sync>;
/// Edge predicate: may the pattern edge match this host edge?
pub type EdgeCheckFn<D> = Box<dyn Fn(&mut MatchCtx<'_, D>, EdgeId) -> bool + Send + Sync>;
/// Whole-match predicate, run once per complete embedding.
pub type MatchCheckFn<D> =
    Box<dyn Fn(&mut MatchCtx<'_, D>, &VertexMatching) -> bool + Send + Sync>;
/// Called with the host vertex removed by a Cut pattern vertex.
pub type NodeRemoveFn<D> = Box<dyn Fn(&mut CutCtx<'_, D>, VertexId) + Send + Sync>;
/// Called with the host edge removed by a Cut pattern edge.
pub type EdgeRemoveFn<D> = Box<dyn Fn(&mut CutCtx<'_, D>, EdgeId) + Send + Sync>;
/// Called with the output vertex created for a New pattern vertex.
pub type NodeCreateFn<D> = Box<dyn Fn(&mut RewriteCtx<'_, D>, VertexId) + Send + Sync>;
/// Called with the output edge created for a New pattern edge.
pub type EdgeCreateFn<D> = Box<dyn Fn(&mut RewriteCtx<'_, D>, EdgeId) + Send + Sync>;
