// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Declarative construction of rewrite rules.
use thiserror::Error;
use tracing::debug;

use crate::context::{
    CutCtx, EdgeCheckFn, EdgeCreateFn, EdgeRemoveFn, MatchCtx, MatchCheckFn, NodeCheckFn,
    NodeCreateFn, NodeRemoveFn, RewriteCtx, RuleDomain,
};
use crate::ident::{EdgeId, RuleId, Tag, VertexId};
use crate::matcher::VertexMatching;
use crate::pattern::PatternShape;
use crate::rule::{ElementKind, Endpoint, MatchEdge, MatchNode, NewEdge, NewNode, Rule};
use crate::symmetry::{self, RuleSkeleton};
use crate::system::RuleSystem;

/// Errors reported while declaring a rule.
///
/// A failing call leaves the builder unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RuleError {
    /// `end` was called before any vertex was declared.
    #[error("rule declares no vertices")]
    EmptyRule,
    /// A vertex index does not name a declared vertex.
    #[error("unknown vertex {0}")]
    UnknownNode(usize),
    /// An edge index does not name a declared edge.
    #[error("unknown edge {0}")]
    UnknownEdge(usize),
    /// Both endpoints of a connection are the same vertex.
    #[error("self-loop on vertex {0}")]
    SelfLoop(usize),
    /// A New vertex was used where a matched vertex is required.
    #[error("vertex {0} is New and cannot be matched")]
    NotMatchable(usize),
    /// A New edge was attached to a vertex the rule deletes.
    #[error("new edge cannot attach to cut vertex {0}")]
    CutEndpoint(usize),
    /// A splice port is not a Cut edge incident to its endpoint.
    #[error("edge {edge} is not a cut edge incident to vertex {node}")]
    InvalidPort {
        /// Declared edge used as the port.
        edge: usize,
        /// Endpoint the port was requested for.
        node: usize,
    },
    /// A callback does not fit the kind of the element it targets.
    #[error("{callback} callback does not apply to a {kind:?} element")]
    CallbackKind {
        /// Callback family (`check`, `remove` or `create`).
        callback: &'static str,
        /// Kind of the targeted element.
        kind: ElementKind,
    },
}

struct NodeDecl<D: RuleDomain> {
    kind: ElementKind,
    tag: Tag,
    check: Option<NodeCheckFn<D>>,
    remove: Option<NodeRemoveFn<D>>,
    create: Option<NodeCreateFn<D>>,
}

struct EdgeDecl<D: RuleDomain> {
    kind: ElementKind,
    tag: Tag,
    ends: [usize; 2],
    ports: [Option<usize>; 2],
    check: Option<EdgeCheckFn<D>>,
    remove: Option<EdgeRemoveFn<D>>,
    create: Option<EdgeCreateFn<D>>,
}

/// Accumulates vertex and edge declarations for one rule.
///
/// Obtained from [`RuleSystem::start_rule`]; [`end`](Self::end) compiles the
/// declarations, registers the rule and runs conflict analysis against every
/// registered rule.
///
/// ```
/// use graft_core::{Plain, RuleSystem};
///
/// let mut system = RuleSystem::<Plain>::new();
/// let mut rule = system.start_rule();
/// let a = rule.add_node(0);
/// let b = rule.add_node(0);
/// let edge = rule.add_cut_connection(a, b, 0)?;
/// let mid = rule.add_new_node(0);
/// rule.add_new_connection(a, mid, Some(edge), None, 0)?;
/// rule.add_new_connection(mid, b, None, Some(edge), 0)?;
/// let id = rule.end()?;
/// assert!(system.rule(id).is_some_and(|r| r.is_symmetric()));
/// # Ok::<(), graft_core::RuleError>(())
/// ```
pub struct RuleBuilder<'s, D: RuleDomain> {
    system: &'s mut RuleSystem<D>,
    name: Option<String>,
    nodes: Vec<NodeDecl<D>>,
    edges: Vec<EdgeDecl<D>>,
}

impl<'s, D: RuleDomain> RuleBuilder<'s, D> {
    pub(crate) fn new(system: &'s mut RuleSystem<D>) -> Self {
        Self {
            system,
            name: None,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Names the rule for logs and debugging.
    pub fn named(&mut self, name: impl Into<String>) -> &mut Self {
        self.name = Some(name.into());
        self
    }

    fn push_node(&mut self, kind: ElementKind, tag: Tag) -> usize {
        self.nodes.push(NodeDecl {
            kind,
            tag,
            check: None,
            remove: None,
            create: None,
        });
        self.nodes.len() - 1
    }

    /// Declares a vertex that must match and is kept.
    pub fn add_node(&mut self, tag: Tag) -> usize {
        self.push_node(ElementKind::Env, tag)
    }

    /// Declares a vertex that must match and is deleted.
    pub fn add_cut_node(&mut self, tag: Tag) -> usize {
        self.push_node(ElementKind::Cut, tag)
    }

    /// Declares a vertex created by the rewrite.
    pub fn add_new_node(&mut self, tag: Tag) -> usize {
        self.push_node(ElementKind::New, tag)
    }

    fn node_kind(&self, node: usize) -> Result<ElementKind, RuleError> {
        self.nodes
            .get(node)
            .map(|n| n.kind)
            .ok_or(RuleError::UnknownNode(node))
    }

    fn matched_pair(&self, a: usize, b: usize) -> Result<(), RuleError> {
        for n in [a, b] {
            if self.node_kind(n)? == ElementKind::New {
                return Err(RuleError::NotMatchable(n));
            }
        }
        if a == b {
            return Err(RuleError::SelfLoop(a));
        }
        Ok(())
    }

    fn push_edge(
        &mut self,
        kind: ElementKind,
        ends: [usize; 2],
        ports: [Option<usize>; 2],
        tag: Tag,
    ) -> usize {
        self.edges.push(EdgeDecl {
            kind,
            tag,
            ends,
            ports,
            check: None,
            remove: None,
            create: None,
        });
        self.edges.len() - 1
    }

    /// Declares an edge between two matched vertices that must match and is
    /// kept.
    pub fn add_connection(&mut self, a: usize, b: usize, tag: Tag) -> Result<usize, RuleError> {
        self.matched_pair(a, b)
            .inspect_err(|err| debug!(%err, "rejected connection"))?;
        Ok(self.push_edge(ElementKind::Env, [a, b], [None, None], tag))
    }

    /// Declares an edge between two matched vertices that must match and is
    /// deleted.
    pub fn add_cut_connection(&mut self, a: usize, b: usize, tag: Tag) -> Result<usize, RuleError> {
        self.matched_pair(a, b)
            .inspect_err(|err| debug!(%err, "rejected cut connection"))?;
        Ok(self.push_edge(ElementKind::Cut, [a, b], [None, None], tag))
    }

    /// Declares an edge created by the rewrite.
    ///
    /// `port_a` / `port_b` optionally name a declared Cut edge incident to the
    /// matching endpoint; the new edge then takes over the connection point
    /// that edge vacates on that endpoint (a splice).
    pub fn add_new_connection(
        &mut self,
        a: usize,
        b: usize,
        port_a: Option<usize>,
        port_b: Option<usize>,
        tag: Tag,
    ) -> Result<usize, RuleError> {
        self.created_pair([a, b], [port_a, port_b])
            .inspect_err(|err| debug!(%err, "rejected new connection"))?;
        Ok(self.push_edge(ElementKind::New, [a, b], [port_a, port_b], tag))
    }

    fn created_pair(&self, ends: [usize; 2], ports: [Option<usize>; 2]) -> Result<(), RuleError> {
        for n in ends {
            if self.node_kind(n)? == ElementKind::Cut {
                return Err(RuleError::CutEndpoint(n));
            }
        }
        if ends[0] == ends[1] {
            return Err(RuleError::SelfLoop(ends[0]));
        }
        for (node, port) in ends.into_iter().zip(ports) {
            let Some(edge) = port else { continue };
            if self.node_kind(node)? == ElementKind::New {
                return Err(RuleError::NotMatchable(node));
            }
            let decl = self.edges.get(edge).ok_or(RuleError::UnknownEdge(edge))?;
            if decl.kind != ElementKind::Cut || !decl.ends.contains(&node) {
                return Err(RuleError::InvalidPort { edge, node });
            }
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Callbacks
    // -------------------------------------------------------------------------

    fn node_mut(
        &mut self,
        node: usize,
        callback: &'static str,
        allowed: &[ElementKind],
    ) -> Result<&mut NodeDecl<D>, RuleError> {
        let decl = self
            .nodes
            .get_mut(node)
            .ok_or(RuleError::UnknownNode(node))?;
        if allowed.contains(&decl.kind) {
            Ok(decl)
        } else {
            Err(RuleError::CallbackKind {
                callback,
                kind: decl.kind,
            })
        }
    }

    fn edge_mut(
        &mut self,
        edge: usize,
        callback: &'static str,
        allowed: &[ElementKind],
    ) -> Result<&mut EdgeDecl<D>, RuleError> {
        let decl = self
            .edges
            .get_mut(edge)
            .ok_or(RuleError::UnknownEdge(edge))?;
        if allowed.contains(&decl.kind) {
            Ok(decl)
        } else {
            Err(RuleError::CallbackKind {
                callback,
                kind: decl.kind,
            })
        }
    }

    /// Sets the vertex predicate of a matched vertex.
    pub fn check_node<F>(&mut self, node: usize, check: F) -> Result<&mut Self, RuleError>
    where
        F: Fn(&mut MatchCtx<'_, D>, VertexId) -> bool + Send + Sync + 'static,
    {
        self.node_mut(node, "check", &[ElementKind::Env, ElementKind::Cut])?
            .check = Some(Box::new(check));
        Ok(self)
    }

    /// Sets the callback run when a Cut vertex removes its host vertex.
    pub fn on_remove_node<F>(&mut self, node: usize, remove: F) -> Result<&mut Self, RuleError>
    where
        F: Fn(&mut CutCtx<'_, D>, VertexId) + Send + Sync + 'static,
    {
        self.node_mut(node, "remove", &[ElementKind::Cut])?.remove = Some(Box::new(remove));
        Ok(self)
    }

    /// Sets the callback run on the output vertex created for a New vertex.
    pub fn on_create_node<F>(&mut self, node: usize, create: F) -> Result<&mut Self, RuleError>
    where
        F: Fn(&mut RewriteCtx<'_, D>, VertexId) + Send + Sync + 'static,
    {
        self.node_mut(node, "create", &[ElementKind::New])?.create = Some(Box::new(create));
        Ok(self)
    }

    /// Sets the edge predicate of a matched edge.
    pub fn check_edge<F>(&mut self, edge: usize, check: F) -> Result<&mut Self, RuleError>
    where
        F: Fn(&mut MatchCtx<'_, D>, EdgeId) -> bool + Send + Sync + 'static,
    {
        self.edge_mut(edge, "check", &[ElementKind::Env, ElementKind::Cut])?
            .check = Some(Box::new(check));
        Ok(self)
    }

    /// Sets the callback run when a Cut edge removes its host edge.
    pub fn on_remove_edge<F>(&mut self, edge: usize, remove: F) -> Result<&mut Self, RuleError>
    where
        F: Fn(&mut CutCtx<'_, D>, EdgeId) + Send + Sync + 'static,
    {
        self.edge_mut(edge, "remove", &[ElementKind::Cut])?.remove = Some(Box::new(remove));
        Ok(self)
    }

    /// Sets the callback run on the output edge created for a New edge.
    pub fn on_create_edge<F>(&mut self, edge: usize, create: F) -> Result<&mut Self, RuleError>
    where
        F: Fn(&mut RewriteCtx<'_, D>, EdgeId) + Send + Sync + 'static,
    {
        self.edge_mut(edge, "create", &[ElementKind::New])?.create = Some(Box::new(create));
        Ok(self)
    }

    // -------------------------------------------------------------------------
    // Compilation
    // -------------------------------------------------------------------------

    /// Compiles and registers the rule.
    pub fn end(self) -> Result<RuleId, RuleError> {
        self.compile(None)
    }

    /// Compiles and registers the rule with a whole-match predicate, run on
    /// every complete embedding; returning `false` discards the embedding.
    pub fn end_with_check<F>(self, check: F) -> Result<RuleId, RuleError>
    where
        F: Fn(&mut MatchCtx<'_, D>, &VertexMatching) -> bool + Send + Sync + 'static,
    {
        self.compile(Some(Box::new(check)))
    }

    fn compile(self, match_check: Option<MatchCheckFn<D>>) -> Result<RuleId, RuleError> {
        if self.nodes.is_empty() {
            debug!("rejected rule without vertices");
            return Err(RuleError::EmptyRule);
        }
        let Self {
            system,
            name,
            nodes,
            edges,
        } = self;

        // Declaration index -> slot among matched or created vertices.
        let mut node_slot = Vec::with_capacity(nodes.len());
        let mut match_nodes = Vec::new();
        let mut new_nodes = Vec::new();
        for decl in nodes {
            if decl.kind == ElementKind::New {
                node_slot.push(Endpoint::Created(new_nodes.len()));
                new_nodes.push(NewNode {
                    tag: decl.tag,
                    create: decl.create,
                });
            } else {
                node_slot.push(Endpoint::Matched(match_nodes.len()));
                match_nodes.push(MatchNode {
                    kind: decl.kind,
                    tag: decl.tag,
                    check: decl.check,
                    remove: decl.remove,
                });
            }
        }
        let matched = |decl: usize| match node_slot[decl] {
            Endpoint::Matched(i) => Ok(i),
            Endpoint::Created(_) => Err(RuleError::NotMatchable(decl)),
        };

        let mut edge_slot = vec![None; edges.len()];
        let mut match_edges = Vec::new();
        let mut new_edges = Vec::new();
        for (ix, decl) in edges.into_iter().enumerate() {
            if decl.kind == ElementKind::New {
                new_edges.push((decl.tag, decl.ends, decl.ports, decl.create));
            } else {
                edge_slot[ix] = Some(match_edges.len());
                match_edges.push(MatchEdge {
                    kind: decl.kind,
                    tag: decl.tag,
                    ends: [matched(decl.ends[0])?, matched(decl.ends[1])?],
                    check: decl.check,
                    remove: decl.remove,
                });
            }
        }
        // Ports always reference earlier Cut edges, so every slot is known here.
        let new_edges: Vec<NewEdge<D>> = new_edges
            .into_iter()
            .map(|(tag, [a, b], [pa, pb], create)| NewEdge {
                tag,
                ends: [node_slot[a], node_slot[b]],
                ports: [pa.and_then(|p| edge_slot[p]), pb.and_then(|p| edge_slot[p])],
                create,
            })
            .collect();

        let node_sigs: Vec<_> = match_nodes.iter().map(|n| (n.kind, n.tag)).collect();
        let edge_sigs: Vec<_> = match_edges.iter().map(|e| (e.kind, e.tag, e.ends)).collect();
        let new_tags: Vec<_> = new_nodes.iter().map(|n| n.tag).collect();
        let new_sigs: Vec<_> = new_edges.iter().map(|e| (e.tag, e.ends, e.ports)).collect();
        let automorphisms = symmetry::automorphisms(&RuleSkeleton {
            nodes: &node_sigs,
            edges: &edge_sigs,
            new_nodes: &new_tags,
            new_edges: &new_sigs,
        });

        let shape = PatternShape::new(
            match_nodes.len(),
            match_edges.iter().map(|e| e.ends).collect(),
        );
        let has_potential_loop = new_edges
            .iter()
            .any(|e| e.ports.iter().all(Option::is_some));
        let has_deletes = match_nodes.iter().any(|n| n.kind == ElementKind::Cut)
            || match_edges.iter().any(|e| e.kind == ElementKind::Cut);

        let rule = Rule {
            id: RuleId::from_slot(system.rule_count()),
            name,
            match_nodes,
            match_edges,
            new_nodes,
            new_edges,
            shape,
            automorphisms,
            match_check,
            has_potential_loop,
            has_deletes,
        };
        Ok(system.register(rule))
    }
}

impl<D: RuleDomain> core::fmt::Debug for RuleBuilder<'_, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuleBuilder")
            .field("name", &self.name)
            .field("nodes", &self.nodes.len())
            .field("edges", &self.edges.len())
            .finish_non_exhaustive()
    }
}
