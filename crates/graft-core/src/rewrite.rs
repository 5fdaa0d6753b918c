// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The rewrite pipeline.
//!
//! `expand → cut → insert → merge ports → merge nodes → assemble → create
//! callbacks`. Every step works on a transient [`PreGraph`]; the host graph is
//! only read and a fresh output graph is returned.
use thiserror::Error;
use tracing::{debug, trace};

use crate::context::{CutCtx, HostGraph, RewriteCtx, RuleDomain};
use crate::graph::{Graph, GraphError};
use crate::ident::{EdgeId, RuleId, VertexId};
use crate::matcher::VertexMatching;
use crate::pregraph::{PgVertex, PreGraph, Provenance};
use crate::rule::{ElementKind, Endpoint, Rule};

/// Errors reported by the rewrite entry points.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RewriteError {
    /// The rule id does not name a registered rule.
    #[error("unknown rule {0}")]
    UnknownRule(RuleId),
    /// The matching binds the wrong number of vertices.
    #[error("{rule} expects {expected} matched vertices, got {found}")]
    VertexArity {
        /// Rule being applied.
        rule: RuleId,
        /// Match nodes declared by the rule.
        expected: usize,
        /// Vertices supplied by the matching.
        found: usize,
    },
    /// The matching binds the wrong number of edges.
    #[error("{rule} expects {expected} matched edges, got {found}")]
    EdgeArity {
        /// Rule being applied.
        rule: RuleId,
        /// Match edges declared by the rule.
        expected: usize,
        /// Edges supplied by the matching.
        found: usize,
    },
    /// A vertex handle does not exist in the host graph.
    #[error("unknown host vertex {0:?}")]
    UnknownVertex(VertexId),
    /// An edge handle does not exist in the host graph.
    #[error("unknown host edge {0:?}")]
    UnknownEdge(EdgeId),
    /// A host edge bound to a pattern edge does not join the bound vertices,
    /// or no such host edge exists.
    #[error("{rule}: no host edge for pattern edge {edge}")]
    MissingEdge {
        /// Rule being applied.
        rule: RuleId,
        /// Match edge slot.
        edge: usize,
    },
    /// An application refers to a vertex or port that another application in
    /// the same batch removed.
    #[error("{rule}: application {application} uses an element removed by another application")]
    StaleMatch {
        /// Rule being applied.
        rule: RuleId,
        /// Position of the application in the batch.
        application: usize,
    },
    /// Spliced edges close an odd cycle of ports: one connection point would
    /// need two inconsistent identities.
    #[error("spliced edges close an odd cycle through {ports} ports")]
    OddCycle {
        /// Ports in the offending component.
        ports: usize,
    },
    /// A port lost its vertex or gained several, or carries several links.
    #[error("malformed port: {attachments} attachments, {links} links")]
    MalformedPort {
        /// Vertices the port hangs off.
        attachments: usize,
        /// Links the port carries.
        links: usize,
    },
    /// Building the output graph failed.
    #[error(transparent)]
    Graph(#[from] GraphError),
}

/// One `(rule, matching)` pair selected for rewriting.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Application {
    /// Rule to apply.
    pub rule: RuleId,
    /// Where to apply it.
    pub matching: VertexMatching,
}

impl Application {
    /// Pairs a rule with a matching.
    pub fn new(rule: RuleId, matching: VertexMatching) -> Self {
        Self { rule, matching }
    }
}

/// Result of a successful rewrite.
#[derive(Debug, Clone)]
pub struct Rewrite<N, E> {
    /// The output graph.
    pub graph: Graph<N, E>,
    /// Output vertices created by New pattern vertices, in creation order.
    pub created_vertices: Vec<VertexId>,
    /// Output edges created by New pattern edges, in creation order.
    pub created_edges: Vec<EdgeId>,
}

impl<N, E> Rewrite<N, E> {
    /// Discards the bookkeeping and returns the output graph.
    pub fn into_graph(self) -> Graph<N, E> {
        self.graph
    }
}

/// Pipeline switches taken from the system configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PipelineOptions {
    pub(crate) check_parity: bool,
    pub(crate) trace_pregraph: bool,
}

/// An application whose rule exists and whose matching is complete.
pub(crate) struct Resolved<'r, D: RuleDomain> {
    pub(crate) id: RuleId,
    pub(crate) rule: &'r Rule<D>,
    pub(crate) matching: VertexMatching,
}

/// Validates `app` against `rules` and `host`, resolving missing edge
/// bindings to the first unused host edges between the bound vertices.
pub(crate) fn resolve<'r, D: RuleDomain>(
    rules: &'r [Rule<D>],
    host: &HostGraph<D>,
    app: &Application,
) -> Result<Resolved<'r, D>, RewriteError> {
    let id = app.rule;
    let rule = rules.get(id.slot()).ok_or(RewriteError::UnknownRule(id))?;
    let vertices = app.matching.vertices();
    if vertices.len() != rule.match_nodes.len() {
        return Err(RewriteError::VertexArity {
            rule: id,
            expected: rule.match_nodes.len(),
            found: vertices.len(),
        });
    }
    if let Some(&v) = vertices.iter().find(|&&v| host.vertex(v).is_none()) {
        return Err(RewriteError::UnknownVertex(v));
    }

    let supplied = app.matching.edges();
    let edges = if supplied.is_empty() && !rule.match_edges.is_empty() {
        let mut edges: Vec<EdgeId> = Vec::with_capacity(rule.match_edges.len());
        for (slot, edge) in rule.match_edges.iter().enumerate() {
            let [a, b] = edge.ends.map(|i| vertices[i]);
            let found = host
                .edges_between(a, b)
                .find(|e| !edges.contains(e))
                .ok_or(RewriteError::MissingEdge {
                    rule: id,
                    edge: slot,
                })?;
            edges.push(found);
        }
        edges
    } else if supplied.len() == rule.match_edges.len() {
        for (slot, (edge, &e)) in rule.match_edges.iter().zip(supplied).enumerate() {
            let rec = host.edge(e).ok_or(RewriteError::UnknownEdge(e))?;
            let [a, b] = edge.ends.map(|i| vertices[i]);
            if rec.ends != [a, b] && rec.ends != [b, a] {
                return Err(RewriteError::MissingEdge {
                    rule: id,
                    edge: slot,
                });
            }
        }
        supplied.to_vec()
    } else {
        return Err(RewriteError::EdgeArity {
            rule: id,
            expected: rule.match_edges.len(),
            found: supplied.len(),
        });
    };

    Ok(Resolved {
        id,
        rule,
        matching: VertexMatching::new(vertices.to_vec(), edges),
    })
}

fn apply_cuts<D: RuleDomain>(
    pg: &mut PreGraph,
    host: &HostGraph<D>,
    batch: &[Resolved<'_, D>],
    state: &mut D::RewriteState,
) {
    for app in batch {
        let mut ctx = CutCtx {
            host,
            matching: &app.matching,
            rule: app.id,
            state: &mut *state,
        };
        // Remove callbacks see the element before it leaves the pre-graph.
        for (edge, &e) in app.rule.match_edges.iter().zip(app.matching.edges()) {
            if edge.kind != ElementKind::Cut || !pg.has_host_link(e) {
                continue;
            }
            if let Some(remove) = &edge.remove {
                remove(&mut ctx, e);
            }
            pg.cut_edge(e);
        }
        for (node, &v) in app.rule.match_nodes.iter().zip(app.matching.vertices()) {
            if node.kind != ElementKind::Cut || pg.host_node(v).is_none() {
                continue;
            }
            if let Some(remove) = &node.remove {
                remove(&mut ctx, v);
            }
            pg.cut_vertex(v);
        }
    }
}

fn apply_insertions<D: RuleDomain>(
    pg: &mut PreGraph,
    host: &HostGraph<D>,
    batch: &[Resolved<'_, D>],
) -> Result<(), RewriteError> {
    for (application, app) in batch.iter().enumerate() {
        let stale = RewriteError::StaleMatch {
            rule: app.id,
            application,
        };
        let created: Vec<PgVertex> = (0..app.rule.new_nodes.len())
            .map(|local| {
                pg.add_node(Provenance {
                    rule: app.id,
                    local,
                    application,
                })
            })
            .collect();
        for (local, edge) in app.rule.new_edges.iter().enumerate() {
            let mut ports = [None; 2];
            for (side, port) in ports.iter_mut().enumerate() {
                let resolved = match (edge.ends[side], edge.ports[side]) {
                    (Endpoint::Created(k), _) => created.get(k).map(|&node| pg.add_port(node)),
                    (Endpoint::Matched(i), None) => {
                        let node = pg.host_node(app.matching.vertices()[i]);
                        node.map(|node| pg.add_port(node))
                    }
                    (Endpoint::Matched(i), Some(cut)) => {
                        let v = app.matching.vertices()[i];
                        let e = app.matching.edges()[cut];
                        host.edge(e)
                            .and_then(|rec| rec.end_at(v))
                            .and_then(|end| pg.host_port(e, end))
                    }
                };
                *port = Some(resolved.ok_or_else(|| stale.clone())?);
            }
            let [Some(a), Some(b)] = ports else {
                return Err(stale);
            };
            pg.add_link(
                a,
                b,
                Provenance {
                    rule: app.id,
                    local,
                    application,
                },
            );
        }
    }
    Ok(())
}

/// Runs the whole pipeline over a batch of applications.
pub(crate) fn rewrite<D: RuleDomain>(
    host: &HostGraph<D>,
    batch: &[Resolved<'_, D>],
    state: &mut D::RewriteState,
    options: PipelineOptions,
) -> Result<Rewrite<D::Node, D::Edge>, RewriteError> {
    let mut pg = PreGraph::from_host(host);
    apply_cuts(&mut pg, host, batch, state);
    apply_insertions(&mut pg, host, batch)?;
    if options.trace_pregraph {
        trace!(pregraph = %pg, "after insertions");
    }

    let ports_merged = pg.merge_ports(options.check_parity)?;
    let nodes_merged = pg.merge_nodes();
    let dangling = pg.prune_dangling();
    if options.trace_pregraph {
        trace!(pregraph = %pg, "after merging");
    }
    debug!(
        applications = batch.len(),
        ports_merged, nodes_merged, dangling, "pre-graph reconciled"
    );

    let assembly = pg.assemble(host)?;
    let mut output = assembly.graph;
    for &(v, prov) in &assembly.created_vertices {
        let app = &batch[prov.application];
        if let Some(create) = &app.rule.new_nodes[prov.local].create {
            create(
                &mut RewriteCtx {
                    host,
                    output: &mut output,
                    matching: &app.matching,
                    rule: app.id,
                    state: &mut *state,
                },
                v,
            );
        }
    }
    for &(e, prov) in &assembly.created_edges {
        let app = &batch[prov.application];
        if let Some(create) = &app.rule.new_edges[prov.local].create {
            create(
                &mut RewriteCtx {
                    host,
                    output: &mut output,
                    matching: &app.matching,
                    rule: app.id,
                    state: &mut *state,
                },
                e,
            );
        }
    }

    Ok(Rewrite {
        graph: output,
        created_vertices: assembly.created_vertices.into_iter().map(|(v, _)| v).collect(),
        created_edges: assembly.created_edges.into_iter().map(|(e, _)| e).collect(),
    })
}
