// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Port-expanded working graph used while rewriting.
//!
//! Every host edge is split into two *ports*, one per endpoint, joined by a
//! *link*; each port hangs off its vertex through an *attachment*. Cuts
//! remove links (edge cut) or a vertex together with its ports (vertex cut).
//! Insertions add vertices, fresh ports and links, or splice a new link onto
//! a port vacated by a cut edge.
//!
//! Several applications may touch the same connection point. Their effects
//! are reconciled by contracting ports: inside a connected component of the
//! port/link graph, ports at even distance stand for the same connection
//! point and are merged. This is only sound when the component is bipartite;
//! an odd cycle aborts the rewrite. Vertices that end up sharing a port are
//! merged afterwards.
use core::fmt;

use rustc_hash::FxHashMap;

use crate::graph::Graph;
use crate::ident::{next_handle, EdgeId, RuleId, VertexId};
use crate::rewrite::RewriteError;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct PgVertex(u32);

impl PgVertex {
    fn slot(self) -> usize {
        self.0 as usize
    }
}

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub(crate) struct PgEdge(u32);

impl PgEdge {
    fn slot(self) -> usize {
        self.0 as usize
    }
}

/// Which application created an element, and which pattern element it
/// stands for.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) struct Provenance {
    pub(crate) rule: RuleId,
    pub(crate) local: usize,
    pub(crate) application: usize,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum NodeOrigin {
    Host(VertexId),
    Created(Provenance),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum PortOrigin {
    Host { edge: EdgeId, end: usize },
    Fresh,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub(crate) enum LinkOrigin {
    Host(EdgeId),
    Created(Provenance),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Element {
    Node(NodeOrigin),
    Port(PortOrigin),
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Wire {
    Attach,
    Link(LinkOrigin),
}

#[derive(Debug)]
struct VertexSlot {
    element: Element,
    incident: Vec<PgEdge>,
}

#[derive(Debug)]
struct EdgeSlot {
    ends: [PgVertex; 2],
    wire: Wire,
}

/// Union-find root lookup with path halving.
fn find(parent: &mut [usize], mut x: usize) -> usize {
    while parent[x] != x {
        parent[x] = parent[parent[x]];
        x = parent[x];
    }
    x
}

/// Output of [`PreGraph::assemble`].
pub(crate) struct Assembly<N, E> {
    pub(crate) graph: Graph<N, E>,
    pub(crate) created_vertices: Vec<(VertexId, Provenance)>,
    pub(crate) created_edges: Vec<(EdgeId, Provenance)>,
}

/// Arena of port-expanded vertices and edges with tombstones.
#[derive(Debug)]
pub(crate) struct PreGraph {
    vertices: Vec<Option<VertexSlot>>,
    edges: Vec<Option<EdgeSlot>>,
    /// Node standing for each host vertex, by host handle.
    host_nodes: Vec<PgVertex>,
    /// Ports standing for both ends of each host edge, by host handle.
    host_ports: Vec<[PgVertex; 2]>,
    /// Link standing for each host edge, by host handle.
    host_links: Vec<PgEdge>,
}

impl PreGraph {
    /// Expands `host`: one node per vertex, two ports and a link per edge.
    pub(crate) fn from_host<N, E>(host: &Graph<N, E>) -> Self {
        let mut pg = Self {
            vertices: Vec::with_capacity(host.vertex_count() + 2 * host.edge_count()),
            edges: Vec::with_capacity(3 * host.edge_count()),
            host_nodes: Vec::with_capacity(host.vertex_count()),
            host_ports: Vec::with_capacity(host.edge_count()),
            host_links: Vec::with_capacity(host.edge_count()),
        };
        for v in host.vertices() {
            let node = pg.add_vertex(Element::Node(NodeOrigin::Host(v)));
            pg.host_nodes.push(node);
        }
        for (e, rec) in host.iter_edges() {
            let ports = [0, 1].map(|end| {
                let port = pg.add_vertex(Element::Port(PortOrigin::Host { edge: e, end }));
                pg.add_edge(pg.host_nodes[rec.ends[end].slot()], port, Wire::Attach);
                port
            });
            let link = pg.add_edge(ports[0], ports[1], Wire::Link(LinkOrigin::Host(e)));
            pg.host_ports.push(ports);
            pg.host_links.push(link);
        }
        pg
    }

    // -------------------------------------------------------------------------
    // Arena primitives
    // -------------------------------------------------------------------------

    fn add_vertex(&mut self, element: Element) -> PgVertex {
        let id = PgVertex(next_handle(self.vertices.len()));
        self.vertices.push(Some(VertexSlot {
            element,
            incident: Vec::new(),
        }));
        id
    }

    fn add_edge(&mut self, a: PgVertex, b: PgVertex, wire: Wire) -> PgEdge {
        let id = PgEdge(next_handle(self.edges.len()));
        self.edges.push(Some(EdgeSlot { ends: [a, b], wire }));
        for v in [a, b] {
            if let Some(slot) = self.vertex_slot_mut(v) {
                slot.incident.push(id);
            }
        }
        id
    }

    fn vertex_slot(&self, v: PgVertex) -> Option<&VertexSlot> {
        self.vertices.get(v.slot()).and_then(Option::as_ref)
    }

    fn vertex_slot_mut(&mut self, v: PgVertex) -> Option<&mut VertexSlot> {
        self.vertices.get_mut(v.slot()).and_then(Option::as_mut)
    }

    fn edge_slot(&self, e: PgEdge) -> Option<&EdgeSlot> {
        self.edges.get(e.slot()).and_then(Option::as_ref)
    }

    fn is_live(&self, v: PgVertex) -> bool {
        self.vertex_slot(v).is_some()
    }

    fn incident(&self, v: PgVertex) -> &[PgEdge] {
        self.vertex_slot(v).map_or(&[], |slot| slot.incident.as_slice())
    }

    fn opposite(&self, e: PgEdge, v: PgVertex) -> Option<PgVertex> {
        let slot = self.edge_slot(e)?;
        match slot.ends {
            [a, b] if a == v => Some(b),
            [a, b] if b == v => Some(a),
            _ => None,
        }
    }

    fn remove_edge(&mut self, e: PgEdge) {
        let Some(slot) = self.edges.get_mut(e.slot()).and_then(Option::take) else {
            return;
        };
        for v in slot.ends {
            if let Some(vs) = self.vertex_slot_mut(v) {
                vs.incident.retain(|&x| x != e);
            }
        }
    }

    fn remove_vertex(&mut self, v: PgVertex) {
        for e in self.incident(v).to_vec() {
            self.remove_edge(e);
        }
        if let Some(slot) = self.vertices.get_mut(v.slot()) {
            *slot = None;
        }
    }

    fn links(&self, port: PgVertex) -> impl Iterator<Item = PgEdge> + '_ {
        self.incident(port).iter().copied().filter(move |&e| {
            self.edge_slot(e)
                .is_some_and(|slot| matches!(slot.wire, Wire::Link(_)))
        })
    }

    fn attached_nodes(&self, port: PgVertex) -> impl Iterator<Item = PgVertex> + '_ {
        self.incident(port).iter().filter_map(move |&e| {
            let slot = self.edge_slot(e)?;
            if slot.wire == Wire::Attach {
                self.opposite(e, port)
            } else {
                None
            }
        })
    }

    fn live_ports(&self) -> Vec<PgVertex> {
        self.vertices
            .iter()
            .enumerate()
            .filter(|(_, slot)| {
                slot.as_ref()
                    .is_some_and(|s| matches!(s.element, Element::Port(_)))
            })
            .map(|(i, _)| PgVertex(next_handle(i)))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Cuts and insertions
    // -------------------------------------------------------------------------

    /// Returns `true` while the link of host edge `e` is still present.
    pub(crate) fn has_host_link(&self, e: EdgeId) -> bool {
        self.host_links
            .get(e.slot())
            .is_some_and(|&link| self.edge_slot(link).is_some())
    }

    /// Removes the link of host edge `e`. Returns `false` when it is already
    /// gone.
    pub(crate) fn cut_edge(&mut self, e: EdgeId) -> bool {
        let Some(&link) = self.host_links.get(e.slot()) else {
            return false;
        };
        if self.edge_slot(link).is_none() {
            return false;
        }
        self.remove_edge(link);
        true
    }

    /// Removes host vertex `v` with all its ports. Returns `false` when it is
    /// already gone.
    pub(crate) fn cut_vertex(&mut self, v: VertexId) -> bool {
        let Some(&node) = self.host_nodes.get(v.slot()) else {
            return false;
        };
        if !self.is_live(node) {
            return false;
        }
        let ports: Vec<PgVertex> = self
            .incident(node)
            .iter()
            .filter_map(|&e| self.opposite(e, node))
            .collect();
        for port in ports {
            self.remove_vertex(port);
        }
        self.remove_vertex(node);
        true
    }

    /// Live node standing for host vertex `v`.
    pub(crate) fn host_node(&self, v: VertexId) -> Option<PgVertex> {
        self.host_nodes
            .get(v.slot())
            .copied()
            .filter(|&node| self.is_live(node))
    }

    /// Live port standing for end `end` of host edge `e`.
    pub(crate) fn host_port(&self, e: EdgeId, end: usize) -> Option<PgVertex> {
        self.host_ports
            .get(e.slot())
            .and_then(|ports| ports.get(end))
            .copied()
            .filter(|&port| self.is_live(port))
    }

    pub(crate) fn add_node(&mut self, origin: Provenance) -> PgVertex {
        self.add_vertex(Element::Node(NodeOrigin::Created(origin)))
    }

    /// Adds a fresh port hanging off `node`.
    pub(crate) fn add_port(&mut self, node: PgVertex) -> PgVertex {
        let port = self.add_vertex(Element::Port(PortOrigin::Fresh));
        self.add_edge(node, port, Wire::Attach);
        port
    }

    pub(crate) fn add_link(&mut self, a: PgVertex, b: PgVertex, origin: Provenance) -> PgEdge {
        self.add_edge(a, b, Wire::Link(LinkOrigin::Created(origin)))
    }

    // -------------------------------------------------------------------------
    // Merging
    // -------------------------------------------------------------------------

    /// Folds every vertex of `members` into `rep`. Edges are redirected to
    /// `rep`; an edge that would duplicate an existing one of `rep`, or
    /// connect `rep` to itself, is dropped.
    fn contract(&mut self, rep: PgVertex, members: &[PgVertex]) {
        for &m in members {
            if m == rep || !self.is_live(m) {
                continue;
            }
            for e in self.incident(m).to_vec() {
                let Some(other) = self.opposite(e, m) else { continue };
                let duplicate = other == rep
                    || members.contains(&other)
                    || self
                        .incident(rep)
                        .iter()
                        .any(|&r| self.opposite(r, rep) == Some(other));
                if duplicate {
                    self.remove_edge(e);
                    continue;
                }
                if let Some(Some(slot)) = self.edges.get_mut(e.slot()) {
                    for end in &mut slot.ends {
                        if *end == m {
                            *end = rep;
                        }
                    }
                }
                if let Some(vs) = self.vertex_slot_mut(m) {
                    vs.incident.retain(|&x| x != e);
                }
                if let Some(vs) = self.vertex_slot_mut(rep) {
                    vs.incident.push(e);
                }
            }
            self.remove_vertex(m);
        }
    }

    /// 2-colours the port/link graph and merges same-coloured ports of each
    /// component. Returns the number of ports folded away.
    ///
    /// With `check_parity`, a component containing an odd cycle aborts with
    /// [`RewriteError::OddCycle`]. Without it, such a component is coloured
    /// by BFS order and the result is unspecified.
    pub(crate) fn merge_ports(&mut self, check_parity: bool) -> Result<usize, RewriteError> {
        let mut colour: FxHashMap<PgVertex, (usize, bool)> = FxHashMap::default();
        let mut classes: Vec<[Vec<PgVertex>; 2]> = Vec::new();
        for start in self.live_ports() {
            if colour.contains_key(&start) || self.links(start).next().is_none() {
                continue;
            }
            let component = classes.len();
            classes.push([Vec::new(), Vec::new()]);
            colour.insert(start, (component, false));
            let mut queue = std::collections::VecDeque::from([start]);
            let mut odd = false;
            let mut size = 0usize;
            while let Some(port) = queue.pop_front() {
                size += 1;
                let side = colour.get(&port).is_some_and(|&(_, side)| side);
                classes[component][usize::from(side)].push(port);
                let neighbours: Vec<PgVertex> = self
                    .links(port)
                    .filter_map(|e| self.opposite(e, port))
                    .collect();
                for next in neighbours {
                    match colour.get(&next) {
                        Some(&(_, other)) => odd |= other == side,
                        None => {
                            colour.insert(next, (component, !side));
                            queue.push_back(next);
                        }
                    }
                }
            }
            if odd && check_parity {
                return Err(RewriteError::OddCycle { ports: size });
            }
        }
        let mut folded = 0;
        for class in classes.into_iter().flatten() {
            let Some(&rep) = class.iter().min() else { continue };
            folded += class.len() - 1;
            self.contract(rep, &class);
        }
        Ok(folded)
    }

    /// Merges nodes attached to a common port. Host nodes win over created
    /// ones as representatives. Returns the number of nodes folded away.
    pub(crate) fn merge_nodes(&mut self) -> usize {
        let n = self.vertices.len();
        let mut parent: Vec<usize> = (0..n).collect();
        for port in self.live_ports() {
            let nodes: Vec<PgVertex> = self.attached_nodes(port).collect();
            let Some((&first, rest)) = nodes.split_first() else { continue };
            for &other in rest {
                let (a, b) = (find(&mut parent, first.slot()), find(&mut parent, other.slot()));
                if a != b {
                    // Keep the lower handle as root; host nodes precede created ones.
                    let (lo, hi) = if a < b { (a, b) } else { (b, a) };
                    parent[hi] = lo;
                }
            }
        }
        let mut classes: FxHashMap<usize, Vec<PgVertex>> = FxHashMap::default();
        for slot in 0..n {
            let root = find(&mut parent, slot);
            if root != slot {
                classes
                    .entry(root)
                    .or_default()
                    .push(PgVertex(next_handle(slot)));
            }
        }
        let mut roots: Vec<usize> = classes.keys().copied().collect();
        roots.sort_unstable();
        let mut folded = 0;
        for root in roots {
            let Some(members) = classes.remove(&root) else { continue };
            folded += members.len();
            self.contract(PgVertex(next_handle(root)), &members);
        }
        folded
    }

    // -------------------------------------------------------------------------
    // Assembly
    // -------------------------------------------------------------------------

    /// Drops ports that carry no link; their edge is gone on that side.
    pub(crate) fn prune_dangling(&mut self) -> usize {
        let dangling: Vec<PgVertex> = self
            .live_ports()
            .into_iter()
            .filter(|&p| self.links(p).next().is_none())
            .collect();
        for &port in &dangling {
            self.remove_vertex(port);
        }
        dangling.len()
    }

    fn node_of(&self, port: PgVertex) -> Result<PgVertex, RewriteError> {
        let nodes: Vec<PgVertex> = self.attached_nodes(port).collect();
        let links = self.links(port).count();
        match nodes.as_slice() {
            [node] if links == 1 => Ok(*node),
            _ => Err(RewriteError::MalformedPort {
                attachments: nodes.len(),
                links,
            }),
        }
    }

    /// Builds the output graph. Surviving host elements keep payload and
    /// index; created ones get default payloads and fresh indices.
    pub(crate) fn assemble<N: Clone + Default, E: Clone + Default>(
        &self,
        host: &Graph<N, E>,
    ) -> Result<Assembly<N, E>, RewriteError> {
        for port in self.live_ports() {
            self.node_of(port)?;
        }
        let mut graph = Graph::continuing(host);
        let mut created_vertices = Vec::new();
        let mut created_edges = Vec::new();
        let mut out_vertex: FxHashMap<PgVertex, VertexId> = FxHashMap::default();

        for (slot, vs) in self.vertices.iter().enumerate() {
            let Some(VertexSlot {
                element: Element::Node(origin),
                ..
            }) = vs
            else {
                continue;
            };
            let id = match *origin {
                NodeOrigin::Host(v) => {
                    let Some(rec) = host.vertex(v) else {
                        return Err(RewriteError::UnknownVertex(v));
                    };
                    graph.add_vertex_with_index(rec.index, rec.payload.clone())
                }
                NodeOrigin::Created(prov) => {
                    let id = graph.add_vertex(N::default());
                    created_vertices.push((id, prov));
                    id
                }
            };
            out_vertex.insert(PgVertex(next_handle(slot)), id);
        }

        for es in self.edges.iter().flatten() {
            let Wire::Link(origin) = es.wire else { continue };
            let [pa, pb] = es.ends;
            let (a, b) = (self.node_of(pa)?, self.node_of(pb)?);
            // Host self-loops and host edges between merged vertices survive.
            if a == b && matches!(origin, LinkOrigin::Created(_)) {
                tracing::trace!(?origin, "dropping new link folded onto a single vertex");
                continue;
            }
            let (Some(&va), Some(&vb)) = (out_vertex.get(&a), out_vertex.get(&b)) else {
                continue;
            };
            let added = match origin {
                LinkOrigin::Host(e) => {
                    let Some(rec) = host.edge(e) else {
                        return Err(RewriteError::UnknownEdge(e));
                    };
                    graph.add_edge_with_index(va, vb, rec.index, rec.payload.clone())
                }
                LinkOrigin::Created(prov) => graph.add_edge(va, vb, E::default()).map(|id| {
                    created_edges.push((id, prov));
                    id
                }),
            };
            added?;
        }

        Ok(Assembly {
            graph,
            created_vertices,
            created_edges,
        })
    }

    fn live_counts(&self) -> (usize, usize, usize) {
        let mut nodes = 0;
        let mut ports = 0;
        for slot in self.vertices.iter().flatten() {
            match slot.element {
                Element::Node(_) => nodes += 1,
                Element::Port(_) => ports += 1,
            }
        }
        (nodes, ports, self.edges.iter().flatten().count())
    }
}

impl fmt::Display for PreGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (nodes, ports, edges) = self.live_counts();
        writeln!(f, "pregraph: {nodes} nodes, {ports} ports, {edges} edges")?;
        for (slot, vs) in self.vertices.iter().enumerate() {
            let Some(vs) = vs else { continue };
            match vs.element {
                Element::Node(NodeOrigin::Host(v)) => writeln!(f, "  v{slot}: host vertex {}", v.0)?,
                Element::Node(NodeOrigin::Created(p)) => writeln!(
                    f,
                    "  v{slot}: new vertex {}#{} (application {})",
                    p.rule, p.local, p.application
                )?,
                Element::Port(PortOrigin::Host { edge, end }) => {
                    writeln!(f, "  v{slot}: port of host edge {} end {end}", edge.0)?;
                }
                Element::Port(PortOrigin::Fresh) => writeln!(f, "  v{slot}: fresh port")?,
            }
        }
        for (slot, es) in self.edges.iter().enumerate() {
            let Some(es) = es else { continue };
            let [a, b] = es.ends;
            match es.wire {
                Wire::Attach => writeln!(f, "  e{slot}: v{} -- v{}", a.0, b.0)?,
                Wire::Link(LinkOrigin::Host(e)) => {
                    writeln!(f, "  e{slot}: v{} == v{} (host edge {})", a.0, b.0, e.0)?;
                }
                Wire::Link(LinkOrigin::Created(p)) => writeln!(
                    f,
                    "  e{slot}: v{} == v{} (new edge {}#{})",
                    a.0, b.0, p.rule, p.local
                )?,
            }
        }
        Ok(())
    }
}
