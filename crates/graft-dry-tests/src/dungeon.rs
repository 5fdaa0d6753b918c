// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Demo domain: a dungeon level grown by rewriting its room graph.
//!
//! Rooms are vertices and doorways are edges. The level starts as an
//! entrance joined to a final room, and three rules grow it:
//!
//! - *corridor*: a doorway between two rooms is replaced by a new room spliced
//!   into both of its ports;
//! - *cycle*: a doorway between two branchable rooms is replaced by two new
//!   rooms, each joined to both ends, closing a four-room loop;
//! - *branch*: a new dead-end room hangs off a room that is not the final one.
//!
//! Rule tags keep the three patterns apart for conflict analysis.

use graft_core::{
    Application, CutCtx, EdgeId, GraphError, HostGraph, MatchCtx, RewriteCtx, RewriteError,
    RuleDomain, RuleError, RuleId, RuleSystem, VertexId,
};
use rand::seq::SliceRandom;
use rand::Rng;

/// Size given to every generated room.
pub const ROOM_SIZE: u32 = 4;

/// What a room holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum RoomKind {
    /// Placeholder before a create callback ran.
    #[default]
    Unplaced,
    /// Where the player enters.
    Entrance,
    /// The goal room; never branched from.
    Final,
    /// An ordinary room.
    Room,
}

/// Vertex payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Room {
    /// Content of the room.
    pub kind: RoomKind,
    /// Footprint of the room in tiles.
    pub size: u32,
}

impl Room {
    /// Creates a room.
    pub fn new(kind: RoomKind, size: u32) -> Self {
        Self { kind, size }
    }

    /// `true` once the room has been placed in the level.
    pub fn is_physical(&self) -> bool {
        self.kind != RoomKind::Unplaced
    }
}

/// Edge payload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Doorway {
    /// `true` for a walkable connection.
    pub physical: bool,
}

/// Counters updated by the rule callbacks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DungeonStats {
    /// Rooms initialised by create callbacks.
    pub rooms_created: usize,
    /// Doorways initialised by create callbacks.
    pub doorways_created: usize,
    /// Doorways removed by Cut edges.
    pub doorways_removed: usize,
}

/// The dungeon domain.
#[derive(Debug, Clone, Copy, Default)]
pub struct Dungeon;

impl RuleDomain for Dungeon {
    type Node = Room;
    type Edge = Doorway;
    type MatchState = ();
    type RewriteState = DungeonStats;
}

/// Room graph of a dungeon level.
pub type DungeonGraph = HostGraph<Dungeon>;

/// Entrance and final room joined by one doorway.
pub fn initial_dungeon() -> Result<DungeonGraph, GraphError> {
    let mut g = DungeonGraph::new();
    let entrance = g.add_vertex(Room::new(RoomKind::Entrance, ROOM_SIZE));
    let goal = g.add_vertex(Room::new(RoomKind::Final, ROOM_SIZE));
    g.add_edge(entrance, goal, Doorway { physical: true })?;
    Ok(g)
}

fn room(ctx: &MatchCtx<'_, Dungeon>, v: VertexId) -> Option<Room> {
    ctx.host.vertex_payload(v).copied()
}

fn is_room(ctx: &mut MatchCtx<'_, Dungeon>, v: VertexId) -> bool {
    room(ctx, v).is_some_and(|r| r.is_physical())
}

fn is_not_final(ctx: &mut MatchCtx<'_, Dungeon>, v: VertexId) -> bool {
    room(ctx, v).is_some_and(|r| r.is_physical() && r.kind != RoomKind::Final)
}

/// The entrance may keep at most two doorways.
fn can_branch(ctx: &mut MatchCtx<'_, Dungeon>, v: VertexId) -> bool {
    is_not_final(ctx, v)
        && room(ctx, v).is_some_and(|r| r.kind != RoomKind::Entrance || ctx.host.degree(v) < 2)
}

fn is_doorway(ctx: &mut MatchCtx<'_, Dungeon>, e: EdgeId) -> bool {
    ctx.host.edge_payload(e).is_some_and(|d| d.physical)
}

fn doorway_removed(ctx: &mut CutCtx<'_, Dungeon>, _: EdgeId) {
    ctx.state.doorways_removed += 1;
}

fn create_room(ctx: &mut RewriteCtx<'_, Dungeon>, v: VertexId) {
    if let Some(room) = ctx.output.vertex_payload_mut(v) {
        *room = Room::new(RoomKind::Room, ROOM_SIZE);
        ctx.state.rooms_created += 1;
    }
}

fn create_doorway(ctx: &mut RewriteCtx<'_, Dungeon>, e: EdgeId) {
    if let Some(doorway) = ctx.output.edge_payload_mut(e) {
        doorway.physical = true;
        ctx.state.doorways_created += 1;
    }
}

/// Ids of the three growth rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DungeonRules {
    /// Room spliced into an existing doorway.
    pub corridor: RuleId,
    /// Two rooms closing a loop around a removed doorway.
    pub cycle: RuleId,
    /// Dead-end room.
    pub branch: RuleId,
}

impl DungeonRules {
    /// Registers the three rules on `system`.
    pub fn register(system: &mut RuleSystem<Dungeon>) -> Result<Self, RuleError> {
        let corridor = {
            let mut rule = system.start_rule();
            rule.named("corridor-room");
            let a = rule.add_node(0);
            let b = rule.add_node(0);
            rule.check_node(a, is_room)?.check_node(b, is_room)?;
            let door = rule.add_cut_connection(a, b, 0)?;
            rule.check_edge(door, is_doorway)?
                .on_remove_edge(door, doorway_removed)?;
            let mid = rule.add_new_node(0);
            rule.on_create_node(mid, create_room)?;
            let left = rule.add_new_connection(a, mid, Some(door), None, 0)?;
            let right = rule.add_new_connection(b, mid, Some(door), None, 0)?;
            rule.on_create_edge(left, create_doorway)?
                .on_create_edge(right, create_doorway)?;
            rule.end()?
        };

        let cycle = {
            let mut rule = system.start_rule();
            rule.named("cycle-room");
            let a = rule.add_node(1);
            let b = rule.add_node(1);
            rule.check_node(a, can_branch)?.check_node(b, can_branch)?;
            let door = rule.add_cut_connection(a, b, 0)?;
            rule.check_edge(door, is_doorway)?
                .on_remove_edge(door, doorway_removed)?;
            for _ in 0..2 {
                let extra = rule.add_new_node(0);
                rule.on_create_node(extra, create_room)?;
                for end in [a, b] {
                    let edge = rule.add_new_connection(end, extra, None, None, 0)?;
                    rule.on_create_edge(edge, create_doorway)?;
                }
            }
            rule.end()?
        };

        let branch = {
            let mut rule = system.start_rule();
            rule.named("branch-room");
            let root = rule.add_node(2);
            let next = rule.add_node(0);
            rule.check_node(root, is_not_final)?;
            let door = rule.add_connection(root, next, 0)?;
            rule.check_edge(door, is_doorway)?;
            let leaf = rule.add_new_node(0);
            rule.on_create_node(leaf, create_room)?;
            let edge = rule.add_new_connection(root, leaf, None, None, 0)?;
            rule.on_create_edge(edge, create_doorway)?;
            rule.end()?
        };

        Ok(Self {
            corridor,
            cycle,
            branch,
        })
    }

    /// The rules in registration order.
    pub fn all(&self) -> [RuleId; 3] {
        [self.corridor, self.cycle, self.branch]
    }
}

/// Applies one randomly chosen match of one randomly chosen rule.
///
/// Returns `Ok(None)` when the chosen rule has no match.
pub fn grow_step<R: Rng>(
    system: &RuleSystem<Dungeon>,
    rules: &DungeonRules,
    level: &DungeonGraph,
    rng: &mut R,
    stats: &mut DungeonStats,
) -> Result<Option<DungeonGraph>, RewriteError> {
    let all = rules.all();
    let rule = all[rng.gen_range(0..all.len())];
    let matches = system.find_rule_match(rule, level, &mut ())?;
    let Some(matching) = matches.choose(rng) else {
        return Ok(None);
    };
    let out = system.apply_rule(level, rule, matching, stats)?;
    Ok(Some(out.into_graph()))
}

/// Applies a shuffled, pairwise independent selection of every rule's
/// matches in one pass.
///
/// Returns `Ok(None)` when no rule matches.
pub fn grow_batch<R: Rng>(
    system: &RuleSystem<Dungeon>,
    level: &DungeonGraph,
    rng: &mut R,
    stats: &mut DungeonStats,
) -> Result<Option<DungeonGraph>, RewriteError> {
    let mut candidates: Vec<Application> = system.find_all_matches(level, &mut ());
    if candidates.is_empty() {
        return Ok(None);
    }
    candidates.shuffle(rng);
    let batch = system.select_independent(level, &candidates)?;
    let out = system.apply_matches(level, &batch, stats)?;
    Ok(Some(out.into_graph()))
}
