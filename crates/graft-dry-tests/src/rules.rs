// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Synthetic structural rules for tests.
//!
//! Every builder registers one rule on a [`Plain`] system and returns its id.
//! All vertices and edges use tag `0` unless stated otherwise.

use graft_core::{Plain, RuleError, RuleId, RuleSystem};

/// `a - b` becomes `a - m - b`; the new vertex takes over both ports of the
/// removed edge.
pub fn edge_subdivision(system: &mut RuleSystem<Plain>) -> Result<RuleId, RuleError> {
    let mut rule = system.start_rule();
    rule.named("edge-subdivision");
    let a = rule.add_node(0);
    let b = rule.add_node(0);
    let e = rule.add_cut_connection(a, b, 0)?;
    let m = rule.add_new_node(0);
    rule.add_new_connection(a, m, Some(e), None, 0)?;
    rule.add_new_connection(m, b, None, Some(e), 0)?;
    rule.end()
}

/// A triangle's edges are replaced by a hexagon through three new vertices,
/// which are joined into an inner triangle.
pub fn triangle_expansion(system: &mut RuleSystem<Plain>) -> Result<RuleId, RuleError> {
    let mut rule = system.start_rule();
    rule.named("triangle-expansion");
    let v = [rule.add_node(0), rule.add_node(0), rule.add_node(0)];
    let e = [
        rule.add_cut_connection(v[0], v[1], 0)?,
        rule.add_cut_connection(v[1], v[2], 0)?,
        rule.add_cut_connection(v[2], v[0], 0)?,
    ];
    let n = [rule.add_new_node(0), rule.add_new_node(0), rule.add_new_node(0)];
    for (i, &inner) in n.iter().enumerate() {
        rule.add_new_connection(inner, n[(i + 1) % 3], None, None, 0)?;
    }
    for (i, ((&outer, &cut), &inner)) in v.iter().zip(&e).zip(&n).enumerate() {
        rule.add_new_connection(outer, inner, Some(cut), None, 0)?;
        rule.add_new_connection(inner, v[(i + 1) % 3], None, Some(cut), 0)?;
    }
    rule.end()
}

/// Removes a degree-one vertex together with its edge.
pub fn leaf_pruning(system: &mut RuleSystem<Plain>) -> Result<RuleId, RuleError> {
    let mut rule = system.start_rule();
    rule.named("leaf-pruning");
    let stem = rule.add_node(0);
    let leaf = rule.add_cut_node(0);
    rule.add_cut_connection(stem, leaf, 0)?;
    rule.check_node(leaf, |ctx, v| ctx.host.degree(v) == 1)?;
    rule.end()
}

/// Removes any vertex; its edges disappear with it.
pub fn vertex_deletion(system: &mut RuleSystem<Plain>) -> Result<RuleId, RuleError> {
    let mut rule = system.start_rule();
    rule.named("vertex-deletion");
    rule.add_cut_node(0);
    rule.end()
}

/// Hangs a new leaf off every vertex. Adds only.
pub fn attach_leaf(system: &mut RuleSystem<Plain>) -> Result<RuleId, RuleError> {
    let mut rule = system.start_rule();
    rule.named("attach-leaf");
    let a = rule.add_node(0);
    let leaf = rule.add_new_node(0);
    rule.add_new_connection(a, leaf, None, None, 0)?;
    rule.end()
}

/// Adds a vertex adjacent to both ends of every edge. Adds only.
pub fn edge_triangle(system: &mut RuleSystem<Plain>) -> Result<RuleId, RuleError> {
    let mut rule = system.start_rule();
    rule.named("edge-triangle");
    let a = rule.add_node(0);
    let b = rule.add_node(0);
    rule.add_connection(a, b, 0)?;
    let apex = rule.add_new_node(0);
    rule.add_new_connection(a, apex, None, None, 0)?;
    rule.add_new_connection(b, apex, None, None, 0)?;
    rule.end()
}

/// Cuts two spokes `hub - b` and `hub - c` and joins `b` to `c` through the
/// ports both spokes vacate on the rim. Applied to every pair of leaves of a
/// three-leaf star the splices close an odd cycle of ports.
pub fn leaf_bridge(system: &mut RuleSystem<Plain>) -> Result<RuleId, RuleError> {
    let mut rule = system.start_rule();
    rule.named("leaf-bridge");
    let hub = rule.add_node(0);
    let b = rule.add_node(0);
    let c = rule.add_node(0);
    let to_b = rule.add_cut_connection(hub, b, 0)?;
    let to_c = rule.add_cut_connection(hub, c, 0)?;
    rule.add_new_connection(b, c, Some(to_b), Some(to_c), 0)?;
    rule.end()
}
