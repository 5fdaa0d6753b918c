// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Handle types shared by graphs, rules and the rewrite pipeline.

/// Caller-chosen label attached to every pattern element.
///
/// Tags partition pattern vertices and edges for symmetry detection and
/// conflict analysis; the engine never interprets them otherwise.
pub type Tag = u32;

/// Handle of a vertex inside one [`Graph`](crate::Graph).
///
/// Handles are dense arena positions. They are only meaningful for the graph
/// that issued them; the stable cross-rewrite identity of a vertex is its
/// `index` field, not its handle.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VertexId(pub u32);

impl VertexId {
    /// Arena position of this vertex.
    #[must_use]
    pub fn slot(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(next_handle(slot))
    }
}

/// Handle of an edge inside one [`Graph`](crate::Graph).
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EdgeId(pub u32);

impl EdgeId {
    /// Arena position of this edge.
    #[must_use]
    pub fn slot(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(next_handle(slot))
    }
}

/// Identifier of a rule registered in a [`RuleSystem`](crate::RuleSystem).
///
/// Rule ids are assigned in registration order starting at zero.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RuleId(pub u32);

impl RuleId {
    /// Position of the rule in the registering system.
    #[must_use]
    pub fn slot(self) -> usize {
        self.0 as usize
    }

    pub(crate) fn from_slot(slot: usize) -> Self {
        Self(next_handle(slot))
    }
}

impl core::fmt::Display for RuleId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "rule#{}", self.0)
    }
}

/// Converts an arena length into the next `u32` handle value.
///
/// Arenas larger than `u32::MAX` elements are not supported; the conversion
/// saturates so a handle never wraps around onto an existing element.
pub(crate) fn next_handle(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}
