// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Shared test doubles and fixtures for graft crates.
#![forbid(unsafe_code)]
//!
//! # Modules
//!
//! - [`dungeon`] - Room/doorway demo domain and its level-growing rules
//! - [`graphs`] - Builders for common host graph shapes
//! - [`profiles`] - In-memory rule system profile store
//! - [`rules`] - Synthetic structural rules over the [`Plain`](graft_core::Plain) domain

pub mod dungeon;
pub mod graphs;
pub mod profiles;
pub mod rules;

// Re-export commonly used items at crate root for convenience
pub use dungeon::{Doorway, Dungeon, DungeonRules, DungeonStats, Room, RoomKind};
pub use graphs::{complete, cycle, grid, path, star};
pub use profiles::InMemoryProfileStore;
