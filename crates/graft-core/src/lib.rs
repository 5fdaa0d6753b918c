// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! graft-core: a double-pushout style graph rewriting rule engine.
//!
//! Rules are declared against a [`RuleSystem`] with a [`RuleBuilder`]: each
//! pattern vertex and edge is *Env* (matched and kept), *Cut* (matched and
//! deleted) or *New* (created). New edges may take over the ports a Cut edge
//! leaves behind, which splices the new structure into the surrounding graph.
//!
//! Matching finds induced embeddings of a rule's pattern in a host
//! [`Graph`], deduplicated up to the rule's symmetry. Rewriting applies any
//! batch of matches in one pass through an intermediate port graph and
//! returns a fresh output graph; the host is never modified. Conflict
//! analysis records, for every ordered rule pair, whether one rule can
//! delete something a match of the other relies on.
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::redundant_pub_crate,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::use_self
)]

mod builder;
mod config;
mod conflict;
mod context;
mod footprint;
mod graph;
mod ident;
mod matcher;
mod pattern;
mod pregraph;
mod rewrite;
mod rule;
mod symmetry;
mod system;

// Re-exports for stable public API
/// Rule declaration and its errors.
pub use builder::{RuleBuilder, RuleError};
/// Rule system tunables.
pub use config::{ParityCheck, RuleSystemConfig};
/// Static conflict table.
pub use conflict::ConflictSet;
/// Caller domain binding and callback contexts.
pub use context::{
    CutCtx, EdgeCheckFn, EdgeCreateFn, EdgeRemoveFn, HostGraph, MatchCheckFn, MatchCtx,
    NodeCheckFn, NodeCreateFn, NodeRemoveFn, Plain, RewriteCtx, RuleDomain,
};
/// Per-application read/write sets.
pub use footprint::Footprint;
/// Host graph storage.
pub use graph::{EdgeRecord, Graph, GraphError, VertexRecord};
/// Handles.
pub use ident::{EdgeId, RuleId, Tag, VertexId};
/// Pattern embeddings.
pub use matcher::VertexMatching;
/// Rewrite batches, results and errors.
pub use rewrite::{Application, Rewrite, RewriteError};
/// Compiled rules.
pub use rule::{ElementKind, Rule};
/// Rule registry and entry points.
pub use system::RuleSystem;
