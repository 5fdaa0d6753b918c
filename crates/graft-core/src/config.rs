// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Rule system configuration.
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// When the rewriter checks the port graph for odd cycles.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ParityCheck {
    /// Check on every rewrite.
    #[default]
    Always,
    /// Check only once a registered rule splices both ends of a new edge.
    ///
    /// Port cycles need such an edge, so this skips the check without
    /// losing any rejection.
    WhenArmed,
}

impl ParityCheck {
    /// Whether a rewrite must run the check given the system's armed flag.
    pub fn should_check(self, armed: bool) -> bool {
        match self {
            Self::Always => true,
            Self::WhenArmed => armed,
        }
    }
}

/// Tunables for a [`RuleSystem`](crate::RuleSystem).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct RuleSystemConfig {
    /// Odd-cycle check policy.
    pub parity_check: ParityCheck,
    /// Maximum number of matches returned per rule; `None` is unbounded.
    pub match_limit: Option<usize>,
    /// Dump the pre-graph at `trace` level after insertions and merging.
    pub trace_pregraph: bool,
}
