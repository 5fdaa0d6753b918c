// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The rule system: registered rules, their conflict table and the matching
//! and rewriting entry points.
use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::builder::RuleBuilder;
use crate::config::RuleSystemConfig;
use crate::conflict::{self, ConflictSet};
use crate::context::{HostGraph, RuleDomain};
use crate::footprint::Footprint;
use crate::ident::RuleId;
use crate::matcher::{self, VertexMatching};
use crate::rewrite::{self, Application, PipelineOptions, Rewrite, RewriteError};
use crate::rule::Rule;

/// Owns a set of rules for one caller domain.
///
/// Rules are added through [`start_rule`](Self::start_rule) and never
/// removed. Conflict analysis runs as each rule is registered, so the
/// [`ConflictSet`] is always complete for the registered rules. After setup
/// the system is only read; it can be shared between threads as long as each
/// call brings its own host graph and states.
pub struct RuleSystem<D: RuleDomain> {
    rules: Vec<Rule<D>>,
    conflicts: ConflictSet,
    parity_armed: bool,
    config: RuleSystemConfig,
}

impl<D: RuleDomain> Default for RuleSystem<D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: RuleDomain> RuleSystem<D> {
    /// Creates an empty system with the default configuration.
    pub fn new() -> Self {
        Self::with_config(RuleSystemConfig::default())
    }

    /// Creates an empty system with `config`.
    pub fn with_config(config: RuleSystemConfig) -> Self {
        Self {
            rules: Vec::new(),
            conflicts: ConflictSet::default(),
            parity_armed: false,
            config,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &RuleSystemConfig {
        &self.config
    }

    /// Starts declaring a new rule.
    pub fn start_rule(&mut self) -> RuleBuilder<'_, D> {
        RuleBuilder::new(self)
    }

    /// Looks up a registered rule.
    pub fn rule(&self, id: RuleId) -> Option<&Rule<D>> {
        self.rules.get(id.slot())
    }

    /// Registered rules in id order.
    pub fn rules(&self) -> impl Iterator<Item = &Rule<D>> + '_ {
        self.rules.iter()
    }

    /// Number of registered rules.
    pub fn rule_count(&self) -> usize {
        self.rules.len()
    }

    pub(crate) fn register(&mut self, rule: Rule<D>) -> RuleId {
        let id = rule.id;
        debug!(
            rule = %rule.label(),
            match_nodes = rule.match_nodes.len(),
            new_nodes = rule.new_nodes.len(),
            automorphisms = rule.automorphisms.len(),
            potential_loop = rule.has_potential_loop,
            deletes = rule.has_deletes,
            "registering rule"
        );
        for other in &self.rules {
            if conflict::conflicts(other, &rule) {
                debug!(victim = %other.label(), cutter = %rule.label(), "conflict");
                self.conflicts.insert(other.id, id);
            }
            if conflict::conflicts(&rule, other) {
                debug!(victim = %rule.label(), cutter = %other.label(), "conflict");
                self.conflicts.insert(id, other.id);
            }
        }
        if conflict::conflicts(&rule, &rule) {
            debug!(rule = %rule.label(), "self-conflict");
            self.conflicts.insert(id, id);
        }
        self.parity_armed |= rule.has_potential_loop;
        self.rules.push(rule);
        id
    }

    // -------------------------------------------------------------------------
    // Conflicts
    // -------------------------------------------------------------------------

    /// Conflicting `(victim, cutter)` pairs among the registered rules.
    pub fn conflicts(&self) -> &ConflictSet {
        &self.conflicts
    }

    /// Returns `true` when `cutter` may invalidate a simultaneous match of
    /// `victim`.
    pub fn are_conflicting(&self, victim: RuleId, cutter: RuleId) -> bool {
        self.conflicts.contains(victim, cutter)
    }

    /// Returns `true` when any registered pair conflicts.
    pub fn has_conflicts(&self) -> bool {
        !self.conflicts.is_empty()
    }

    /// Returns `Some(true)` when the rule has a non-trivial automorphism.
    pub fn is_rule_symmetric(&self, id: RuleId) -> Option<bool> {
        self.rule(id).map(Rule::is_symmetric)
    }

    /// Returns `true` once a registered rule splices both ends of a new edge.
    pub fn parity_armed(&self) -> bool {
        self.parity_armed
    }

    // -------------------------------------------------------------------------
    // Matching
    // -------------------------------------------------------------------------

    /// Finds the matches of one rule in `host`, one per logical occurrence.
    ///
    /// The result is capped by [`RuleSystemConfig::match_limit`].
    pub fn find_rule_match(
        &self,
        id: RuleId,
        host: &HostGraph<D>,
        state: &mut D::MatchState,
    ) -> Result<Vec<VertexMatching>, RewriteError> {
        let rule = self.rule(id).ok_or(RewriteError::UnknownRule(id))?;
        let found = matcher::find_matches(rule, id, host, state, self.config.match_limit);
        debug!(rule = %rule.label(), matches = found.len(), "matched");
        Ok(found)
    }

    /// Finds the matches of every rule, in rule order.
    pub fn find_all_matches(
        &self,
        host: &HostGraph<D>,
        state: &mut D::MatchState,
    ) -> Vec<Application> {
        let mut out = Vec::new();
        for rule in &self.rules {
            let found =
                matcher::find_matches(rule, rule.id, host, state, self.config.match_limit);
            debug!(rule = %rule.label(), matches = found.len(), "matched");
            out.extend(found.into_iter().map(|m| Application::new(rule.id, m)));
        }
        out
    }

    // -------------------------------------------------------------------------
    // Rewriting
    // -------------------------------------------------------------------------

    /// Applies one rule at one matching.
    pub fn apply_rule(
        &self,
        host: &HostGraph<D>,
        id: RuleId,
        matching: &VertexMatching,
        state: &mut D::RewriteState,
    ) -> Result<Rewrite<D::Node, D::Edge>, RewriteError> {
        self.apply_matches(host, &[Application::new(id, matching.clone())], state)
    }

    /// Finds every match of every rule and applies them all in one pass.
    ///
    /// Exclusivity is not enforced; conflicting rules matching together are
    /// reported with `warn!`. Use
    /// [`select_independent`](Self::select_independent) and
    /// [`apply_matches`](Self::apply_matches) to control the batch.
    #[instrument(skip_all, fields(rules = self.rules.len()))]
    pub fn apply(
        &self,
        host: &HostGraph<D>,
        match_state: &mut D::MatchState,
        rewrite_state: &mut D::RewriteState,
    ) -> Result<Rewrite<D::Node, D::Edge>, RewriteError> {
        let batch = self.find_all_matches(host, match_state);
        self.warn_conflicting(&batch);
        self.apply_matches(host, &batch, rewrite_state)
    }

    /// Applies a caller-selected batch of `(rule, matching)` pairs in one
    /// pass.
    ///
    /// All cuts of all applications happen before any insertion. The host
    /// graph is not modified.
    #[instrument(skip_all, fields(applications = batch.len()))]
    pub fn apply_matches(
        &self,
        host: &HostGraph<D>,
        batch: &[Application],
        state: &mut D::RewriteState,
    ) -> Result<Rewrite<D::Node, D::Edge>, RewriteError> {
        let resolved = batch
            .iter()
            .map(|app| rewrite::resolve(&self.rules, host, app))
            .collect::<Result<Vec<_>, _>>()?;
        let options = PipelineOptions {
            check_parity: self.config.parity_check.should_check(self.parity_armed),
            trace_pregraph: self.config.trace_pregraph,
        };
        let out = rewrite::rewrite(host, &resolved, state, options)?;
        debug!(
            vertices = out.graph.vertex_count(),
            edges = out.graph.edge_count(),
            created_vertices = out.created_vertices.len(),
            created_edges = out.created_edges.len(),
            "rewrite complete"
        );
        Ok(out)
    }

    fn warn_conflicting(&self, batch: &[Application]) {
        if self.conflicts.is_empty() {
            return;
        }
        let mut counts: BTreeMap<RuleId, usize> = BTreeMap::new();
        for app in batch {
            *counts.entry(app.rule).or_default() += 1;
        }
        for (victim, cutter) in self.conflicts.iter() {
            let together = if victim == cutter {
                counts.get(&victim).is_some_and(|&n| n > 1)
            } else {
                counts.contains_key(&victim) && counts.contains_key(&cutter)
            };
            if together {
                warn!(%victim, %cutter, "conflicting rules applied in one batch");
            }
        }
    }

    // -------------------------------------------------------------------------
    // Independence
    // -------------------------------------------------------------------------

    /// Read/write footprint of one application on `host`.
    pub fn footprint(
        &self,
        host: &HostGraph<D>,
        app: &Application,
    ) -> Result<Footprint, RewriteError> {
        let resolved = rewrite::resolve(&self.rules, host, app)?;
        Ok(Footprint::of(resolved.rule, &resolved.matching, host))
    }

    /// Keeps, in order, every candidate independent of all candidates kept
    /// before it.
    pub fn select_independent(
        &self,
        host: &HostGraph<D>,
        candidates: &[Application],
    ) -> Result<Vec<Application>, RewriteError> {
        let mut kept: Vec<(Application, Footprint)> = Vec::new();
        for app in candidates {
            let fp = self.footprint(host, app)?;
            if kept.iter().all(|(_, other)| fp.independent(other)) {
                kept.push((app.clone(), fp));
            }
        }
        debug!(
            candidates = candidates.len(),
            kept = kept.len(),
            "independent selection"
        );
        Ok(kept.into_iter().map(|(app, _)| app).collect())
    }
}

impl<D: RuleDomain> core::fmt::Debug for RuleSystem<D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("RuleSystem")
            .field("rules", &self.rules)
            .field("conflicts", &self.conflicts)
            .field("parity_armed", &self.parity_armed)
            .field("config", &self.config)
            .finish()
    }
}
