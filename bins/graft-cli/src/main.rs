// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! graft CLI entrypoint.
//!
//! Grows the demo dungeon level with the three room rules, lists the rules
//! with their symmetry and conflicts, and shows the rule system profile
//! read from the profile store.
//!
//! # Usage
//! ```text
//! graft [--config-dir DIR] [--profile NAME] grow [--steps N] [--seed S] [--batch] [--json]
//! graft [--config-dir DIR] [--profile NAME] rules
//! graft [--config-dir DIR] [--profile NAME] config [--save] [--list]
//! ```
//!
//! Logs go to stderr and honour `RUST_LOG`; results go to stdout.

use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use graft_config::{FsProfileStore, ProfileName, RuleSystemProfiles, DEFAULT_PROFILE};
use graft_core::{RuleSystem, RuleSystemConfig};
use graft_dry_tests::dungeon::{grow_batch, grow_step, initial_dungeon, DungeonGraph};
use graft_dry_tests::{Dungeon, DungeonRules, DungeonStats};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(author, version, about = "graft rule system CLI")]
struct Args {
    /// Directory holding the profiles (defaults to the user config dir)
    #[arg(long, global = true)]
    config_dir: Option<PathBuf>,
    /// Rule system profile to use
    #[arg(long, global = true, default_value = DEFAULT_PROFILE)]
    profile: ProfileName,
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Grow a dungeon level from an entrance joined to a final room
    Grow {
        /// Rewrite steps to attempt
        #[arg(long, default_value_t = 20)]
        steps: usize,
        /// Seed for rule and match selection
        #[arg(long, default_value_t = 0)]
        seed: u64,
        /// Apply an independent batch of every rule's matches per step
        #[arg(long)]
        batch: bool,
        /// Print the grown level as JSON
        #[arg(long)]
        json: bool,
    },
    /// List the dungeon rules, their symmetry and the conflict table
    Rules,
    /// Print the effective rule system profile
    Config {
        /// Write the effective profile back to the store
        #[arg(long)]
        save: bool,
        /// List the stored profiles instead
        #[arg(long, conflicts_with = "save")]
        list: bool,
    },
}

#[derive(Serialize)]
struct RoomDump {
    index: u32,
    kind: String,
    size: u32,
}

#[derive(Serialize)]
struct LevelDump {
    rooms: Vec<RoomDump>,
    doorways: Vec<[u32; 2]>,
    rooms_created: usize,
    doorways_created: usize,
    doorways_removed: usize,
}

fn open_profiles(dir: Option<&PathBuf>) -> Result<RuleSystemProfiles<FsProfileStore>> {
    let store = match dir {
        Some(dir) => FsProfileStore::at(dir),
        None => FsProfileStore::new(),
    }
    .context("open profile store")?;
    debug!(base = %store.base().display(), "profile store");
    Ok(RuleSystemProfiles::new(store))
}

fn dungeon_system(config: RuleSystemConfig) -> Result<(RuleSystem<Dungeon>, DungeonRules)> {
    let mut system = RuleSystem::with_config(config);
    let rules = DungeonRules::register(&mut system).context("register dungeon rules")?;
    Ok((system, rules))
}

fn grow(
    system: &RuleSystem<Dungeon>,
    rules: &DungeonRules,
    steps: usize,
    seed: u64,
    batch: bool,
) -> Result<(DungeonGraph, DungeonStats)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut level = initial_dungeon()?;
    let mut stats = DungeonStats::default();
    let mut applied = 0usize;
    for step in 0..steps {
        let next = if batch {
            grow_batch(system, &level, &mut rng, &mut stats)
        } else {
            grow_step(system, rules, &level, &mut rng, &mut stats)
        }
        .with_context(|| format!("rewrite step {step}"))?;
        match next {
            Some(next) => {
                level = next;
                applied += 1;
            }
            None => debug!(step, "chosen rule had no match"),
        }
    }
    info!(
        steps,
        applied,
        rooms = level.vertex_count(),
        doorways = level.edge_count(),
        "level grown"
    );
    Ok((level, stats))
}

fn dump(level: &DungeonGraph, stats: DungeonStats) -> LevelDump {
    let mut rooms: Vec<RoomDump> = level
        .iter_vertices()
        .map(|(_, rec)| RoomDump {
            index: rec.index,
            kind: format!("{:?}", rec.payload.kind),
            size: rec.payload.size,
        })
        .collect();
    rooms.sort_by_key(|r| r.index);
    let mut doorways: Vec<[u32; 2]> = level
        .iter_edges()
        .filter_map(|(_, rec)| {
            let a = level.vertex_index(rec.ends[0])?;
            let b = level.vertex_index(rec.ends[1])?;
            Some([a.min(b), a.max(b)])
        })
        .collect();
    doorways.sort_unstable();
    LevelDump {
        rooms,
        doorways,
        rooms_created: stats.rooms_created,
        doorways_created: stats.doorways_created,
        doorways_removed: stats.doorways_removed,
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let profiles = open_profiles(args.config_dir.as_ref())?;
    let config = profiles
        .load(&args.profile)
        .with_context(|| format!("load rule system profile {}", args.profile))?;
    let mut out = std::io::stdout().lock();

    match args.cmd {
        Command::Grow {
            steps,
            seed,
            batch,
            json,
        } => {
            let (system, rules) = dungeon_system(config)?;
            let (level, stats) = grow(&system, &rules, steps, seed, batch)?;
            let report = dump(&level, stats);
            if json {
                serde_json::to_writer_pretty(&mut out, &report)?;
                writeln!(out)?;
            } else {
                writeln!(
                    out,
                    "rooms: {}  doorways: {}",
                    report.rooms.len(),
                    report.doorways.len()
                )?;
                writeln!(
                    out,
                    "created {} rooms and {} doorways, removed {} doorways",
                    report.rooms_created, report.doorways_created, report.doorways_removed
                )?;
                for [a, b] in &report.doorways {
                    writeln!(out, "  {a} -- {b}")?;
                }
            }
        }
        Command::Rules => {
            let (system, _) = dungeon_system(config)?;
            for rule in system.rules() {
                writeln!(
                    out,
                    "{:<8} {:<14} symmetric={} automorphisms={} deletes={}",
                    rule.id().to_string(),
                    rule.name().unwrap_or("-"),
                    rule.is_symmetric(),
                    rule.automorphism_count(),
                    rule.has_deletes()
                )?;
            }
            if system.has_conflicts() {
                for (victim, cutter) in system.conflicts().iter() {
                    writeln!(out, "conflict: {cutter} may delete what {victim} relies on")?;
                }
            } else {
                writeln!(out, "no conflicts")?;
            }
            writeln!(out, "parity armed: {}", system.parity_armed())?;
        }
        Command::Config { list: true, .. } => {
            for name in profiles.names().context("list profiles")? {
                let marker = if name == args.profile { "*" } else { " " };
                writeln!(out, "{marker} {name}")?;
            }
        }
        Command::Config { save, .. } => {
            serde_json::to_writer_pretty(&mut out, &config)?;
            writeln!(out)?;
            if save {
                profiles
                    .save(&args.profile, &config)
                    .with_context(|| format!("save rule system profile {}", args.profile))?;
                info!(profile = %args.profile, "profile saved");
            }
        }
    }
    Ok(())
}
