// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Stored rule system profiles for graft tools.
//!
//! A profile is a named [`RuleSystemConfig`](graft_core::RuleSystemConfig)
//! kept as a JSON document. [`ProfileStore`] is the storage port,
//! [`FsProfileStore`] keeps one file per profile, and [`RuleSystemProfiles`]
//! validates documents on the way in and out.
#![forbid(unsafe_code)]

mod fs;
mod profile;
mod store;

pub use fs::FsProfileStore;
pub use profile::{ConfigError, ProfileName, ProfileStore, DEFAULT_PROFILE};
pub use store::{validate, RuleSystemProfiles};
