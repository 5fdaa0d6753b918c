// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Typed access to [`RuleSystemConfig`] profiles.

use graft_core::RuleSystemConfig;
use serde_json::Value;
use tracing::debug;

use crate::profile::{ConfigError, ProfileName, ProfileStore};

const FIELDS: [&str; 3] = ["parity_check", "match_limit", "trace_pregraph"];
const PARITY_VALUES: [&str; 2] = ["always", "when_armed"];

/// Loads and saves validated rule system configurations through a
/// [`ProfileStore`].
///
/// A missing or empty profile loads as [`RuleSystemConfig::default`]. Stored
/// documents are checked key by key before decoding, so a typo or a bad
/// value names the profile and the offending key.
#[derive(Debug, Clone)]
pub struct RuleSystemProfiles<S> {
    store: S,
}

impl<S: ProfileStore> RuleSystemProfiles<S> {
    /// Wraps `store`.
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Backing store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// The stored configuration for `name`, if any.
    pub fn load_stored(
        &self,
        name: &ProfileName,
    ) -> Result<Option<RuleSystemConfig>, ConfigError> {
        match self.store.read(name)? {
            Some(bytes) if !bytes.is_empty() => decode(name, &bytes).map(Some),
            _ => Ok(None),
        }
    }

    /// The configuration for `name`, or the default when nothing is stored.
    pub fn load(&self, name: &ProfileName) -> Result<RuleSystemConfig, ConfigError> {
        let stored = self.load_stored(name)?;
        if stored.is_none() {
            debug!(profile = %name, "no stored profile, using defaults");
        }
        Ok(stored.unwrap_or_default())
    }

    /// Validates `config` and stores it under `name`.
    pub fn save(&self, name: &ProfileName, config: &RuleSystemConfig) -> Result<(), ConfigError> {
        validate(name, config)?;
        let json = serde_json::to_vec_pretty(config).map_err(|source| ConfigError::Json {
            profile: name.clone(),
            source,
        })?;
        self.store.write(name, &json)?;
        debug!(profile = %name, bytes = json.len(), "profile saved");
        Ok(())
    }

    /// Names of the stored profiles.
    pub fn names(&self) -> Result<Vec<ProfileName>, ConfigError> {
        self.store.names()
    }
}

/// Checks value ranges the type system leaves open.
pub fn validate(name: &ProfileName, config: &RuleSystemConfig) -> Result<(), ConfigError> {
    if config.match_limit == Some(0) {
        return Err(ConfigError::ZeroMatchLimit {
            profile: name.clone(),
        });
    }
    Ok(())
}

fn decode(name: &ProfileName, bytes: &[u8]) -> Result<RuleSystemConfig, ConfigError> {
    let json = |source| ConfigError::Json {
        profile: name.clone(),
        source,
    };
    let value: Value = serde_json::from_slice(bytes).map_err(json)?;
    let Value::Object(fields) = &value else {
        return Err(ConfigError::NotAnObject {
            profile: name.clone(),
        });
    };
    if let Some(field) = fields.keys().find(|k| !FIELDS.contains(&k.as_str())) {
        return Err(ConfigError::UnknownField {
            profile: name.clone(),
            field: field.clone(),
        });
    }
    if let Some(parity) = fields.get("parity_check") {
        if !parity.as_str().is_some_and(|p| PARITY_VALUES.contains(&p)) {
            return Err(ConfigError::InvalidParity {
                profile: name.clone(),
                value: parity.to_string(),
            });
        }
    }
    let config: RuleSystemConfig = serde_json::from_value(value).map_err(json)?;
    validate(name, &config)?;
    Ok(config)
}
