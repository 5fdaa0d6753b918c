// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Profile names, the storage port and config errors.

use core::fmt;
use core::str::FromStr;

use thiserror::Error;

/// Name of the profile read when none is given.
pub const DEFAULT_PROFILE: &str = "rule-system";

const MAX_NAME_LEN: usize = 64;

/// Validated name of a stored rule system profile.
///
/// Names are 1 to 64 characters of lowercase ASCII letters, digits, `-` and
/// `_`, starting with a letter or digit. They map directly onto file stems,
/// so separators and dot-files cannot be expressed.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProfileName(String);

impl ProfileName {
    /// Validates `name`.
    pub fn new(name: &str) -> Result<Self, ConfigError> {
        let well_formed = !name.is_empty()
            && name.len() <= MAX_NAME_LEN
            && name
                .bytes()
                .next()
                .is_some_and(|b| b.is_ascii_lowercase() || b.is_ascii_digit())
            && name
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-' || b == b'_');
        if well_formed {
            Ok(Self(name.to_owned()))
        } else {
            Err(ConfigError::InvalidName(name.to_owned()))
        }
    }

    /// The name as written.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for ProfileName {
    fn default() -> Self {
        Self(DEFAULT_PROFILE.to_owned())
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for ProfileName {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Errors raised while reading, validating or writing profiles.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The profile name does not follow [`ProfileName`] rules.
    #[error("invalid profile name {0:?}: use lowercase letters, digits, '-' or '_'")]
    InvalidName(String),
    /// The platform has no per-user config directory.
    #[error("no user config directory on this platform")]
    NoConfigDir,
    /// The backing store failed.
    #[error("config store: {0}")]
    Io(#[from] std::io::Error),
    /// The stored document is not JSON, or a field has the wrong type.
    #[error("profile {profile}: {source}")]
    Json {
        /// Profile being read or written.
        profile: ProfileName,
        /// Decoder or encoder error.
        #[source]
        source: serde_json::Error,
    },
    /// The stored document is JSON but not an object.
    #[error("profile {profile}: expected a JSON object")]
    NotAnObject {
        /// Profile being read.
        profile: ProfileName,
    },
    /// The document carries a key the rule system does not know.
    #[error("profile {profile}: unknown key {field:?}")]
    UnknownField {
        /// Profile being read.
        profile: ProfileName,
        /// Offending key.
        field: String,
    },
    /// `parity_check` is not `"always"` or `"when_armed"`.
    #[error("profile {profile}: parity_check must be \"always\" or \"when_armed\", got {value}")]
    InvalidParity {
        /// Profile being read.
        profile: ProfileName,
        /// Offending value, as JSON.
        value: String,
    },
    /// `match_limit` is zero, which would make every search return nothing.
    #[error("profile {profile}: match_limit must be at least 1")]
    ZeroMatchLimit {
        /// Profile being read or written.
        profile: ProfileName,
    },
}

/// Storage port for rule system profiles, kept as JSON documents by name.
pub trait ProfileStore {
    /// Reads the document stored for `name`; `None` when there is none.
    fn read(&self, name: &ProfileName) -> Result<Option<Vec<u8>>, ConfigError>;
    /// Replaces the document stored for `name`.
    fn write(&self, name: &ProfileName, json: &[u8]) -> Result<(), ConfigError>;
    /// Names of every stored profile, sorted.
    fn names(&self) -> Result<Vec<ProfileName>, ConfigError>;
}
