// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Profiles as `<name>.json` files in one directory.

use directories::ProjectDirs;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::profile::{ConfigError, ProfileName, ProfileStore};

/// Keeps each profile in `<base>/<name>.json`.
///
/// Writes go through a sibling temporary file and a rename, so a reader
/// never observes a half-written profile.
#[derive(Debug, Clone)]
pub struct FsProfileStore {
    base: PathBuf,
}

impl FsProfileStore {
    /// Store under the user config directory (`~/.config/graft` on Linux).
    pub fn new() -> Result<Self, ConfigError> {
        let dirs =
            ProjectDirs::from("dev", "flyingrobots", "graft").ok_or(ConfigError::NoConfigDir)?;
        Self::at(dirs.config_dir())
    }

    /// Store under `base`, creating the directory if needed.
    pub fn at(base: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let base = base.as_ref().to_path_buf();
        fs::create_dir_all(&base)?;
        Ok(Self { base })
    }

    /// Directory holding the profiles.
    pub fn base(&self) -> &Path {
        &self.base
    }

    /// File backing profile `name`.
    pub fn path_of(&self, name: &ProfileName) -> PathBuf {
        self.base.join(format!("{name}.json"))
    }
}

impl ProfileStore for FsProfileStore {
    fn read(&self, name: &ProfileName) -> Result<Option<Vec<u8>>, ConfigError> {
        match fs::read(self.path_of(name)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn write(&self, name: &ProfileName, json: &[u8]) -> Result<(), ConfigError> {
        let tmp = self.base.join(format!(".{name}.json.tmp"));
        fs::write(&tmp, json)?;
        fs::rename(&tmp, self.path_of(name))?;
        Ok(())
    }

    fn names(&self) -> Result<Vec<ProfileName>, ConfigError> {
        let entries = match fs::read_dir(&self.base) {
            Ok(entries) => entries,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        let mut names = Vec::new();
        for entry in entries {
            let path = entry?.path();
            if path.extension().is_some_and(|ext| ext == "json") {
                // Files that are not valid profile names are not profiles.
                if let Some(name) = path
                    .file_stem()
                    .and_then(|stem| stem.to_str())
                    .and_then(|stem| ProfileName::new(stem).ok())
                {
                    names.push(name);
                }
            }
        }
        names.sort();
        Ok(names)
    }
}
