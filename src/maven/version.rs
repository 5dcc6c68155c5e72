use std::fmt::{Display, Formatter};

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::PublishError;

lazy_static! {
    /// a 40 character commit hash, or anything ending in '-SNAPSHOT'
    static ref SNAPSHOT_VERSION_REGEX: Regex = Regex::new(r"^[0-9a-fA-F]{40}$|^.*-SNAPSHOT$").unwrap();
    /// MAJOR.MINOR.PATCH, optionally followed by '-qualifier' segments
    static ref RELEASE_VERSION_REGEX: Regex = Regex::new(r"^[0-9]+\.[0-9]+\.[0-9]+(-[a-zA-Z0-9]+)*$").unwrap();
}

#[derive(Debug, Eq, PartialEq, Clone, Copy)]
pub enum VersionMode {
    Release,
    Snapshot,
}
impl VersionMode {
    pub fn from_snapshot_flag(is_snapshot: bool) -> VersionMode {
        if is_snapshot { VersionMode::Snapshot } else { VersionMode::Release }
    }
}
impl Display for VersionMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            VersionMode::Release => write!(f, "release"),
            VersionMode::Snapshot => write!(f, "snapshot"),
        }
    }
}

/// A version string that was checked against the grammar of its mode. Only release versions move
///  the 'release' pointer of a repository's metadata.
#[derive(Debug, Eq, PartialEq, Clone)]
pub enum MavenVersion {
    Release(String),
    Snapshot(String),
}
impl MavenVersion {
    pub fn validate(version: &str, mode: VersionMode) -> Result<MavenVersion, PublishError> {
        let is_valid = match mode {
            VersionMode::Release => RELEASE_VERSION_REGEX.is_match(version),
            VersionMode::Snapshot => SNAPSHOT_VERSION_REGEX.is_match(version),
        };
        if !is_valid {
            return Err(PublishError::InvalidVersion {
                version: version.to_string(),
                mode,
            });
        }

        Ok(match mode {
            VersionMode::Release => MavenVersion::Release(version.to_string()),
            VersionMode::Snapshot => MavenVersion::Snapshot(version.to_string()),
        })
    }

    pub fn as_str(&self) -> &str {
        match self {
            MavenVersion::Release(v) => v,
            MavenVersion::Snapshot(v) => v,
        }
    }

    pub fn is_snapshot(&self) -> bool {
        matches!(self, MavenVersion::Snapshot(_))
    }

    pub fn mode(&self) -> VersionMode {
        match self {
            MavenVersion::Release(_) => VersionMode::Release,
            MavenVersion::Snapshot(_) => VersionMode::Snapshot,
        }
    }
}
impl Display for MavenVersion {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
