//! Sync targets and transfer direction

use serde::{Deserialize, Serialize};
use std::fmt;

/// Direction of a transfer relative to the local environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    /// local → remote
    Push,
    /// remote → local
    Pull,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Push => "push",
            Direction::Pull => "pull",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One syncable unit. Variant order is the dispatch order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "kebab-case")]
pub enum SyncTarget {
    Themes,
    Plugins,
    MuPlugins,
    Languages,
    Uploads,
    #[serde(alias = "db")]
    Database,
}

impl SyncTarget {
    pub const ALL: [SyncTarget; 6] = [
        SyncTarget::Themes,
        SyncTarget::Plugins,
        SyncTarget::MuPlugins,
        SyncTarget::Languages,
        SyncTarget::Uploads,
        SyncTarget::Database,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            SyncTarget::Themes => "themes",
            SyncTarget::Plugins => "plugins",
            SyncTarget::MuPlugins => "mu-plugins",
            SyncTarget::Languages => "languages",
            SyncTarget::Uploads => "uploads",
            SyncTarget::Database => "database",
        }
    }

    /// Single-letter shortcut used in flag clusters such as `-tpud`
    pub fn letter(&self) -> char {
        match self {
            SyncTarget::Themes => 't',
            SyncTarget::Plugins => 'p',
            SyncTarget::MuPlugins => 'm',
            SyncTarget::Languages => 'l',
            SyncTarget::Uploads => 'u',
            SyncTarget::Database => 'd',
        }
    }

    pub fn from_letter(letter: char) -> Option<SyncTarget> {
        Self::ALL.into_iter().find(|t| t.letter() == letter)
    }

    pub fn from_name(name: &str) -> Option<SyncTarget> {
        match name {
            "db" => Some(SyncTarget::Database),
            _ => Self::ALL.into_iter().find(|t| t.name() == name),
        }
    }

    pub fn is_database(&self) -> bool {
        matches!(self, SyncTarget::Database)
    }

    /// Content-relative directory for file targets
    pub fn directory(&self) -> Option<&'static str> {
        match self {
            SyncTarget::Database => None,
            other => Some(other.name()),
        }
    }

    /// Whether destination entries missing from the source are removed.
    /// Uploads hold user content and are never mirrored.
    pub fn deletes_extraneous(&self) -> bool {
        !matches!(self, SyncTarget::Uploads | SyncTarget::Database)
    }

    /// Optional directories that may be absent on some environments
    pub fn is_best_effort(&self) -> bool {
        matches!(self, SyncTarget::MuPlugins)
    }
}

impl fmt::Display for SyncTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
