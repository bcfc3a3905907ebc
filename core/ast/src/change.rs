//! Change-tracking annotations attached to every node by the external
//! differencing pass.

use std::fmt::{self, Display, Formatter};

use serde::{Deserialize, Serialize};

/// How a node differs between two versions of a tree.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    Inserted,
    Removed,
    Updated,
    Moved,
    Unchanged,
    #[default]
    Unknown,
}

impl ChangeType {
    pub const ALL: [ChangeType; 6] = [
        ChangeType::Inserted,
        ChangeType::Removed,
        ChangeType::Updated,
        ChangeType::Moved,
        ChangeType::Unchanged,
        ChangeType::Unknown,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            ChangeType::Inserted => "INSERTED",
            ChangeType::Removed => "REMOVED",
            ChangeType::Updated => "UPDATED",
            ChangeType::Moved => "MOVED",
            ChangeType::Unchanged => "UNCHANGED",
            ChangeType::Unknown => "UNKNOWN",
        }
    }
}

impl Display for ChangeType {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The per-node annotation record.
///
/// `change_noprop` is the node's own classification, ignoring anything
/// inherited from ancestors or descendants. `moved` is independent of both.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeInfo {
    pub change: ChangeType,
    pub change_noprop: ChangeType,
    pub moved: bool,
}

impl ChangeInfo {
    #[must_use]
    pub fn new(change: ChangeType, change_noprop: ChangeType, moved: bool) -> Self {
        Self {
            change,
            change_noprop,
            moved,
        }
    }
}
