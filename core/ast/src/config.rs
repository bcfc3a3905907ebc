//! Tunables for the identity generator and the JSON export.
//!
//! Both records deserialize from any serde format so a host tool can keep
//! them in its own configuration file.

use serde::{Deserialize, Serialize};

/// Range policy for [`crate::ids::IdGenerator`].
///
/// IDs are handed out from `start` up to and including `max`. The call that
/// would go past `max` resets the counter and returns `start` again, so IDs
/// are only unique within one pass over the range.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdPolicy {
    pub start: u32,
    pub max: u32,
}

impl Default for IdPolicy {
    fn default() -> Self {
        Self {
            start: 1,
            max: u32::MAX,
        }
    }
}

/// Options for [`crate::serialize::to_json_string`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub pretty: bool,
}
