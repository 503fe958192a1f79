//! Thing identity.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a [`Thing`](crate::Thing).
///
/// Assigned once when the thing is first instantiated and never changed,
/// including across clone/edit/commit cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Iid(Uuid);

impl Iid {
    /// Mint a fresh identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }

    /// First 8 hex characters, for log lines and fallback labels.
    pub fn short(&self) -> String {
        self.0.simple().to_string()[..8].to_string()
    }
}

impl Default for Iid {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for Iid {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_iids_are_distinct() {
        assert_ne!(Iid::new(), Iid::new());
    }

    #[test]
    fn short_is_eight_chars() {
        assert_eq!(Iid::new().short().len(), 8);
    }

    #[test]
    fn serializes_as_bare_uuid() {
        let iid = Iid::new();
        let json = serde_json::to_string(&iid).unwrap();
        assert_eq!(json, format!("\"{}\"", iid.as_uuid()));
    }
}
