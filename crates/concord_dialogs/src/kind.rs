use serde::{Deserialize, Serialize};

/// The mode a dialog is opened in. Fixed for the lifetime of the dialog;
/// there are no transitions between kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogKind {
    /// The thing does not exist server-side yet.
    Create,
    /// The thing exists and is being edited.
    Update,
    /// The thing exists and is shown read-only.
    Inspect,
}

impl DialogKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Inspect => "inspect",
        }
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self, Self::Inspect)
    }
}

impl std::fmt::Display for DialogKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
