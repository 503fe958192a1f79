//! Scalar attribute values.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value kind of a scalar attribute, declared per attribute in the class
/// registry. Writes with a mismatched kind are rejected, never coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScalarKind {
    Text,
    Boolean,
    Integer,
    Real,
    Instant,
}

impl ScalarKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Boolean => "boolean",
            Self::Integer => "integer",
            Self::Real => "real",
            Self::Instant => "instant",
        }
    }
}

impl std::fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A scalar attribute value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ScalarValue {
    Text(String),
    Boolean(bool),
    Integer(i64),
    Real(f64),
    Instant(DateTime<Utc>),
}

impl ScalarValue {
    pub fn kind(&self) -> ScalarKind {
        match self {
            Self::Text(_) => ScalarKind::Text,
            Self::Boolean(_) => ScalarKind::Boolean,
            Self::Integer(_) => ScalarKind::Integer,
            Self::Real(_) => ScalarKind::Real,
            Self::Instant(_) => ScalarKind::Instant,
        }
    }

    /// The zero value for a kind, used when instantiating a fresh thing.
    pub fn default_for(kind: ScalarKind) -> Self {
        match kind {
            ScalarKind::Text => Self::Text(String::new()),
            ScalarKind::Boolean => Self::Boolean(false),
            ScalarKind::Integer => Self::Integer(0),
            ScalarKind::Real => Self::Real(0.0),
            ScalarKind::Instant => Self::Instant(DateTime::<Utc>::UNIX_EPOCH),
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_boolean(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Self::Integer(i) => Some(*i),
            _ => None,
        }
    }
}

impl From<&str> for ScalarValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for ScalarValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<bool> for ScalarValue {
    fn from(b: bool) -> Self {
        Self::Boolean(b)
    }
}

impl From<i64> for ScalarValue {
    fn from(i: i64) -> Self {
        Self::Integer(i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn kind_matches_variant() {
        assert_eq!(ScalarValue::from("x").kind(), ScalarKind::Text);
        assert_eq!(ScalarValue::from(true).kind(), ScalarKind::Boolean);
        assert_eq!(ScalarValue::from(3i64).kind(), ScalarKind::Integer);
        assert_eq!(ScalarValue::Real(1.5).kind(), ScalarKind::Real);
    }

    #[test]
    fn default_for_matches_kind() {
        for kind in [
            ScalarKind::Text,
            ScalarKind::Boolean,
            ScalarKind::Integer,
            ScalarKind::Real,
            ScalarKind::Instant,
        ] {
            assert_eq!(ScalarValue::default_for(kind).kind(), kind);
        }
    }

    #[test]
    fn tagged_serialization() {
        let json = serde_json::to_value(ScalarValue::from("kg")).unwrap();
        assert_eq!(json["kind"], "text");
        assert_eq!(json["value"], "kg");
    }
}
