//! The `Thing` record.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::class::ClassKind;
use crate::error::ModelError;
use crate::iid::Iid;
use crate::value::ScalarValue;

/// An identity-bearing node of the model graph.
///
/// Shape is dictated by the class registry: attribute maps are initialized
/// from the [`ClassDef`](crate::ClassDef) on construction and typed accessors
/// reject keys or value kinds the class does not declare. Collections hold
/// iids, not objects; a `Clone` of a `Thing` is therefore the shallow
/// working-copy the edit layer operates on.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Thing {
    iid: Iid,
    class: ClassKind,
    revision_number: u32,
    container: Option<Iid>,
    modified_on: Option<DateTime<Utc>>,
    scalars: BTreeMap<String, ScalarValue>,
    references: BTreeMap<String, Option<Iid>>,
    ref_lists: BTreeMap<String, Vec<Iid>>,
    containments: BTreeMap<String, Vec<Iid>>,
}

impl Thing {
    /// Instantiate a fresh thing of `class` with a new iid, revision 0, and
    /// zero values for every declared attribute.
    pub fn new(class: ClassKind) -> Self {
        Self::with_iid(class, Iid::new())
    }

    /// Instantiate with a caller-chosen iid (fixtures, deserialized data).
    pub fn with_iid(class: ClassKind, iid: Iid) -> Self {
        let def = class.def();
        Self {
            iid,
            class,
            revision_number: 0,
            container: None,
            modified_on: None,
            scalars: def
                .scalars
                .iter()
                .map(|a| (a.key.to_string(), ScalarValue::default_for(a.kind)))
                .collect(),
            references: def.references.iter().map(|r| (r.key.to_string(), None)).collect(),
            ref_lists: def.ref_lists.iter().map(|r| (r.key.to_string(), Vec::new())).collect(),
            containments: def.containments.iter().map(|c| (c.key.to_string(), Vec::new())).collect(),
        }
    }

    // ── identity & bookkeeping ────────────────────────────────────

    pub fn iid(&self) -> Iid {
        self.iid
    }

    pub fn class(&self) -> ClassKind {
        self.class
    }

    pub fn revision_number(&self) -> u32 {
        self.revision_number
    }

    pub fn bump_revision(&mut self) {
        self.revision_number += 1;
    }

    pub fn container(&self) -> Option<Iid> {
        self.container
    }

    pub fn set_container(&mut self, container: Option<Iid>) {
        self.container = container;
    }

    pub fn modified_on(&self) -> Option<DateTime<Utc>> {
        self.modified_on
    }

    pub fn set_modified_on(&mut self, at: DateTime<Utc>) {
        self.modified_on = Some(at);
    }

    /// Whether `container_class` satisfies this thing's container rule.
    pub fn accepts_container(&self, container_class: ClassKind) -> bool {
        self.class.def().container.accepts(container_class)
    }

    /// Display label: `name`, falling back to `short_name`, falling back to
    /// the short iid.
    pub fn label(&self) -> String {
        for key in ["name", "short_name"] {
            if let Some(value) = self.scalars.get(key) {
                if let Some(text) = value.as_text() {
                    if !text.is_empty() {
                        return text.to_string();
                    }
                }
            }
        }
        self.iid.short()
    }

    // ── scalars ───────────────────────────────────────────────────

    pub fn scalar(&self, key: &str) -> Result<&ScalarValue, ModelError> {
        self.scalars.get(key).ok_or_else(|| self.unknown(key))
    }

    pub fn set_scalar(&mut self, key: &str, value: ScalarValue) -> Result<(), ModelError> {
        let def = self.class.def().scalar(key).ok_or_else(|| self.unknown(key))?;
        if value.kind() != def.kind {
            return Err(ModelError::ValueKindMismatch {
                class: self.class,
                attribute: key.to_string(),
                expected: def.kind,
                actual: value.kind(),
            });
        }
        self.scalars.insert(key.to_string(), value);
        Ok(())
    }

    pub fn text(&self, key: &str) -> Result<&str, ModelError> {
        Ok(self.scalar(key)?.as_text().unwrap_or_default())
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<(), ModelError> {
        self.set_scalar(key, ScalarValue::Text(value.into()))
    }

    pub fn boolean(&self, key: &str) -> Result<bool, ModelError> {
        Ok(self.scalar(key)?.as_boolean().unwrap_or_default())
    }

    pub fn set_boolean(&mut self, key: &str, value: bool) -> Result<(), ModelError> {
        self.set_scalar(key, ScalarValue::Boolean(value))
    }

    /// Scalar map in declaration order, for load/commit sweeps.
    pub fn scalars(&self) -> impl Iterator<Item = (&str, &ScalarValue)> {
        self.scalars.iter().map(|(k, v)| (k.as_str(), v))
    }

    // ── single references ─────────────────────────────────────────

    pub fn reference(&self, key: &str) -> Result<Option<Iid>, ModelError> {
        self.references.get(key).copied().ok_or_else(|| self.unknown(key))
    }

    pub fn set_reference(&mut self, key: &str, to: Option<Iid>) -> Result<(), ModelError> {
        if self.class.def().reference(key).is_none() {
            return Err(self.unknown(key));
        }
        self.references.insert(key.to_string(), to);
        Ok(())
    }

    // ── reference lists ───────────────────────────────────────────

    pub fn ref_list(&self, key: &str) -> Result<&[Iid], ModelError> {
        self.ref_lists.get(key).map(Vec::as_slice).ok_or_else(|| self.unknown(key))
    }

    pub fn ref_list_mut(&mut self, key: &str) -> Result<&mut Vec<Iid>, ModelError> {
        let class = self.class;
        self.ref_lists
            .get_mut(key)
            .ok_or(ModelError::UnknownAttribute { class, attribute: key.to_string() })
    }

    // ── containment collections ───────────────────────────────────

    pub fn containment(&self, key: &str) -> Result<&[Iid], ModelError> {
        self.containments.get(key).map(Vec::as_slice).ok_or_else(|| self.unknown(key))
    }

    pub fn containment_mut(&mut self, key: &str) -> Result<&mut Vec<Iid>, ModelError> {
        let class = self.class;
        self.containments
            .get_mut(key)
            .ok_or(ModelError::UnknownAttribute { class, attribute: key.to_string() })
    }

    /// All contained iids across every collection, for cascade removal.
    pub fn contained_iids(&self) -> impl Iterator<Item = Iid> + '_ {
        self.containments.values().flatten().copied()
    }

    fn unknown(&self, key: &str) -> ModelError {
        ModelError::UnknownAttribute { class: self.class, attribute: key.to_string() }
    }
}
