//! Observable mirror of one thing's attributes.

use std::collections::BTreeMap;

use concord_model::{ClassKind, Iid, ModelError, ScalarValue};

use crate::reactive::{Observable, ObservableList};

/// The UI-bindable state of one dialog: observable scalars, reference
/// selections and candidate lists mirroring the working copy's attributes.
///
/// Owned by exactly one [`DialogViewModel`](crate::DialogViewModel); created
/// when the dialog opens and discarded with it. Candidate ("possible") lists
/// are never persisted; each load rebuilds them from the session catalog so
/// they can never leak stale entries across loads.
#[derive(Debug)]
pub struct DialogState {
    class: ClassKind,
    scalars: BTreeMap<String, Observable<ScalarValue>>,
    references: BTreeMap<String, Observable<Option<Iid>>>,
    possible_references: BTreeMap<String, ObservableList<Iid>>,
    ref_lists: BTreeMap<String, ObservableList<Iid>>,
    possible_ref_list_items: BTreeMap<String, ObservableList<Iid>>,
    selected_container: Observable<Option<Iid>>,
    possible_containers: ObservableList<Iid>,
}

impl DialogState {
    /// Allocate empty state shaped by the class registry entry.
    pub fn for_class(class: ClassKind) -> Self {
        let def = class.def();
        Self {
            class,
            scalars: def
                .scalars
                .iter()
                .map(|a| (a.key.to_string(), Observable::new(ScalarValue::default_for(a.kind))))
                .collect(),
            references: def
                .references
                .iter()
                .map(|r| (r.key.to_string(), Observable::new(None)))
                .collect(),
            possible_references: def
                .references
                .iter()
                .map(|r| (r.key.to_string(), ObservableList::new()))
                .collect(),
            ref_lists: def
                .ref_lists
                .iter()
                .map(|r| (r.key.to_string(), ObservableList::new()))
                .collect(),
            possible_ref_list_items: def
                .ref_lists
                .iter()
                .map(|r| (r.key.to_string(), ObservableList::new()))
                .collect(),
            selected_container: Observable::new(None),
            possible_containers: ObservableList::new(),
        }
    }

    pub fn class(&self) -> ClassKind {
        self.class
    }

    // ── scalars ───────────────────────────────────────────────────

    pub fn scalar(&self, key: &str) -> Result<&ScalarValue, ModelError> {
        self.scalars.get(key).map(Observable::get).ok_or_else(|| self.unknown(key))
    }

    pub fn text(&self, key: &str) -> Result<&str, ModelError> {
        Ok(self.scalar(key)?.as_text().unwrap_or_default())
    }

    /// Write a scalar field. Kind mismatches are rejected the same way the
    /// model rejects them.
    pub fn set_scalar(&mut self, key: &str, value: ScalarValue) -> Result<bool, ModelError> {
        let class = self.class;
        let def = class.def().scalar(key).ok_or_else(|| self.unknown(key))?;
        if value.kind() != def.kind {
            return Err(ModelError::ValueKindMismatch {
                class,
                attribute: key.to_string(),
                expected: def.kind,
                actual: value.kind(),
            });
        }
        let cell = self.scalars.get_mut(key).ok_or(ModelError::UnknownAttribute {
            class,
            attribute: key.to_string(),
        })?;
        Ok(cell.set(value))
    }

    pub fn set_text(&mut self, key: &str, value: impl Into<String>) -> Result<bool, ModelError> {
        self.set_scalar(key, ScalarValue::Text(value.into()))
    }

    pub fn set_boolean(&mut self, key: &str, value: bool) -> Result<bool, ModelError> {
        self.set_scalar(key, ScalarValue::Boolean(value))
    }

    // ── single references ─────────────────────────────────────────

    pub fn reference(&self, key: &str) -> Result<Option<Iid>, ModelError> {
        self.references.get(key).map(|o| *o.get()).ok_or_else(|| self.unknown(key))
    }

    pub fn set_reference(&mut self, key: &str, to: Option<Iid>) -> Result<bool, ModelError> {
        let class = self.class;
        self.references
            .get_mut(key)
            .map(|o| o.set(to))
            .ok_or(ModelError::UnknownAttribute { class, attribute: key.to_string() })
    }

    pub fn possible_references(&self, key: &str) -> Result<&ObservableList<Iid>, ModelError> {
        self.possible_references.get(key).ok_or_else(|| self.unknown(key))
    }

    pub(crate) fn possible_references_mut(
        &mut self,
        key: &str,
    ) -> Result<&mut ObservableList<Iid>, ModelError> {
        let class = self.class;
        self.possible_references
            .get_mut(key)
            .ok_or(ModelError::UnknownAttribute { class, attribute: key.to_string() })
    }

    // ── reference lists ───────────────────────────────────────────

    pub fn ref_list(&self, key: &str) -> Result<&ObservableList<Iid>, ModelError> {
        self.ref_lists.get(key).ok_or_else(|| self.unknown(key))
    }

    pub fn ref_list_mut(&mut self, key: &str) -> Result<&mut ObservableList<Iid>, ModelError> {
        let class = self.class;
        self.ref_lists
            .get_mut(key)
            .ok_or(ModelError::UnknownAttribute { class, attribute: key.to_string() })
    }

    pub fn possible_ref_list_items(&self, key: &str) -> Result<&ObservableList<Iid>, ModelError> {
        self.possible_ref_list_items.get(key).ok_or_else(|| self.unknown(key))
    }

    pub(crate) fn possible_ref_list_items_mut(
        &mut self,
        key: &str,
    ) -> Result<&mut ObservableList<Iid>, ModelError> {
        let class = self.class;
        self.possible_ref_list_items
            .get_mut(key)
            .ok_or(ModelError::UnknownAttribute { class, attribute: key.to_string() })
    }

    // ── container ─────────────────────────────────────────────────

    pub fn selected_container(&self) -> Option<Iid> {
        *self.selected_container.get()
    }

    pub(crate) fn set_selected_container(&mut self, container: Option<Iid>) -> bool {
        self.selected_container.set(container)
    }

    pub fn possible_containers(&self) -> &ObservableList<Iid> {
        &self.possible_containers
    }

    pub(crate) fn possible_containers_mut(&mut self) -> &mut ObservableList<Iid> {
        &mut self.possible_containers
    }

    fn unknown(&self, key: &str) -> ModelError {
        ModelError::UnknownAttribute { class: self.class, attribute: key.to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_model::ScalarKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn state_is_shaped_by_the_class() {
        let state = DialogState::for_class(ClassKind::DerivedQuantityKind);
        assert_eq!(state.text("symbol").unwrap(), "");
        assert_eq!(state.reference("default_scale").unwrap(), None);
        assert!(state.scalar("exponent").is_err());
    }

    #[test]
    fn scalar_writes_are_kind_checked() {
        let mut state = DialogState::for_class(ClassKind::Person);
        let err = state.set_text("is_active", "yes").unwrap_err();
        match err {
            ModelError::ValueKindMismatch { expected, .. } => {
                assert_eq!(expected, ScalarKind::Boolean)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn repeated_identical_writes_publish_once() {
        let mut state = DialogState::for_class(ClassKind::Glossary);
        assert!(state.set_text("name", "thermal").unwrap());
        assert!(!state.set_text("name", "thermal").unwrap());
    }
}
