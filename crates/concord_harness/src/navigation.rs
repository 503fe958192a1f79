//! Scripted navigation double.
//!
//! Runs every nested dialog synchronously through the real controller
//! lifecycle, consuming one script step per navigation (defaulting to a
//! plain confirm), and records what was opened for assertions.

use std::collections::VecDeque;

use concord_dialogs::{
    DialogError, DialogKind, DialogNavigation, DialogViewModel, NavigationRequest,
};
use concord_model::{ClassKind, Iid};
use concord_session::{Session, ThingTransaction};

/// One observed navigation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NavigationRecord {
    pub class: ClassKind,
    pub kind: DialogKind,
    pub iid: Iid,
}

type EditFn = Box<dyn FnMut(&mut DialogViewModel) -> Result<(), DialogError>>;

/// What to do with the next nested dialog.
pub enum NestedScript {
    /// Close without confirming.
    Cancel,
    /// Confirm as-is.
    Approve,
    /// Apply edits, then confirm.
    ApproveWith(EditFn),
}

impl NestedScript {
    pub fn approve_with(
        edit: impl FnMut(&mut DialogViewModel) -> Result<(), DialogError> + 'static,
    ) -> Self {
        Self::ApproveWith(Box::new(edit))
    }
}

/// A [`DialogNavigation`] that drives nested dialogs from a script.
#[derive(Default)]
pub struct ScriptedNavigation {
    script: VecDeque<NestedScript>,
    pub records: Vec<NavigationRecord>,
}

impl ScriptedNavigation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the handling of the next nested dialog.
    pub fn then(mut self, step: NestedScript) -> Self {
        self.script.push_back(step);
        self
    }

    pub fn record_count(&self) -> usize {
        self.records.len()
    }
}

impl std::fmt::Debug for ScriptedNavigation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScriptedNavigation")
            .field("queued", &self.script.len())
            .field("records", &self.records)
            .finish()
    }
}

impl DialogNavigation for ScriptedNavigation {
    fn navigate(
        &mut self,
        request: NavigationRequest,
        session: &mut Session,
        txn: &mut ThingTransaction,
    ) -> Result<Option<bool>, DialogError> {
        self.records.push(NavigationRecord {
            class: request.thing.class(),
            kind: request.kind,
            iid: request.thing.iid(),
        });

        let mut vm = DialogViewModel::new(
            request.thing,
            request.kind,
            false,
            request.container.as_ref(),
            request.chain_of_containers,
        )?;
        vm.initialize(session, txn)?;
        vm.load(session, txn)?;

        let step = self.script.pop_front().unwrap_or(NestedScript::Approve);
        let confirmed = match step {
            NestedScript::Cancel => {
                vm.cancel();
                false
            }
            NestedScript::Approve => !vm.is_read_only() && vm.ok(session, txn)?,
            NestedScript::ApproveWith(mut edit) => {
                edit(&mut vm)?;
                !vm.is_read_only() && vm.ok(session, txn)?
            }
        };
        vm.dispose(session);
        Ok(Some(confirmed))
    }
}
