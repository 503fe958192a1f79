//! Child row coordination.

use tracing::trace;

use concord_model::{ChangeKind, ClassKind, ContainmentDef, Iid, Thing};
use concord_session::{Session, SessionError, SubscriptionId, ThingTransaction};

use crate::error::DialogError;
use crate::reactive::{CommandGate, CommandState};

/// One visible child row: the child's identity plus presentation state and
/// the session subscription it holds while visible.
#[derive(Debug)]
pub struct ThingRow {
    iid: Iid,
    class: ClassKind,
    label: String,
    /// Position reported by the working copy's collection at load time, for
    /// ordered collections. Not maintained across in-dialog moves; the next
    /// repopulate refreshes it.
    index: Option<usize>,
    subscription: Option<SubscriptionId>,
    disposed: bool,
}

impl ThingRow {
    fn new(thing: &Thing, index: Option<usize>, session: &mut Session) -> Self {
        Self {
            iid: thing.iid(),
            class: thing.class(),
            label: thing.label(),
            index,
            subscription: Some(session.subscribe(thing.iid())),
            disposed: false,
        }
    }

    pub fn iid(&self) -> Iid {
        self.iid
    }

    pub fn class(&self) -> ClassKind {
        self.class
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn index(&self) -> Option<usize> {
        self.index
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the row's subscription. Idempotent.
    pub fn dispose(&mut self, session: &mut Session) {
        if let Some(id) = self.subscription.take() {
            session.unsubscribe(id);
        }
        self.disposed = true;
    }
}

/// Per-collection command enablement.
#[derive(Debug)]
pub struct RowCommands {
    pub create: CommandState,
    pub edit: CommandState,
    pub delete: CommandState,
    pub inspect: CommandState,
    pub move_up: CommandState,
    pub move_down: CommandState,
}

impl RowCommands {
    fn new() -> Self {
        Self {
            create: CommandState::new(CommandGate::NotReadOnly),
            edit: CommandState::new(CommandGate::WritableSelection),
            delete: CommandState::new(CommandGate::WritableSelection),
            inspect: CommandState::new(CommandGate::SelectionRequired),
            move_up: CommandState::new(CommandGate::WritableSelection),
            move_down: CommandState::new(CommandGate::WritableSelection),
        }
    }

    fn refresh(&mut self, read_only: bool, has_selection: bool) {
        self.create.refresh(read_only, has_selection);
        self.edit.refresh(read_only, has_selection);
        self.delete.refresh(read_only, has_selection);
        self.inspect.refresh(read_only, has_selection);
        self.move_up.refresh(read_only, has_selection);
        self.move_down.refresh(read_only, has_selection);
    }
}

/// Owns the ordered, observable row list for one owned child collection of
/// the dialog's thing, plus the selection and command states that gate the
/// child CRUD operations.
///
/// Repopulation is always clear-then-rebuild from the working copy's current
/// collection, never an incremental patch, so the visible list always
/// reflects the latest snapshot state and pending deletions. Transient
/// presentation state (selection included) does not survive a repopulate.
#[derive(Debug)]
pub struct RowCoordinator {
    key: &'static str,
    child_class: ClassKind,
    ordered: bool,
    rows: Vec<ThingRow>,
    selected: Option<Iid>,
    pub commands: RowCommands,
}

impl RowCoordinator {
    pub(crate) fn new(def: &ContainmentDef) -> Self {
        Self {
            key: def.key,
            child_class: def.child,
            ordered: def.ordered,
            rows: Vec::new(),
            selected: None,
            commands: RowCommands::new(),
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn child_class(&self) -> ClassKind {
        self.child_class
    }

    pub fn is_ordered(&self) -> bool {
        self.ordered
    }

    pub fn rows(&self) -> &[ThingRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn selected(&self) -> Option<Iid> {
        self.selected
    }

    /// The row sequence as the user arranged it: the target order for
    /// commit-time reconciliation.
    pub fn row_order(&self) -> Vec<Iid> {
        self.rows.iter().map(ThingRow::iid).collect()
    }

    /// Change the selection and re-evaluate every dependent command.
    pub(crate) fn select(&mut self, iid: Option<Iid>, read_only: bool) {
        self.selected = iid.filter(|x| self.rows.iter().any(|r| r.iid() == *x));
        self.refresh_commands(read_only);
    }

    pub(crate) fn refresh_commands(&mut self, read_only: bool) {
        self.commands.refresh(read_only, self.selected.is_some());
    }

    /// Clear and rebuild the rows from `parent`'s collection, skipping
    /// children the transaction has pending as deleted. Ordered collections
    /// record each child's reported index.
    pub(crate) fn repopulate(
        &mut self,
        parent: &Thing,
        txn: &ThingTransaction,
        session: &mut Session,
        read_only: bool,
    ) -> Result<(), DialogError> {
        let mut specs: Vec<(Thing, Option<usize>)> = Vec::new();
        for (pos, child) in parent.containment(self.key)?.iter().enumerate() {
            if txn.change_kind(*child) == ChangeKind::Delete {
                continue;
            }
            let thing = txn
                .resolve(session, *child)
                .cloned()
                .ok_or(SessionError::NotFound(*child))?;
            specs.push((thing, self.ordered.then_some(pos)));
        }

        for row in &mut self.rows {
            row.dispose(session);
        }
        self.rows.clear();
        for (thing, index) in &specs {
            self.rows.push(ThingRow::new(thing, *index, session));
        }
        trace!(collection = self.key, rows = self.rows.len(), "repopulated child rows");

        self.selected = None;
        self.refresh_commands(read_only);
        Ok(())
    }

    /// Swap the selected row with its predecessor. Dialog-state only; the
    /// working copy is untouched until commit.
    pub(crate) fn move_selected_up(&mut self) -> bool {
        let Some(pos) = self.selected_position() else { return false };
        if pos == 0 {
            return false;
        }
        self.rows.swap(pos, pos - 1);
        true
    }

    /// Swap the selected row with its successor. Dialog-state only.
    pub(crate) fn move_selected_down(&mut self) -> bool {
        let Some(pos) = self.selected_position() else { return false };
        if pos + 1 >= self.rows.len() {
            return false;
        }
        self.rows.swap(pos, pos + 1);
        true
    }

    fn selected_position(&self) -> Option<usize> {
        let selected = self.selected?;
        self.rows.iter().position(|r| r.iid() == selected)
    }

    /// Dispose every row. Idempotent; disposing an already-empty coordinator
    /// is a no-op.
    pub(crate) fn dispose(&mut self, session: &mut Session) {
        for row in &mut self.rows {
            row.dispose(session);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use concord_model::ClassKind;
    use pretty_assertions::assert_eq;

    fn coordinator() -> RowCoordinator {
        let def = ClassKind::DerivedQuantityKind
            .def()
            .containment("quantity_kind_factor")
            .unwrap();
        RowCoordinator::new(def)
    }

    fn populated(session: &mut Session, n: usize) -> (RowCoordinator, Thing, ThingTransaction) {
        let mut parent = Thing::new(ClassKind::DerivedQuantityKind);
        for _ in 0..n {
            let factor = Thing::new(ClassKind::QuantityKindFactor);
            parent.containment_mut("quantity_kind_factor").unwrap().push(factor.iid());
            session.insert(factor);
        }
        let txn = ThingTransaction::new();
        let mut coord = coordinator();
        coord.repopulate(&parent, &txn, session, false).unwrap();
        (coord, parent, txn)
    }

    #[test]
    fn repopulate_builds_one_row_per_surviving_child() {
        let mut session = Session::new();
        let (coord, parent, mut txn) = populated(&mut session, 3);
        assert_eq!(coord.row_count(), 3);
        assert_eq!(coord.rows()[1].index(), Some(1));

        // mark the middle child deleted and rebuild
        let victim = parent.containment("quantity_kind_factor").unwrap()[1];
        txn.register_delete(victim, &session).unwrap();
        let mut coord = coord;
        coord.repopulate(&parent, &txn, &mut session, false).unwrap();

        assert_eq!(coord.row_count(), 2);
        assert!(coord.rows().iter().all(|r| r.iid() != victim));
        // indices still report the snapshot position, gaps included
        assert_eq!(coord.rows()[1].index(), Some(2));
    }

    #[test]
    fn selection_gates_commands() {
        let mut session = Session::new();
        let (mut coord, _, _) = populated(&mut session, 2);
        assert!(coord.commands.create.is_enabled());
        assert!(!coord.commands.edit.is_enabled());

        let first = coord.rows()[0].iid();
        coord.select(Some(first), false);
        assert!(coord.commands.edit.is_enabled());
        assert!(coord.commands.delete.is_enabled());
        assert!(coord.commands.inspect.is_enabled());

        // read-only: inspect survives, mutating commands do not
        coord.select(Some(first), true);
        assert!(!coord.commands.edit.is_enabled());
        assert!(!coord.commands.create.is_enabled());
        assert!(coord.commands.inspect.is_enabled());
    }

    #[test]
    fn selecting_a_foreign_iid_clears_selection() {
        let mut session = Session::new();
        let (mut coord, _, _) = populated(&mut session, 1);
        coord.select(Some(Iid::new()), false);
        assert_eq!(coord.selected(), None);
    }

    #[test]
    fn moves_swap_rows_without_touching_indices() {
        let mut session = Session::new();
        let (mut coord, _, _) = populated(&mut session, 3);
        let order = coord.row_order();
        coord.select(Some(order[1]), false);

        assert!(coord.move_selected_down());
        assert_eq!(coord.row_order(), vec![order[0], order[2], order[1]]);
        assert!(!coord.move_selected_down(), "already last");

        assert!(coord.move_selected_up());
        assert!(coord.move_selected_up());
        assert_eq!(coord.row_order(), vec![order[1], order[0], order[2]]);
        assert!(!coord.move_selected_up(), "already first");
    }

    #[test]
    fn repopulate_disposes_replaced_rows() {
        let mut session = Session::new();
        let (mut coord, parent, txn) = populated(&mut session, 2);
        assert_eq!(session.subscription_count(), 2);

        coord.repopulate(&parent, &txn, &mut session, false).unwrap();
        assert_eq!(session.subscription_count(), 2, "old rows must release before new rows subscribe");

        coord.dispose(&mut session);
        assert_eq!(session.subscription_count(), 0);
        assert!(coord.rows().iter().all(ThingRow::is_disposed));
        coord.dispose(&mut session); // idempotent
        assert_eq!(session.subscription_count(), 0);
    }
}
