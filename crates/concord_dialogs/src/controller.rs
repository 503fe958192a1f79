//! The dialog view-model.

use std::collections::BTreeMap;

use chrono::Utc;
use tracing::{debug, warn};

use concord_model::{ClassKind, Iid, Thing};
use concord_session::{Session, SessionError, ThingTransaction, TransactionError};

use crate::error::DialogError;
use crate::kind::DialogKind;
use crate::navigation::{DialogNavigation, NavigationRequest};
use crate::reconcile::{reconcile, OrderedCaps, OrderedMutation};
use crate::rows::RowCoordinator;
use crate::state::DialogState;

/// What a commit did to the working copy's ordered collections, keyed by
/// collection. Lets callers (and tests) verify that a single user move
/// reached the transaction as a single move operation.
#[derive(Debug, Default, Clone)]
pub struct CommitReport {
    pub ordered_mutations: BTreeMap<String, Vec<OrderedMutation>>,
}

impl CommitReport {
    pub fn total_mutations(&self) -> usize {
        self.ordered_mutations.values().map(Vec::len).sum()
    }
}

/// Binds one thing's working copy to one dialog's observable state for the
/// lifetime of a modal edit.
///
/// The mode is fixed at construction and never changes. The lifecycle is
/// `new` → [`initialize`] → [`load`] → user edits → [`ok`] (or [`cancel`]) →
/// [`dispose`]; `load` may run again whenever the working copy changed
/// underneath (after every confirmed child dialog, for instance).
///
/// [`initialize`]: DialogViewModel::initialize
/// [`load`]: DialogViewModel::load
/// [`ok`]: DialogViewModel::ok
/// [`cancel`]: DialogViewModel::cancel
/// [`dispose`]: DialogViewModel::dispose
#[derive(Debug)]
pub struct DialogViewModel {
    iid: Iid,
    class: ClassKind,
    kind: DialogKind,
    is_root: bool,
    snapshot: Thing,
    supplied_container: Option<Iid>,
    chain_of_containers: Vec<Iid>,
    state: DialogState,
    coordinators: Vec<RowCoordinator>,
    ok_can_execute: bool,
    dialog_result: Option<bool>,
    write_error: Option<String>,
    disposed: bool,
}

impl DialogViewModel {
    /// Wrap a working copy for editing in `kind` mode.
    ///
    /// When a container is supplied it must satisfy the thing's container
    /// rule; a mismatch fails immediately with
    /// [`DialogError::InvalidContainerType`] and is never silently coerced.
    pub fn new(
        thing: Thing,
        kind: DialogKind,
        is_root: bool,
        container: Option<&Thing>,
        chain_of_containers: Vec<Iid>,
    ) -> Result<Self, DialogError> {
        if let Some(container) = container {
            if !thing.accepts_container(container.class()) {
                return Err(DialogError::InvalidContainerType {
                    class: thing.class(),
                    supplied: container.class(),
                });
            }
        }
        let class = thing.class();
        Ok(Self {
            iid: thing.iid(),
            class,
            kind,
            is_root,
            snapshot: thing,
            supplied_container: container.map(Thing::iid),
            chain_of_containers,
            state: DialogState::for_class(class),
            coordinators: Vec::new(),
            ok_can_execute: false,
            dialog_result: None,
            write_error: None,
            disposed: false,
        })
    }

    // ── accessors ─────────────────────────────────────────────────

    pub fn iid(&self) -> Iid {
        self.iid
    }

    pub fn class(&self) -> ClassKind {
        self.class
    }

    pub fn kind(&self) -> DialogKind {
        self.kind
    }

    pub fn is_root(&self) -> bool {
        self.is_root
    }

    pub fn is_read_only(&self) -> bool {
        self.kind.is_read_only()
    }

    pub fn state(&self) -> &DialogState {
        &self.state
    }

    /// Mutable dialog state for field edits. A rendering shell is expected
    /// to honor [`is_read_only`](Self::is_read_only); commit refuses
    /// read-only dialogs regardless.
    pub fn state_mut(&mut self) -> &mut DialogState {
        &mut self.state
    }

    pub fn coordinators(&self) -> &[RowCoordinator] {
        &self.coordinators
    }

    pub fn coordinator(&self, collection: &str) -> Option<&RowCoordinator> {
        self.coordinators.iter().find(|c| c.key() == collection)
    }

    pub fn ok_can_execute(&self) -> bool {
        self.ok_can_execute
    }

    pub fn dialog_result(&self) -> Option<bool> {
        self.dialog_result
    }

    pub fn write_error(&self) -> Option<&str> {
        self.write_error.as_deref()
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    // ── lifecycle ─────────────────────────────────────────────────

    /// Allocate dialog collections, populate the candidate-container list
    /// for the mode, and register the working copy with the transaction.
    /// Called once, before the first [`load`](Self::load).
    pub fn initialize(
        &mut self,
        session: &Session,
        txn: &mut ThingTransaction,
    ) -> Result<(), DialogError> {
        self.coordinators = self
            .class
            .def()
            .containments
            .iter()
            .map(RowCoordinator::new)
            .collect();
        self.populate_possible_containers(session, txn)?;

        match self.kind {
            DialogKind::Create => {
                if let Some(container) = self.state.selected_container() {
                    let key = self.collection_key_in(session, txn, container)?;
                    txn.register_create(self.snapshot.clone(), container, key, session)?;
                }
            }
            DialogKind::Update => txn.register_update(self.snapshot.clone()),
            DialogKind::Inspect => {}
        }

        self.update_ok_can_execute();
        debug!(class = %self.class, kind = %self.kind, iid = %self.iid, "dialog initialized");
        Ok(())
    }

    /// Copy the working copy into the dialog state and rebuild every derived
    /// collection: scalar and reference fields, candidate lists, child rows.
    /// Children the transaction has pending as deleted are filtered out.
    pub fn load(
        &mut self,
        session: &mut Session,
        txn: &ThingTransaction,
    ) -> Result<(), DialogError> {
        let clone = self.working_clone(session, txn);
        let def = self.class.def();

        for attr in def.scalars {
            self.state.set_scalar(attr.key, clone.scalar(attr.key)?.clone())?;
        }
        for reference in def.references {
            self.state.set_reference(reference.key, clone.reference(reference.key)?)?;
            let candidates: Vec<Iid> = session
                .things_of_class(reference.target)
                .iter()
                .map(|t| t.iid())
                .collect();
            self.state.possible_references_mut(reference.key)?.replace_all(candidates);
        }
        for list in def.ref_lists {
            self.state.ref_list_mut(list.key)?.replace_all(clone.ref_list(list.key)?.to_vec());
            let candidates: Vec<Iid> = session
                .things_of_class(list.target)
                .iter()
                .map(|t| t.iid())
                .collect();
            self.state.possible_ref_list_items_mut(list.key)?.replace_all(candidates);
        }

        let read_only = self.is_read_only();
        for coordinator in &mut self.coordinators {
            coordinator.repopulate(&clone, txn, session, read_only)?;
        }

        self.update_ok_can_execute();
        debug!(class = %self.class, iid = %self.iid, "dialog state loaded");
        Ok(())
    }

    /// Copy the dialog state back onto the working copy and re-register it
    /// with the transaction.
    ///
    /// Unordered reference lists are replaced wholesale. Ordered reference
    /// lists and ordered child collections are reconciled with minimal
    /// moves, honoring each collection's declared capabilities.
    pub fn commit(
        &mut self,
        session: &Session,
        txn: &mut ThingTransaction,
    ) -> Result<CommitReport, DialogError> {
        if self.is_read_only() {
            return Err(DialogError::ReadOnly { class: self.class });
        }

        let mut clone = self.working_clone(session, txn);
        let def = self.class.def();
        let mut report = CommitReport::default();

        for attr in def.scalars {
            clone.set_scalar(attr.key, self.state.scalar(attr.key)?.clone())?;
        }
        for reference in def.references {
            clone.set_reference(reference.key, self.state.reference(reference.key)?)?;
        }
        for list in def.ref_lists {
            let target = self.state.ref_list(list.key)?.to_vec();
            let current = clone.ref_list_mut(list.key)?;
            if list.ordered {
                let caps = OrderedCaps {
                    insert: list.supports_insert,
                    remove_surplus: list.supports_surplus_removal,
                };
                let mutations = reconcile(current, &target, caps);
                if !mutations.is_empty() {
                    report.ordered_mutations.insert(list.key.to_string(), mutations);
                }
            } else {
                current.clear();
                current.extend(target);
            }
        }
        for coordinator in &self.coordinators {
            if !coordinator.is_ordered() {
                continue;
            }
            let target = coordinator.row_order();
            let current = clone.containment_mut(coordinator.key())?;
            let mutations = reconcile(current, &target, OrderedCaps::MOVE_ONLY);
            if !mutations.is_empty() {
                report.ordered_mutations.insert(coordinator.key().to_string(), mutations);
            }
        }

        if self.kind == DialogKind::Create {
            clone.set_container(self.state.selected_container());
        }
        clone.set_modified_on(Utc::now());
        txn.register_update(clone);

        debug!(
            class = %self.class,
            iid = %self.iid,
            ordered_mutations = report.total_mutations(),
            "dialog state committed"
        );
        Ok(report)
    }

    /// Confirm the dialog. Root dialogs finalize the transaction and write
    /// it to the session; a failed write is captured in
    /// [`write_error`](Self::write_error) and leaves the dialog open
    /// (`dialog_result` unset). Nested dialogs only commit; the opener
    /// merges their branch.
    pub fn ok(
        &mut self,
        session: &mut Session,
        txn: &mut ThingTransaction,
    ) -> Result<bool, DialogError> {
        if self.is_read_only() {
            self.dialog_result = Some(false);
            return Ok(false);
        }
        self.commit(session, txn)?;

        if self.is_root {
            let operations = txn.finalize(self.iid);
            match session.write(operations) {
                Ok(()) => {
                    self.write_error = None;
                    self.dialog_result = Some(true);
                    Ok(true)
                }
                Err(err) => {
                    warn!(class = %self.class, iid = %self.iid, error = %err, "session write failed");
                    self.write_error = Some(err.to_string());
                    Ok(false)
                }
            }
        } else {
            self.dialog_result = Some(true);
            Ok(true)
        }
    }

    /// Close without keeping any edits. The opener discards the branch.
    pub fn cancel(&mut self) {
        self.dialog_result = Some(false);
    }

    /// Release every child row's resources. Idempotent.
    pub fn dispose(&mut self, session: &mut Session) {
        if self.disposed {
            return;
        }
        for coordinator in &mut self.coordinators {
            coordinator.dispose(session);
        }
        self.disposed = true;
    }

    // ── container selection ───────────────────────────────────────

    /// Select a container from the candidate list. In Create mode the
    /// pending create is re-parented; in Update mode only the selection
    /// changes (the server does not reparent existing things).
    pub fn select_container(
        &mut self,
        container: Iid,
        session: &Session,
        txn: &mut ThingTransaction,
    ) -> Result<(), DialogError> {
        if self.is_read_only() {
            return Err(DialogError::ReadOnly { class: self.class });
        }
        if !self.state.possible_containers().contains(&container) {
            return Err(DialogError::Transaction(TransactionError::NotFound(container)));
        }
        if self.kind == DialogKind::Create {
            let key = self.collection_key_in(session, txn, container)?;
            if txn.working_copy(self.iid).is_some() {
                txn.reassign_container(self.iid, container, key, session)?;
            } else {
                txn.register_create(self.snapshot.clone(), container, key, session)?;
            }
        }
        self.state.set_selected_container(Some(container));
        self.update_ok_can_execute();
        Ok(())
    }

    // ── child commands ────────────────────────────────────────────

    /// Change the row selection of `collection`, re-evaluating its commands.
    pub fn select_child(&mut self, collection: &str, iid: Option<Iid>) -> Result<(), DialogError> {
        let read_only = self.is_read_only();
        self.coordinator_mut(collection)?.select(iid, read_only);
        Ok(())
    }

    /// Open a Create dialog for a new child in `collection`. Confirmed
    /// children land in the shared transaction; the rows rebuild either way
    /// only after a confirmation.
    pub fn execute_create_child(
        &mut self,
        collection: &str,
        session: &mut Session,
        txn: &mut ThingTransaction,
        navigation: &mut dyn DialogNavigation,
    ) -> Result<bool, DialogError> {
        let coordinator = self.require_coordinator(collection)?;
        if !coordinator.commands.create.is_enabled() {
            return Ok(false);
        }
        let child = Thing::new(coordinator.child_class());
        let request = self.child_request(child, DialogKind::Create, session, txn)?;
        self.run_nested(request, collection, session, txn, navigation)
    }

    /// Open an Update dialog on the selected row of `collection`.
    pub fn execute_edit_child(
        &mut self,
        collection: &str,
        session: &mut Session,
        txn: &mut ThingTransaction,
        navigation: &mut dyn DialogNavigation,
    ) -> Result<bool, DialogError> {
        let coordinator = self.require_coordinator(collection)?;
        if !coordinator.commands.edit.is_enabled() {
            return Ok(false);
        }
        let Some(selected) = coordinator.selected() else {
            return Ok(false);
        };
        let child = txn
            .resolve(session, selected)
            .cloned()
            .ok_or(SessionError::NotFound(selected))?;
        let request = self.child_request(child, DialogKind::Update, session, txn)?;
        self.run_nested(request, collection, session, txn, navigation)
    }

    /// Mark the selected row's thing for deletion in the shared transaction
    /// and rebuild the rows, which filters it out. The working copy's
    /// collection itself is untouched until the server write.
    pub fn execute_delete_child(
        &mut self,
        collection: &str,
        session: &mut Session,
        txn: &mut ThingTransaction,
    ) -> Result<bool, DialogError> {
        let coordinator = self.require_coordinator(collection)?;
        if !coordinator.commands.delete.is_enabled() {
            return Ok(false);
        }
        let Some(selected) = coordinator.selected() else {
            return Ok(false);
        };
        txn.register_delete(selected, session)?;
        self.repopulate_child_rows(collection, session, txn)?;
        Ok(true)
    }

    /// Open a read-only dialog on the selected row. Inspect cannot mutate,
    /// so the rows are never rebuilt afterwards.
    pub fn execute_inspect_child(
        &mut self,
        collection: &str,
        session: &mut Session,
        txn: &mut ThingTransaction,
        navigation: &mut dyn DialogNavigation,
    ) -> Result<bool, DialogError> {
        let coordinator = self.require_coordinator(collection)?;
        if !coordinator.commands.inspect.is_enabled() {
            return Ok(false);
        }
        let Some(selected) = coordinator.selected() else {
            return Ok(false);
        };
        let child = txn
            .resolve(session, selected)
            .cloned()
            .ok_or(SessionError::NotFound(selected))?;
        let request = self.child_request(child, DialogKind::Inspect, session, txn)?;
        let mut branch = txn.branch();
        navigation.navigate(request, session, &mut branch)?;
        Ok(true)
    }

    /// Move the selected row of an ordered collection one position up.
    /// Dialog-state only until commit.
    pub fn execute_move_child_up(&mut self, collection: &str) -> Result<bool, DialogError> {
        let coordinator = self.coordinator_mut(collection)?;
        if !coordinator.commands.move_up.is_enabled() {
            return Ok(false);
        }
        Ok(coordinator.move_selected_up())
    }

    /// Move the selected row of an ordered collection one position down.
    pub fn execute_move_child_down(&mut self, collection: &str) -> Result<bool, DialogError> {
        let coordinator = self.coordinator_mut(collection)?;
        if !coordinator.commands.move_down.is_enabled() {
            return Ok(false);
        }
        Ok(coordinator.move_selected_down())
    }

    // ── internals ─────────────────────────────────────────────────

    fn working_clone(&self, session: &Session, txn: &ThingTransaction) -> Thing {
        txn.resolve(session, self.iid).cloned().unwrap_or_else(|| self.snapshot.clone())
    }

    fn require_coordinator(&self, collection: &str) -> Result<&RowCoordinator, DialogError> {
        self.coordinator(collection).ok_or(DialogError::UnknownCollection {
            class: self.class,
            collection: collection.to_string(),
        })
    }

    fn coordinator_mut(&mut self, collection: &str) -> Result<&mut RowCoordinator, DialogError> {
        let class = self.class;
        self.coordinators
            .iter_mut()
            .find(|c| c.key() == collection)
            .ok_or(DialogError::UnknownCollection { class, collection: collection.to_string() })
    }

    fn repopulate_child_rows(
        &mut self,
        collection: &str,
        session: &mut Session,
        txn: &ThingTransaction,
    ) -> Result<(), DialogError> {
        let clone = self.working_clone(session, txn);
        let read_only = self.is_read_only();
        self.coordinator_mut(collection)?.repopulate(&clone, txn, session, read_only)
    }

    fn child_request(
        &self,
        child: Thing,
        kind: DialogKind,
        session: &Session,
        txn: &ThingTransaction,
    ) -> Result<NavigationRequest, DialogError> {
        let container = match kind {
            // Inspect shows the child under its actual container.
            DialogKind::Inspect => child
                .container()
                .and_then(|c| txn.resolve(session, c))
                .cloned(),
            _ => Some(self.working_clone(session, txn)),
        };
        let mut chain = self.chain_of_containers.clone();
        chain.push(self.iid);
        Ok(NavigationRequest { thing: child, kind, container, chain_of_containers: chain })
    }

    fn run_nested(
        &mut self,
        request: NavigationRequest,
        collection: &str,
        session: &mut Session,
        txn: &mut ThingTransaction,
        navigation: &mut dyn DialogNavigation,
    ) -> Result<bool, DialogError> {
        let mut branch = txn.branch();
        let confirmed = navigation.navigate(request, session, &mut branch)?;
        if confirmed != Some(true) {
            return Ok(false);
        }
        txn.merge(branch);
        self.repopulate_child_rows(collection, session, txn)?;
        Ok(true)
    }

    fn update_ok_can_execute(&mut self) {
        self.ok_can_execute = !self.is_read_only()
            && (self.state.selected_container().is_some() || self.class.is_root());
    }

    /// The containment collection of `container` that holds things of this
    /// dialog's class.
    fn collection_key_in(
        &self,
        session: &Session,
        txn: &ThingTransaction,
        container: Iid,
    ) -> Result<&'static str, DialogError> {
        let container_class = txn
            .resolve(session, container)
            .map(Thing::class)
            .ok_or(SessionError::NotFound(container))?;
        container_class
            .def()
            .containment_for_child(self.class)
            .map(|c| c.key)
            .ok_or(DialogError::InvalidContainerType { class: self.class, supplied: container_class })
    }

    fn populate_possible_containers(
        &mut self,
        session: &Session,
        txn: &ThingTransaction,
    ) -> Result<(), DialogError> {
        match self.kind {
            // Creating under a fixed parent (child-create) pins the list to
            // that parent. A free-standing create offers every loaded,
            // write-permitted container and defaults to the first.
            DialogKind::Create => {
                if let Some(supplied) = self.supplied_container {
                    self.state.possible_containers_mut().replace_all(vec![supplied]);
                    self.state.set_selected_container(Some(supplied));
                } else {
                    let mut candidates: Vec<Iid> = Vec::new();
                    if let concord_model::ContainerRule::AnyOf(kinds) = self.class.def().container {
                        for kind in kinds {
                            candidates.extend(
                                session
                                    .things_of_class(*kind)
                                    .iter()
                                    .filter(|t| session.can_write(t))
                                    .map(|t| t.iid()),
                            );
                        }
                    }
                    let first = candidates.first().copied();
                    self.state.possible_containers_mut().replace_all(candidates);
                    self.state.set_selected_container(first);
                }
            }
            // Updating keeps the actual container but, when the container
            // class forms a required-library chain, offers the
            // write-permitted closure of that chain as well.
            DialogKind::Update => {
                let Some(actual) = self.snapshot.container() else {
                    self.state.possible_containers_mut().replace_all(Vec::new());
                    self.state.set_selected_container(None);
                    return Ok(());
                };
                let mut candidates = vec![actual];
                let chained = txn
                    .resolve(session, actual)
                    .map(|t| t.class().def().library_chain)
                    .unwrap_or(false);
                if chained {
                    for iid in session.required_library_chain(actual) {
                        if session.get(iid).map(|t| session.can_write(t)).unwrap_or(false) {
                            candidates.push(iid);
                        }
                    }
                }
                self.state.possible_containers_mut().replace_all(candidates);
                self.state.set_selected_container(Some(actual));
            }
            // Inspecting offers exactly the actual container; nothing else
            // is populated.
            DialogKind::Inspect => {
                let actual = self.snapshot.container();
                self.state
                    .possible_containers_mut()
                    .replace_all(actual.into_iter().collect());
                self.state.set_selected_container(actual);
            }
        }
        Ok(())
    }
}
