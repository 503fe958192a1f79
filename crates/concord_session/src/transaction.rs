//! Edit transactions.
//!
//! A [`ThingTransaction`] is opened per dialog invocation. It accumulates
//! working copies ("clones") of the things being edited plus a pending
//! [`ChangeKind`] per iid, in registration order. Nested dialogs edit a
//! [`branch`](ThingTransaction::branch); OK merges the branch back, Cancel
//! drops it, so each dialog commits or discards atomically.
//!
//! Deletion is deferred: a deleted child stays inside its container clone's
//! collection until the server write, and the dialog layer filters it out of
//! visible lists by querying [`change_kind`](ThingTransaction::change_kind).

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use concord_model::{ChangeKind, Iid, Thing};

use crate::error::TransactionError;
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Update,
    Delete,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// One pending server operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    pub kind: OperationKind,
    pub thing: Thing,
}

/// The finalized, ordered payload of a transaction: creates, then updates,
/// then deletes, each in registration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OperationContainer {
    /// The root thing the dialog chain was opened on.
    pub context: Iid,
    pub operations: Vec<Operation>,
}

/// Working copies and pending operations for one dialog chain.
#[derive(Debug, Clone, Default)]
pub struct ThingTransaction {
    clones: HashMap<Iid, Thing>,
    kinds: HashMap<Iid, ChangeKind>,
    order: Vec<Iid>,
}

impl ThingTransaction {
    pub fn new() -> Self {
        Self::default()
    }

    /// The pending change kind for `iid`; `None` when nothing is recorded.
    pub fn change_kind(&self, iid: Iid) -> ChangeKind {
        self.kinds.get(&iid).copied().unwrap_or_default()
    }

    pub fn working_copy(&self, iid: Iid) -> Option<&Thing> {
        self.clones.get(&iid)
    }

    pub fn working_copy_mut(&mut self, iid: Iid) -> Option<&mut Thing> {
        self.clones.get_mut(&iid)
    }

    /// The freshest view of `iid`: the working copy when one exists, the
    /// session cache otherwise.
    pub fn resolve<'a>(&'a self, session: &'a Session, iid: Iid) -> Option<&'a Thing> {
        self.clones.get(&iid).or_else(|| session.get(iid))
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.order.len()
    }

    // ── registration ──────────────────────────────────────────────

    /// Record (or refresh) the working copy of an existing thing.
    ///
    /// Update-or-create semantics: a thing already pending `Create` stays a
    /// create; the newer clone simply replaces the payload.
    pub fn register_update(&mut self, clone: Thing) {
        let iid = clone.iid();
        let kind = match self.change_kind(iid) {
            ChangeKind::Create => ChangeKind::Create,
            _ => ChangeKind::Update,
        };
        trace!(%iid, kind = %kind, "register working copy");
        self.record(iid, clone, kind);
    }

    /// Record a newly instantiated thing as a create inside `collection` of
    /// `container`, wiring both sides: the child's container reference and
    /// the container clone's collection.
    pub fn register_create(
        &mut self,
        mut thing: Thing,
        container: Iid,
        collection: &str,
        session: &Session,
    ) -> Result<(), TransactionError> {
        let container_clone = self.materialize(container, session)?;
        let def = container_clone
            .class()
            .def()
            .containment(collection)
            .filter(|c| c.child == thing.class())
            .ok_or(TransactionError::UnknownCollection {
                container: container_clone.class(),
                collection: collection.to_string(),
                child: thing.class(),
            })?;
        let child = thing.iid();
        let list = container_clone.containment_mut(def.key)?;
        if !list.contains(&child) {
            list.push(child);
        }
        thing.set_container(Some(container));
        trace!(iid = %child, %container, collection, "register create");
        self.record(child, thing, ChangeKind::Create);
        Ok(())
    }

    /// Mark `iid` for deletion. The thing stays in its container clone's
    /// collection; removal happens at server write. Deleting a thing that is
    /// itself pending `Create` cancels the create outright.
    pub fn register_delete(&mut self, iid: Iid, session: &Session) -> Result<(), TransactionError> {
        match self.change_kind(iid) {
            ChangeKind::Delete => return Err(TransactionError::AlreadyDeleted(iid)),
            ChangeKind::Create => {
                let clone = self.clones.remove(&iid).ok_or(TransactionError::NotFound(iid))?;
                self.kinds.remove(&iid);
                self.order.retain(|x| *x != iid);
                if let Some(container) = clone.container() {
                    if let Some(parent) = self.clones.get_mut(&container) {
                        for def in parent.class().def().containments {
                            parent.containment_mut(def.key)?.retain(|x| *x != iid);
                        }
                    }
                }
                debug!(%iid, "cancelled pending create");
                return Ok(());
            }
            _ => {}
        }
        let clone = self
            .resolve(session, iid)
            .cloned()
            .ok_or(TransactionError::NotFound(iid))?;
        debug!(%iid, class = %clone.class(), "register delete");
        self.record(iid, clone, ChangeKind::Delete);
        Ok(())
    }

    /// Move a pending create from its current container to `container`
    /// (the user changed the container selection before committing).
    pub fn reassign_container(
        &mut self,
        iid: Iid,
        container: Iid,
        collection: &str,
        session: &Session,
    ) -> Result<(), TransactionError> {
        let moved = self.clones.get(&iid).ok_or(TransactionError::NotFound(iid))?;
        let (previous, class) = (moved.container(), moved.class());
        if previous == Some(container) {
            return Ok(());
        }
        if let Some(old) = previous {
            if let Some(parent) = self.clones.get_mut(&old) {
                for def in parent.class().def().containments {
                    parent.containment_mut(def.key)?.retain(|x| *x != iid);
                }
            }
        }
        let container_clone = self.materialize(container, session)?;
        let def = container_clone
            .class()
            .def()
            .containment(collection)
            .filter(|c| c.child == class)
            .ok_or(TransactionError::UnknownCollection {
                container: container_clone.class(),
                collection: collection.to_string(),
                child: class,
            })?;
        let list = container_clone.containment_mut(def.key)?;
        if !list.contains(&iid) {
            list.push(iid);
        }
        if let Some(clone) = self.clones.get_mut(&iid) {
            clone.set_container(Some(container));
        }
        Ok(())
    }

    // ── nesting ───────────────────────────────────────────────────

    /// An independent copy for a nested dialog to edit.
    pub fn branch(&self) -> Self {
        self.clone()
    }

    /// Adopt the state of a branch whose dialog was OK'd.
    pub fn merge(&mut self, branch: Self) {
        *self = branch;
    }

    // ── finalize ──────────────────────────────────────────────────

    /// Produce the ordered operation payload for the session write.
    pub fn finalize(&self, context: Iid) -> OperationContainer {
        let mut operations = Vec::with_capacity(self.order.len());
        for phase in [OperationKind::Create, OperationKind::Update, OperationKind::Delete] {
            for iid in &self.order {
                let kind = self.change_kind(*iid);
                let matches = matches!(
                    (phase, kind),
                    (OperationKind::Create, ChangeKind::Create)
                        | (OperationKind::Update, ChangeKind::Update)
                        | (OperationKind::Delete, ChangeKind::Delete)
                );
                if matches {
                    operations.push(Operation { kind: phase, thing: self.clones[iid].clone() });
                }
            }
        }
        debug!(%context, operations = operations.len(), "finalize transaction");
        OperationContainer { context, operations }
    }

    // ── internals ─────────────────────────────────────────────────

    fn record(&mut self, iid: Iid, clone: Thing, kind: ChangeKind) {
        if !self.clones.contains_key(&iid) {
            self.order.push(iid);
        }
        self.clones.insert(iid, clone);
        self.kinds.insert(iid, kind);
    }

    /// Ensure a working copy of `iid` exists and return it mutably; a clone
    /// pulled in this way is recorded as a pending update.
    fn materialize(&mut self, iid: Iid, session: &Session) -> Result<&mut Thing, TransactionError> {
        if !self.clones.contains_key(&iid) {
            let clone = session.get(iid).cloned().ok_or(TransactionError::NotFound(iid))?;
            self.record(iid, clone, ChangeKind::Update);
        }
        self.clones.get_mut(&iid).ok_or(TransactionError::NotFound(iid))
    }
}
