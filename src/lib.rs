//! Concord — dialog binding and edit-transaction machinery for thing-graph
//! modelling clients.
//!
//! A Concord client edits a server-owned graph of [`Thing`]s through modal
//! dialogs. Each dialog binds one thing's working copy to observable state,
//! accumulates edits in a [`ThingTransaction`], and writes the finalized
//! operation set back through the [`Session`]:
//!
//! ```text
//! Session (loaded things, permissions)
//!    │ clone
//!    ▼
//! ThingTransaction ──branch──▶ nested dialog ──merge──▶ …
//!    │ working copies
//!    ▼
//! DialogViewModel ⇄ DialogState / RowCoordinators
//!    │ ok()
//!    ▼
//! OperationContainer ──▶ Session::write
//! ```
//!
//! The crates re-exported here split the machinery by concern:
//! `concord_model` (class registry and thing records), `concord_session`
//! (cache, permissions, transactions), `concord_dialogs` (the generic dialog
//! controller, row coordination and ordered reconciliation).

pub use concord_dialogs::{
    reconcile, CommandGate, CommandState, CommitReport, DialogError, DialogKind,
    DialogNavigation, DialogState, DialogViewModel, NavigationRequest, Observable,
    ObservableList, OrderedCaps, OrderedMutation, RowCommands, RowCoordinator, ThingRow,
};
pub use concord_model::{
    AttrDef, AttrKey, ChangeKind, ClassDef, ClassKind, ContainerRule, ContainmentDef, Iid,
    ModelError, RefDef, RefListDef, ScalarKind, ScalarValue, Thing,
};
pub use concord_session::{
    OpenAccess, Operation, OperationContainer, OperationKind, PermissionService, Session,
    SessionError, SubscriptionId, ThingTransaction, TransactionError,
};
