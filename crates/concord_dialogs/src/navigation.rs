//! Nested-dialog navigation port.
//!
//! Opening a nested dialog is, from the caller's perspective, a blocking
//! modal call: the implementation runs the child dialog to completion
//! against the transaction branch it is handed and reports how it closed.
//! Dialogs are strictly stacked: a parent never interacts with its state
//! while a child is open.

use concord_model::{Iid, Thing};
use concord_session::{Session, ThingTransaction};

use crate::error::DialogError;
use crate::kind::DialogKind;

/// Everything a shell needs to open one nested dialog.
#[derive(Debug)]
pub struct NavigationRequest {
    /// Working copy of the thing the dialog is about.
    pub thing: Thing,
    pub kind: DialogKind,
    /// The container handed to the dialog, when the caller fixes it (child
    /// create/edit always passes the parent's working copy).
    pub container: Option<Thing>,
    /// Ancestor containers of `container`, outermost first.
    pub chain_of_containers: Vec<Iid>,
}

pub trait DialogNavigation {
    /// Open a nested dialog and run it to completion.
    ///
    /// Returns `Some(true)` when the dialog was confirmed (its edits are in
    /// `txn`), `Some(false)` when cancelled, `None` when the shell could not
    /// open it. Construction failures propagate as errors.
    fn navigate(
        &mut self,
        request: NavigationRequest,
        session: &mut Session,
        txn: &mut ThingTransaction,
    ) -> Result<Option<bool>, DialogError>;
}
