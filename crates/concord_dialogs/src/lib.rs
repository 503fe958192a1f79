//! Concord dialog layer.
//!
//! One generic modal-edit mechanism replaces the per-class dialog classes a
//! code generator would otherwise stamp out:
//!
//! ```text
//! DialogViewModel (one per open dialog, mode fixed at construction)
//! ├── DialogState        observable scalars / references / candidate lists
//! ├── RowCoordinator ×N  one per owned child collection (create/edit/delete/
//! │                      inspect/move commands, clear-then-rebuild rows)
//! └── working copy       lives in the shared ThingTransaction
//! ```
//!
//! `load` copies the working copy into the dialog state; `commit` copies the
//! dialog state back, running ordered collections through the minimal-move
//! reconciliation in [`reconcile`] so a single user move reaches the wire as
//! a single move operation. Candidate lists are always rebuilt from the
//! session catalog, never patched.
//!
//! No UI toolkit is referenced anywhere: the observable cells and command
//! gates in [`reactive`] are plain synchronous values a rendering shell can
//! bind to, and nested modal navigation is behind the [`DialogNavigation`]
//! port.

mod controller;
mod error;
mod kind;
pub mod navigation;
pub mod reactive;
pub mod reconcile;
mod rows;
mod state;

pub use controller::{CommitReport, DialogViewModel};
pub use error::DialogError;
pub use kind::DialogKind;
pub use navigation::{DialogNavigation, NavigationRequest};
pub use reactive::{CommandGate, CommandState, Observable, ObservableList};
pub use reconcile::{reconcile, OrderedCaps, OrderedMutation};
pub use rows::{RowCommands, RowCoordinator, ThingRow};
pub use state::DialogState;
