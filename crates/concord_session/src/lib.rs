//! Concord session layer.
//!
//! Holds the client-side picture of the server's model graph and the edit
//! machinery that mutates it:
//!
//! - [`Session`] — cache of loaded things, deterministic catalog queries, the
//!   row-subscription registry, and the write endpoint that applies a
//!   finalized transaction.
//! - [`PermissionService`] — port consumed when filtering candidate lists;
//!   policy lives with the caller.
//! - [`ThingTransaction`] — per-dialog working copies plus pending operation
//!   kinds; branchable for nested modal dialogs, finalized into an
//!   [`OperationContainer`] for the session write.
//!
//! Everything is synchronous and single-threaded: one modal edit is active at
//! a time, and nested edits are strictly stacked via transaction branches.

mod error;
mod permission;
mod session;
mod transaction;

pub use error::{SessionError, TransactionError};
pub use permission::{OpenAccess, PermissionService};
pub use session::{Session, SubscriptionId};
pub use transaction::{Operation, OperationContainer, OperationKind, ThingTransaction};
