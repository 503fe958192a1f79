use thiserror::Error;

use concord_model::{ClassKind, Iid, ModelError};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("thing not found: {0}")]
    NotFound(Iid),

    #[error("write conflict on {iid}: {reason}")]
    Conflict { iid: Iid, reason: String },

    #[error(transparent)]
    Model(#[from] ModelError),
}

#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("thing not found: {0}")]
    NotFound(Iid),

    #[error("thing already pending deletion: {0}")]
    AlreadyDeleted(Iid),

    #[error("{container} has no `{collection}` collection accepting {child}")]
    UnknownCollection {
        container: ClassKind,
        collection: String,
        child: ClassKind,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}
