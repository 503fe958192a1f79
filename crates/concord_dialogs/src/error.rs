use thiserror::Error;

use concord_model::{ClassKind, ModelError};
use concord_session::{SessionError, TransactionError};

#[derive(Debug, Error)]
pub enum DialogError {
    /// The container handed to the dialog fails the class's container rule.
    /// Raised from construction; never silently defaulted.
    #[error("invalid container type for {class}: {supplied} is not an allowed container")]
    InvalidContainerType { class: ClassKind, supplied: ClassKind },

    #[error("dialog for {class} is read-only")]
    ReadOnly { class: ClassKind },

    #[error("no `{collection}` row collection on {class}")]
    UnknownCollection { class: ClassKind, collection: String },

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error(transparent)]
    Session(#[from] SessionError),
}
