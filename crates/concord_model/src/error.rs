use thiserror::Error;

use crate::class::ClassKind;
use crate::value::ScalarKind;

#[derive(Debug, Error)]
pub enum ModelError {
    #[error("unknown attribute `{attribute}` on {class}")]
    UnknownAttribute { class: ClassKind, attribute: String },

    #[error("value kind mismatch on {class}.{attribute}: expected {expected}, got {actual}")]
    ValueKindMismatch {
        class: ClassKind,
        attribute: String,
        expected: ScalarKind,
        actual: ScalarKind,
    },
}
