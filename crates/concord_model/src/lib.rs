//! Concord domain graph — pure value types, no I/O.
//!
//! Every persisted object in a Concord model is a [`Thing`]: an
//! identity-bearing node in a containment tree, described at runtime by a
//! [`ClassDef`] from the static class registry rather than by generated
//! per-class code. The registry declares, per class:
//!
//! - the container rule (which classes may own an instance),
//! - scalar attributes and their value kinds,
//! - single references and reference lists (non-owning),
//! - containment collections (owning, ordered or unordered).
//!
//! ```text
//! SiteDirectory ──┬── Person
//!                 ├── DomainOfExpertise
//!                 └── SiteReferenceDataLibrary ──┬── Glossary ── Term
//!                     (required-library chain)   ├── DerivedQuantityKind ── QuantityKindFactor
//!                                                ├── MeasurementScale / FileType / Category
//! EngineeringModel ── Iteration ──┬── ElementDefinition ── Parameter
//!                                 └── DomainFileStore ── File ── FileRevision
//! ```
//!
//! The session/transaction and dialog layers are built entirely against this
//! crate; nothing here touches a network, a database, or a UI toolkit.

mod change;
mod class;
mod error;
mod iid;
pub mod ordered;
mod thing;
mod value;

pub use change::ChangeKind;
pub use class::{
    AttrDef, AttrKey, ClassDef, ClassKind, ContainerRule, ContainmentDef, RefDef, RefListDef,
};
pub use error::ModelError;
pub use iid::Iid;
pub use thing::Thing;
pub use value::{ScalarKind, ScalarValue};
